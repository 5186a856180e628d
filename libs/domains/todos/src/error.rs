use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use mediator::MediatorError;
use thiserror::Error;

/// Infrastructure failures while handling a todo request.
///
/// Business outcomes such as "list not found" are not errors; they come back
/// as a `CrudResult` with the matching status.
#[derive(Debug, Error)]
pub enum TodoError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Request was cancelled")]
    Cancelled,

    #[error(transparent)]
    Pipeline(#[from] MediatorError),

    #[error("Event dispatch failed: {0}")]
    EventDispatch(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TodoResult<T> = Result<T, TodoError>;

impl From<sea_orm::DbErr> for TodoError {
    fn from(err: sea_orm::DbErr) -> Self {
        TodoError::Database(err.to_string())
    }
}

impl From<TodoError> for AppError {
    fn from(err: TodoError) -> Self {
        match err {
            TodoError::Pipeline(MediatorError::Validation(failed)) => {
                AppError::BadRequest(failed.to_string())
            }
            TodoError::Cancelled | TodoError::Pipeline(MediatorError::Cancelled(_)) => {
                AppError::ServiceUnavailable("Request was cancelled".to_string())
            }
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
