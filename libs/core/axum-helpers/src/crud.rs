//! HTTP rendering of [`CrudResult`] envelopes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mediator::{CrudResult, CrudStatus};
use serde::Serialize;

/// HTTP status for a result status.
pub fn status_code(status: CrudStatus) -> StatusCode {
    match status {
        CrudStatus::Succeeded => StatusCode::OK,
        CrudStatus::InputNotValid => StatusCode::BAD_REQUEST,
        CrudStatus::NotFound | CrudStatus::UserNotFound => StatusCode::NOT_FOUND,
        CrudStatus::NotAuthorize => StatusCode::UNAUTHORIZED,
        CrudStatus::NotAccess => StatusCode::FORBIDDEN,
        CrudStatus::DeletedError => StatusCode::GONE,
        CrudStatus::ExpiryOtpCode | CrudStatus::IdentityError | CrudStatus::Failed => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        CrudStatus::DatabaseException | CrudStatus::ServerError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Serializes a [`CrudResult`] with the status code its outcome maps to.
///
/// ```ignore
/// async fn create(...) -> Result<CrudJson<i64>, TodoError> {
///     let result = service.send(command, &ctx).await?;
///     Ok(CrudJson::created(result))
/// }
/// ```
#[derive(Debug)]
pub struct CrudJson<T> {
    result: CrudResult<T>,
    success: StatusCode,
}

impl<T> CrudJson<T> {
    pub fn new(result: CrudResult<T>) -> Self {
        Self {
            result,
            success: StatusCode::OK,
        }
    }

    /// Like [`CrudJson::new`], but a success answers 201 Created.
    pub fn created(result: CrudResult<T>) -> Self {
        Self {
            result,
            success: StatusCode::CREATED,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.result.status {
            CrudStatus::Succeeded => self.success,
            other => status_code(other),
        }
    }
}

impl<T> From<CrudResult<T>> for CrudJson<T> {
    fn from(result: CrudResult<T>) -> Self {
        Self::new(result)
    }
}

impl<T: Serialize> IntoResponse for CrudJson<T> {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(
                status = %self.result.status,
                "Request failed: {}",
                self.result.message()
            );
        }
        (status, Json(self.result)).into_response()
    }
}
