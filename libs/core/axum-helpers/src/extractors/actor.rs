use crate::errors::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Header naming the acting user.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The acting user id taken from the `x-user-id` header, if any.
///
/// Authentication happens upstream; this only reads the id it forwards. A
/// present but non-numeric header is rejected with 400.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actor(pub Option<i64>);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(Actor(None));
        };

        value
            .to_str()
            .ok()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(|id| Actor(Some(id)))
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Header '{}' must be an integer user id",
                    USER_ID_HEADER
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<Actor, AppError> {
        let mut builder = Request::builder().uri("/todo-lists");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Actor::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_missing_header_is_anonymous() {
        assert_eq!(extract(None).await.unwrap(), Actor(None));
    }

    #[tokio::test]
    async fn test_numeric_header_is_actor() {
        assert_eq!(extract(Some(" 42 ")).await.unwrap(), Actor(Some(42)));
    }

    #[tokio::test]
    async fn test_garbage_header_is_rejected() {
        assert!(matches!(
            extract(Some("alice")).await,
            Err(AppError::BadRequest(_))
        ));
    }
}
