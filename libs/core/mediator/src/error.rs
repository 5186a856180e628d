use crate::validation::ValidationFailure;
use thiserror::Error;

/// Raised by the validation stage when configured to fail instead of
/// returning an `InputNotValid` result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed: {}", summary(.failures))]
pub struct ValidationFailed {
    pub failures: Vec<ValidationFailure>,
}

fn summary(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.property_name, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors produced by the pipeline itself rather than by a handler.
///
/// Every pipeline error type must be convertible from this.
#[derive(Debug, Error)]
pub enum MediatorError {
    #[error(transparent)]
    Validation(#[from] ValidationFailed),

    #[error("Request '{0}' was cancelled")]
    Cancelled(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_failed_lists_every_failure() {
        let err = MediatorError::from(ValidationFailed {
            failures: vec![
                ValidationFailure::new("title", "must not be empty"),
                ValidationFailure::new("list_id", "must be at least 1"),
            ],
        });

        assert_eq!(
            err.to_string(),
            "Validation failed: title: must not be empty; list_id: must be at least 1"
        );
    }

    #[test]
    fn test_cancelled_names_request() {
        let err = MediatorError::Cancelled("CreateTodoList");
        assert_eq!(err.to_string(), "Request 'CreateTodoList' was cancelled");
    }
}
