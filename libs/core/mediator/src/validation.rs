//! Validation stage: runs every registered validator for a request before
//! the handler and rejects the request when any of them reports a failure.

use crate::{
    CrudMessage, CrudResult, MediatorError, Next, PipelineBehavior, Request, RequestContext,
    error::ValidationFailed,
};
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use strum::{Display, EnumString};
use validator::{Validate, ValidationErrors};

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidationFailure {
    pub property_name: String,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(property_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            message: message.into(),
        }
    }
}

impl From<ValidationFailure> for CrudMessage {
    fn from(failure: ValidationFailure) -> Self {
        CrudMessage::new(failure.property_name, failure.message)
    }
}

/// A rule set for one request type.
///
/// Validators may be asynchronous (a uniqueness check hits the store). An
/// `Err` means the check itself could not run and aborts the request.
#[async_trait]
pub trait Validator<R: Request, E: Send + 'static>: Send + Sync {
    async fn validate(
        &self,
        request: &R,
        ctx: &RequestContext,
    ) -> Result<Vec<ValidationFailure>, E>;
}

/// Adapts a request's `#[derive(Validate)]` rules into a [`Validator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DeriveValidator;

#[async_trait]
impl<R, E> Validator<R, E> for DeriveValidator
where
    R: Request + Validate,
    E: Send + 'static,
{
    async fn validate(
        &self,
        request: &R,
        _ctx: &RequestContext,
    ) -> Result<Vec<ValidationFailure>, E> {
        Ok(match request.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => failures_from(&errors),
        })
    }
}

/// Flattens `validator` field errors, ordered by field name.
pub fn failures_from(errors: &ValidationErrors) -> Vec<ValidationFailure> {
    let mut fields: Vec<(String, Vec<ValidationFailure>)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let field = field.to_string();
            let failures = errors
                .iter()
                .map(|error| {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("'{}' is invalid ({})", field, error.code));
                    ValidationFailure::new(field.clone(), message)
                })
                .collect();
            (field, failures)
        })
        .collect();

    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields.into_iter().flat_map(|(_, failures)| failures).collect()
}

/// What the validation stage does with failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ValidationMode {
    /// Short-circuit with an `InputNotValid` result
    #[default]
    #[strum(serialize = "result")]
    ReturnResult,
    /// Short-circuit with `MediatorError::Validation`
    Raise,
}

pub struct ValidationBehavior<R: Request, E: Send + 'static> {
    validators: Vec<Arc<dyn Validator<R, E>>>,
    mode: ValidationMode,
}

impl<R: Request, E: Send + 'static> ValidationBehavior<R, E> {
    pub fn new(validators: Vec<Arc<dyn Validator<R, E>>>, mode: ValidationMode) -> Self {
        Self { validators, mode }
    }
}

#[async_trait]
impl<R, E> PipelineBehavior<R, E> for ValidationBehavior<R, E>
where
    R: Request,
    E: From<MediatorError> + Send + 'static,
{
    async fn handle(
        &self,
        request: &R,
        ctx: &RequestContext,
        next: Next<'_, R, E>,
    ) -> Result<CrudResult<R::Output>, E> {
        if self.validators.is_empty() {
            return next.run(request, ctx).await;
        }

        let outcomes = join_all(self.validators.iter().map(|v| v.validate(request, ctx))).await;

        let mut failures = Vec::new();
        for outcome in outcomes {
            failures.extend(outcome?);
        }
        let failures = distinct(failures);

        if failures.is_empty() {
            return next.run(request, ctx).await;
        }

        tracing::debug!(
            request = R::NAME,
            failures = failures.len(),
            "Request rejected by validation"
        );

        match self.mode {
            ValidationMode::ReturnResult => Ok(CrudResult::invalid(
                failures.into_iter().map(CrudMessage::from).collect(),
            )),
            ValidationMode::Raise => Err(MediatorError::from(ValidationFailed { failures }).into()),
        }
    }
}

fn distinct(failures: Vec<ValidationFailure>) -> Vec<ValidationFailure> {
    let mut seen = HashSet::new();
    failures
        .into_iter()
        .filter(|f| seen.insert(f.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Validate)]
    struct Rename {
        #[validate(length(min = 1, message = "'Title' must not be empty."))]
        title: String,
        #[validate(range(min = 1, message = "'List Id' must be at least 1."))]
        list_id: i64,
    }

    crate::command!(Rename);

    #[test]
    fn test_failures_from_orders_by_field() {
        let request = Rename {
            title: String::new(),
            list_id: 0,
        };
        let errors = request.validate().unwrap_err();

        let failures = failures_from(&errors);
        assert_eq!(
            failures,
            vec![
                ValidationFailure::new("list_id", "'List Id' must be at least 1."),
                ValidationFailure::new("title", "'Title' must not be empty."),
            ]
        );
    }

    #[tokio::test]
    async fn test_derive_validator_passes_valid_request() {
        let request = Rename {
            title: "Shopping".to_string(),
            list_id: 3,
        };

        let failures: Result<_, MediatorError> = DeriveValidator
            .validate(&request, &RequestContext::new())
            .await;
        assert!(failures.unwrap().is_empty());
    }

    #[test]
    fn test_distinct_keeps_first_occurrence_order() {
        let failures = distinct(vec![
            ValidationFailure::new("title", "a"),
            ValidationFailure::new("title", "b"),
            ValidationFailure::new("title", "a"),
        ]);
        assert_eq!(
            failures,
            vec![
                ValidationFailure::new("title", "a"),
                ValidationFailure::new("title", "b"),
            ]
        );
    }

    #[test]
    fn test_validation_mode_parsing() {
        assert_eq!(
            "result".parse::<ValidationMode>().unwrap(),
            ValidationMode::ReturnResult
        );
        assert_eq!(
            "RAISE".parse::<ValidationMode>().unwrap(),
            ValidationMode::Raise
        );
        assert!("strict".parse::<ValidationMode>().is_err());
        assert_eq!(ValidationMode::default(), ValidationMode::ReturnResult);
    }
}
