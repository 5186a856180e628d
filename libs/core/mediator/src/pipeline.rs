use crate::{
    CrudResult, DeriveValidator, MediatorError, Next, PerformanceBehavior, PipelineBehavior,
    PipelineConfig, Request, RequestContext, RequestHandler, ValidationBehavior, Validator,
};
use async_trait::async_trait;
use std::sync::Arc;
use validator::Validate;

/// Dispatches one request type through its behaviors to its handler.
///
/// Behaviors run in registration order, the first registered being the
/// outermost.
pub struct Pipeline<R: Request, E: Send + 'static> {
    handler: Arc<dyn RequestHandler<R, E>>,
    behaviors: Vec<Arc<dyn PipelineBehavior<R, E>>>,
}

impl<R, E> Pipeline<R, E>
where
    R: Request,
    E: From<MediatorError> + Send + 'static,
{
    pub fn new<H: RequestHandler<R, E> + 'static>(handler: Arc<H>) -> Self {
        Self::from_handler(handler)
    }

    fn from_handler(handler: Arc<dyn RequestHandler<R, E>>) -> Self {
        Self {
            handler,
            behaviors: Vec::new(),
        }
    }

    pub fn with_behavior(mut self, behavior: impl PipelineBehavior<R, E> + 'static) -> Self {
        self.behaviors.push(Arc::new(behavior));
        self
    }

    pub fn builder<H: RequestHandler<R, E> + 'static>(handler: Arc<H>) -> PipelineBuilder<R, E> {
        PipelineBuilder {
            handler,
            validators: Vec::new(),
        }
    }

    /// Runs the request. A request whose context is already cancelled is
    /// rejected before any behavior runs.
    pub async fn send(&self, request: R, ctx: &RequestContext) -> Result<CrudResult<R::Output>, E> {
        if ctx.is_cancelled() {
            return Err(MediatorError::Cancelled(R::NAME).into());
        }

        Next::new(&self.behaviors, self.handler.as_ref())
            .run(&request, ctx)
            .await
    }
}

/// Builds the standard chain: validation outermost, then performance
/// monitoring, then the handler.
pub struct PipelineBuilder<R: Request, E: Send + 'static> {
    handler: Arc<dyn RequestHandler<R, E>>,
    validators: Vec<Arc<dyn Validator<R, E>>>,
}

impl<R, E> PipelineBuilder<R, E>
where
    R: Request,
    E: From<MediatorError> + Send + 'static,
{
    pub fn validator(mut self, validator: impl Validator<R, E> + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn build(self, config: &PipelineConfig) -> Pipeline<R, E> {
        Pipeline::from_handler(self.handler)
            .with_behavior(ValidationBehavior::new(
                self.validators,
                config.validation_mode,
            ))
            .with_behavior(PerformanceBehavior::new(config.slow_request_threshold))
    }
}

impl<R, E> PipelineBuilder<R, E>
where
    R: Request + Validate,
    E: From<MediatorError> + Send + 'static,
{
    /// Registers the request's derived field rules.
    pub fn validated(self) -> Self {
        self.validator(DeriveValidator)
    }
}

/// Sends a request of type `R` to whatever pipeline is registered for it.
#[async_trait]
pub trait Sender<R: Request>: Send + Sync {
    type Error: Send;

    async fn send(
        &self,
        request: R,
        ctx: &RequestContext,
    ) -> Result<CrudResult<R::Output>, Self::Error>;
}

#[async_trait]
impl<R, E> Sender<R> for Pipeline<R, E>
where
    R: Request,
    E: From<MediatorError> + Send + 'static,
{
    type Error = E;

    async fn send(&self, request: R, ctx: &RequestContext) -> Result<CrudResult<R::Output>, E> {
        Pipeline::send(self, request, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CrudStatus, ValidationFailure, ValidationMode};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Barrier;
    use tokio_util::sync::CancellationToken;

    #[derive(Debug, thiserror::Error)]
    enum TestError {
        #[error(transparent)]
        Mediator(#[from] MediatorError),
        #[error("store unavailable")]
        Store,
    }

    #[derive(Debug, Validate)]
    struct Shout {
        #[validate(length(min = 1, message = "'Text' must not be empty."))]
        text: String,
    }

    crate::command!(Shout => usize);

    #[derive(Default)]
    struct CountingHandler {
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl RequestHandler<Shout, TestError> for CountingHandler {
        async fn handle(
            &self,
            request: &Shout,
            _ctx: &RequestContext,
        ) -> Result<CrudResult<usize>, TestError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(CrudResult::succeeded(request.text.len()))
        }
    }

    struct FixedFailures(Vec<ValidationFailure>);

    #[async_trait]
    impl Validator<Shout, TestError> for FixedFailures {
        async fn validate(
            &self,
            _request: &Shout,
            _ctx: &RequestContext,
        ) -> Result<Vec<ValidationFailure>, TestError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenValidator;

    #[async_trait]
    impl Validator<Shout, TestError> for BrokenValidator {
        async fn validate(
            &self,
            _request: &Shout,
            _ctx: &RequestContext,
        ) -> Result<Vec<ValidationFailure>, TestError> {
            Err(TestError::Store)
        }
    }

    struct BarrierValidator(Arc<Barrier>);

    #[async_trait]
    impl Validator<Shout, TestError> for BarrierValidator {
        async fn validate(
            &self,
            _request: &Shout,
            _ctx: &RequestContext,
        ) -> Result<Vec<ValidationFailure>, TestError> {
            self.0.wait().await;
            Ok(Vec::new())
        }
    }

    struct Recording {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl PipelineBehavior<Shout, TestError> for Recording {
        async fn handle(
            &self,
            request: &Shout,
            ctx: &RequestContext,
            next: Next<'_, Shout, TestError>,
        ) -> Result<CrudResult<usize>, TestError> {
            self.log.lock().unwrap().push(self.name);
            next.run(request, ctx).await
        }
    }

    fn shout(text: &str) -> Shout {
        Shout {
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_valid_request_reaches_handler() {
        let handler = Arc::new(CountingHandler::default());
        let pipeline = Pipeline::<Shout, TestError>::builder(handler.clone())
            .validated()
            .build(&PipelineConfig::default());

        let result = pipeline
            .send(shout("hello"), &RequestContext::new())
            .await
            .unwrap();

        assert_eq!(result.status, CrudStatus::Succeeded);
        assert_eq!(result.result, Some(5));
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_request_short_circuits_with_distinct_messages() {
        let handler = Arc::new(CountingHandler::default());
        let pipeline = Pipeline::<Shout, TestError>::builder(handler.clone())
            .validated()
            .validator(FixedFailures(vec![
                ValidationFailure::new("text", "'Text' must not be empty."),
                ValidationFailure::new("text", "'Text' must be loud."),
            ]))
            .build(&PipelineConfig::default());

        let result = pipeline
            .send(shout(""), &RequestContext::new())
            .await
            .unwrap();

        assert_eq!(result.status, CrudStatus::InputNotValid);
        assert_eq!(result.messages.len(), 2);
        assert_eq!(result.message(), "'Text' must not be empty.-'Text' must be loud.");
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_raise_mode_returns_validation_error() {
        let handler = Arc::new(CountingHandler::default());
        let config = PipelineConfig {
            validation_mode: ValidationMode::Raise,
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::<Shout, TestError>::builder(handler.clone())
            .validated()
            .build(&config);

        let err = pipeline
            .send(shout(""), &RequestContext::new())
            .await
            .unwrap_err();

        match err {
            TestError::Mediator(MediatorError::Validation(failed)) => {
                assert_eq!(failed.failures.len(), 1);
                assert_eq!(failed.failures[0].property_name, "text");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_validator_error_aborts_request() {
        let handler = Arc::new(CountingHandler::default());
        let pipeline = Pipeline::<Shout, TestError>::builder(handler.clone())
            .validator(BrokenValidator)
            .build(&PipelineConfig::default());

        let err = pipeline
            .send(shout("hello"), &RequestContext::new())
            .await
            .unwrap_err();

        assert!(matches!(err, TestError::Store));
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_validators_run_concurrently() {
        let barrier = Arc::new(Barrier::new(2));
        let pipeline = Pipeline::<Shout, TestError>::builder(Arc::new(CountingHandler::default()))
            .validator(BarrierValidator(barrier.clone()))
            .validator(BarrierValidator(barrier))
            .build(&PipelineConfig::default());

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            pipeline.send(shout("hi"), &RequestContext::new()),
        )
        .await
        .expect("validators should not wait on each other")
        .unwrap();

        assert!(result.is_succeeded());
    }

    #[tokio::test]
    async fn test_behaviors_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::<Shout, TestError>::new(Arc::new(CountingHandler::default()))
            .with_behavior(Recording {
                name: "outer",
                log: log.clone(),
            })
            .with_behavior(Recording {
                name: "inner",
                log: log.clone(),
            });

        pipeline
            .send(shout("x"), &RequestContext::new())
            .await
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["outer", "inner"]);
    }

    #[tokio::test]
    async fn test_cancelled_request_never_reaches_handler() {
        let handler = Arc::new(CountingHandler::default());
        let pipeline = Pipeline::<Shout, TestError>::builder(handler.clone())
            .build(&PipelineConfig::default());
        let token = CancellationToken::new();
        token.cancel();

        let err = pipeline
            .send(shout("x"), &RequestContext::new().with_cancellation(token))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TestError::Mediator(MediatorError::Cancelled("Shout"))
        ));
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_request_result_is_unchanged() {
        let handler = Arc::new(CountingHandler {
            delay: Some(Duration::from_millis(600)),
            ..CountingHandler::default()
        });
        let pipeline =
            Pipeline::<Shout, TestError>::builder(handler).build(&PipelineConfig::default());

        let result = pipeline
            .send(shout("slow"), &RequestContext::new())
            .await
            .unwrap();

        assert_eq!(result, CrudResult::succeeded(4));
    }

    #[tokio::test]
    async fn test_sender_trait_dispatches_through_pipeline() {
        async fn dispatch<S: Sender<Shout>>(sender: &S) -> Result<CrudResult<usize>, S::Error> {
            sender.send(shout("abc"), &RequestContext::new()).await
        }

        let pipeline = Pipeline::<Shout, TestError>::builder(Arc::new(CountingHandler::default()))
            .build(&PipelineConfig::default());

        let result = dispatch(&pipeline).await.unwrap();
        assert_eq!(result.result, Some(3));
    }
}
