//! In-process request dispatch.
//!
//! Each request type gets one [`Pipeline`]: an ordered chain of
//! [`PipelineBehavior`]s (validation, performance monitoring) around a
//! single [`RequestHandler`]. Handlers report business outcomes through
//! [`CrudResult`]; the pipeline's error type is reserved for failures.
//!
//! ```ignore
//! let pipeline = Pipeline::<CreateTodoList, TodoError>::builder(handler)
//!     .validated()
//!     .validator(UniqueListTitle::new(store))
//!     .build(&PipelineConfig::from_env()?);
//!
//! let result = pipeline.send(command, &RequestContext::for_actor(Some(7))).await?;
//! ```

mod behavior;
mod config;
mod context;
mod error;
mod handler;
mod performance;
mod pipeline;
mod request;
mod result;
mod validation;

pub use behavior::{Next, PipelineBehavior};
pub use config::PipelineConfig;
pub use context::{ANONYMOUS_ACTOR, RequestContext};
pub use error::{MediatorError, ValidationFailed};
pub use handler::RequestHandler;
pub use performance::{DEFAULT_SLOW_REQUEST_THRESHOLD, PerformanceBehavior};
pub use pipeline::{Pipeline, PipelineBuilder, Sender};
pub use request::{Command, MessageKind, Query, Request};
pub use result::{CrudMessage, CrudOutcome, CrudResult, CrudStatus};
pub use validation::{
    DeriveValidator, ValidationBehavior, ValidationFailure, ValidationMode, Validator,
    failures_from,
};

// Re-exported so request types can cancel work without a direct dependency.
pub use tokio_util::sync::CancellationToken;
