use crate::{CrudResult, Request, RequestContext, RequestHandler};
use async_trait::async_trait;
use std::sync::Arc;

/// A cross-cutting stage wrapped around a handler.
///
/// Implementations decide whether to call `next.run(..)`; skipping it
/// short-circuits the rest of the chain.
#[async_trait]
pub trait PipelineBehavior<R: Request, E: Send + 'static>: Send + Sync {
    async fn handle(
        &self,
        request: &R,
        ctx: &RequestContext,
        next: Next<'_, R, E>,
    ) -> Result<CrudResult<R::Output>, E>;
}

/// The remainder of the chain after the current behavior.
pub struct Next<'a, R: Request, E: Send + 'static> {
    behaviors: &'a [Arc<dyn PipelineBehavior<R, E>>],
    handler: &'a dyn RequestHandler<R, E>,
}

impl<'a, R: Request, E: Send + 'static> Next<'a, R, E> {
    pub(crate) fn new(
        behaviors: &'a [Arc<dyn PipelineBehavior<R, E>>],
        handler: &'a dyn RequestHandler<R, E>,
    ) -> Self {
        Self { behaviors, handler }
    }

    pub async fn run(self, request: &R, ctx: &RequestContext) -> Result<CrudResult<R::Output>, E> {
        match self.behaviors.split_first() {
            Some((behavior, rest)) => {
                behavior
                    .handle(request, ctx, Next::new(rest, self.handler))
                    .await
            }
            None => self.handler.handle(request, ctx).await,
        }
    }
}
