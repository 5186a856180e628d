use crate::{CrudResult, Request, RequestContext};
use async_trait::async_trait;

/// The single handler registered for a request type.
///
/// Business outcomes (not found, invalid input) are returned inside the
/// `CrudResult`; `Err` is reserved for infrastructure failures.
#[async_trait]
pub trait RequestHandler<R: Request, E: Send + 'static>: Send + Sync {
    async fn handle(&self, request: &R, ctx: &RequestContext) -> Result<CrudResult<R::Output>, E>;
}
