use crate::{CrudResult, Next, PipelineBehavior, Request, RequestContext};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_SLOW_REQUEST_THRESHOLD: Duration = Duration::from_millis(500);

/// Logs a warning for requests that take longer than the threshold.
///
/// Only observes: the inner result is returned untouched.
#[derive(Debug, Clone, Copy)]
pub struct PerformanceBehavior {
    threshold: Duration,
}

impl PerformanceBehavior {
    pub fn new(threshold: Duration) -> Self {
        Self { threshold }
    }

    pub fn is_slow(&self, elapsed: Duration) -> bool {
        elapsed > self.threshold
    }
}

impl Default for PerformanceBehavior {
    fn default() -> Self {
        Self::new(DEFAULT_SLOW_REQUEST_THRESHOLD)
    }
}

#[async_trait]
impl<R, E> PipelineBehavior<R, E> for PerformanceBehavior
where
    R: Request,
    E: Send + 'static,
{
    async fn handle(
        &self,
        request: &R,
        ctx: &RequestContext,
        next: Next<'_, R, E>,
    ) -> Result<CrudResult<R::Output>, E> {
        let started = Instant::now();
        let outcome = next.run(request, ctx).await;
        let elapsed = started.elapsed();

        if self.is_slow(elapsed) {
            tracing::warn!(
                request = R::NAME,
                kind = %R::KIND,
                elapsed_ms = elapsed.as_millis() as u64,
                actor = ctx.actor_id(),
                payload = ?request,
                "Long running request"
            );
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_exclusive() {
        let behavior = PerformanceBehavior::default();
        assert!(!behavior.is_slow(Duration::from_millis(500)));
        assert!(behavior.is_slow(Duration::from_millis(501)));
    }
}
