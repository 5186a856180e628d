use tokio_util::sync::CancellationToken;

/// Actor id stamped on audit fields when a request has no authenticated user.
pub const ANONYMOUS_ACTOR: i64 = 0;

/// Per-request ambient data: who is acting and whether the caller gave up.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    actor: Option<i64>,
    cancellation: CancellationToken,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_actor(actor: Option<i64>) -> Self {
        Self {
            actor,
            ..Self::default()
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn actor(&self) -> Option<i64> {
        self.actor
    }

    /// The actor id, or [`ANONYMOUS_ACTOR`] when unauthenticated.
    pub fn actor_id(&self) -> i64 {
        self.actor.unwrap_or(ANONYMOUS_ACTOR)
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_actor_defaults_to_zero() {
        let ctx = RequestContext::new();
        assert_eq!(ctx.actor(), None);
        assert_eq!(ctx.actor_id(), ANONYMOUS_ACTOR);
    }

    #[test]
    fn test_cancellation_is_shared_with_token() {
        let token = CancellationToken::new();
        let ctx = RequestContext::for_actor(Some(42)).with_cancellation(token.clone());

        assert!(!ctx.is_cancelled());
        token.cancel();
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.actor_id(), 42);
    }
}
