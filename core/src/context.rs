//! Cancellation and deadline carried through every client call.
//!
//! # Design
//! A `Context` is cheap to clone; clones share one `CancellationToken`, so
//! any holder may cancel an in-flight operation from another thread. Derived
//! contexts hold a child token: cancelling the parent cancels them, not the
//! other way round. Deadlines are absolute and only ever tighten.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::TransportError;

#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline, until `cancel`
    /// is called on it or one of its clones.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that expires after `timeout`, observing the parent's
    /// cancellation. A timeout too large to represent keeps the parent's
    /// deadline.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => Self {
                token: self.token.child_token(),
                deadline: self.deadline,
            },
        }
    }

    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token observed by this context, for callers bridging into async code.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline. `None` when there is no deadline;
    /// `Some(Duration::ZERO)` once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Fail if the context is cancelled or past its deadline.
    pub fn check(&self) -> Result<(), TransportError> {
        if self.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        if self.remaining() == Some(Duration::ZERO) {
            return Err(TransportError::DeadlineExceeded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_context_is_live() {
        let ctx = Context::background();
        assert!(ctx.check().is_ok());
        assert!(ctx.remaining().is_none());
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let ctx = Context::background();
        let child = ctx.with_timeout(Duration::from_secs(60));
        ctx.cancel();
        assert!(matches!(child.check(), Err(TransportError::Cancelled)));
    }

    #[test]
    fn cancelling_child_leaves_parent_live() {
        let parent = Context::background();
        let child = parent.with_timeout(Duration::from_secs(60));
        child.cancel();
        assert!(parent.check().is_ok());
        assert!(matches!(child.check(), Err(TransportError::Cancelled)));
    }

    #[test]
    fn unrepresentable_timeout_keeps_parent_deadline() {
        let ctx = Context::background().with_timeout(Duration::MAX);
        assert!(ctx.deadline().is_none());
        assert!(ctx.check().is_ok());

        let parent = Context::background().with_timeout(Duration::from_secs(5));
        let child = parent.with_timeout(Duration::MAX);
        assert_eq!(child.deadline(), parent.deadline());
    }

    #[test]
    fn elapsed_deadline_fails_check() {
        let ctx = Context::background().with_deadline(Instant::now());
        assert!(matches!(ctx.check(), Err(TransportError::DeadlineExceeded)));
    }

    #[test]
    fn child_deadline_never_extends_parent() {
        let parent = Context::background().with_timeout(Duration::from_millis(10));
        let child = parent.with_timeout(Duration::from_secs(60));
        assert_eq!(child.deadline(), parent.deadline());
    }
}
