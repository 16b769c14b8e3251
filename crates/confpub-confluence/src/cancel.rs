//! Cooperative cancellation for publish runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::{PublishError, Stage};

/// Cancellation signal shared between a caller and a running pipeline.
///
/// The pipeline checks the token before each blocking call, so a request in
/// flight completes (or times out on its own) before the run stops. Clones
/// share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that also trips once `timeout` has elapsed.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Fail with [`PublishError::Cancelled`] if the token has tripped.
    pub(crate) fn check(&self, stage: Stage) -> Result<(), PublishError> {
        if self.is_cancelled() {
            return Err(PublishError::Cancelled(stage));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_token_not_cancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.check(Stage::Render).is_ok());
    }

    #[test]
    fn test_cancel_visible_through_clone() {
        let token = CancellationToken::new();
        let handle = token.clone();
        handle.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(
            token.check(Stage::Write),
            Err(PublishError::Cancelled(Stage::Write))
        ));
    }

    #[test]
    fn test_elapsed_deadline_cancels() {
        let token = CancellationToken::with_timeout(Duration::ZERO);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_future_deadline_not_cancelled() {
        let token = CancellationToken::with_timeout(Duration::from_secs(3600));
        assert!(!token.is_cancelled());
    }
}
