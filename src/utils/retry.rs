//! Bounded retry for store operations.

use std::future::Future;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;

/// Fixed-delay retry policy applied to every key-value call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub attempts: usize,
    /// Pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// Runs `operation` until it succeeds or the attempts are used up.
    ///
    /// The last error is returned on exhaustion; it is never swallowed.
    pub async fn run<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let strategy = FixedInterval::new(self.delay).take(self.attempts.saturating_sub(1));
        Retry::start(strategy, operation).await
    }
}
