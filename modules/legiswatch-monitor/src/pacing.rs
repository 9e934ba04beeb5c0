use std::time::Duration;

use tracing::debug;

/// Fixed-interval pacing between calls that share one upstream rate budget.
///
/// Search queries, page fetches and model calls all wait on the same interval;
/// execution is sequential, so a plain sleep between calls is enough to stay
/// under the quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    interval: Duration,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// A pacer that never sleeps.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn wait(&self) {
        if self.interval.is_zero() {
            return;
        }
        debug!(delay_ms = self.interval.as_millis() as u64, "Rate-limit pause");
        tokio::time::sleep(self.interval).await;
    }
}
