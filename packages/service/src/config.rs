use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Upper bound on any single store call.
    pub store_timeout: Duration,
    /// How many times a reassignment is re-run after losing a
    /// compare-and-swap on the reviewer list.
    pub reassign_attempts: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(2),
            reassign_attempts: 3,
        }
    }
}

impl ServiceConfig {
    #[must_use]
    pub const fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    #[must_use]
    pub fn with_reassign_attempts(mut self, attempts: usize) -> Self {
        self.reassign_attempts = attempts.max(1);
        self
    }
}
