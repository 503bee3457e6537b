use std::time::Duration;

use crate::config::QueryConfig;

pub const DEFAULT_MAX_RETRY_ATTEMPTS: u32 = 5;
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Per-query retry and display policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Fixed delay before each automatic retry of a network failure.
    pub retry_interval: Duration,
    /// Automatic retries allowed after a manual fetch; 0 disables retry.
    pub max_retry_attempts: u32,
    /// Publish `Loading` while an invocation is in flight. When off, the
    /// previous result stays visible until the new one lands.
    pub clear_while_fetching: bool,
}

impl QueryOptions {
    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn max_retry_attempts(mut self, attempts: u32) -> Self {
        self.max_retry_attempts = attempts;
        self
    }

    pub fn clear_while_fetching(mut self, clear: bool) -> Self {
        self.clear_while_fetching = clear;
        self
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            retry_interval: DEFAULT_RETRY_INTERVAL,
            max_retry_attempts: DEFAULT_MAX_RETRY_ATTEMPTS,
            clear_while_fetching: true,
        }
    }
}

impl From<&QueryConfig> for QueryOptions {
    fn from(config: &QueryConfig) -> Self {
        Self {
            retry_interval: Duration::from_millis(config.retry_interval_ms),
            max_retry_attempts: config.max_retry_attempts,
            clear_while_fetching: config.clear_while_fetching,
        }
    }
}
