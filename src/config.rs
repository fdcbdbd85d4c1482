//! Polling configuration for a follower.

use crate::error::{Error, Result};
use std::time::Duration;

/// Default sleep between loop iterations.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(10);
/// Back-off after a failed stat of the followed path.
pub const DEFAULT_STAT_RETRY_DELAY: Duration = Duration::from_millis(200);
/// Back-off after a failed read.
pub const DEFAULT_READ_RETRY_DELAY: Duration = Duration::from_millis(100);
/// Consecutive stat failures before the file is considered gone.
pub const DEFAULT_MAX_STAT_FAILURES: u32 = 20;
/// Consecutive read failures before following gives up.
pub const DEFAULT_MAX_READ_FAILURES: u32 = 1000;

/// Timing and retry settings used by [`crate::Follower`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowConfig {
    pub interval: Duration,
    pub stat_retry_delay: Duration,
    pub read_retry_delay: Duration,
    pub max_stat_failures: u32,
    pub max_read_failures: u32,
    /// Wake idle sleeps early on filesystem notifications for the file.
    pub watch: bool,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            stat_retry_delay: DEFAULT_STAT_RETRY_DELAY,
            read_retry_delay: DEFAULT_READ_RETRY_DELAY,
            max_stat_failures: DEFAULT_MAX_STAT_FAILURES,
            max_read_failures: DEFAULT_MAX_READ_FAILURES,
            watch: false,
        }
    }
}

impl FollowConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_stat_retry_delay(mut self, delay: Duration) -> Self {
        self.stat_retry_delay = delay;
        self
    }

    pub fn with_read_retry_delay(mut self, delay: Duration) -> Self {
        self.read_retry_delay = delay;
        self
    }

    pub fn with_max_stat_failures(mut self, limit: u32) -> Self {
        self.max_stat_failures = limit;
        self
    }

    pub fn with_max_read_failures(mut self, limit: u32) -> Self {
        self.max_read_failures = limit;
        self
    }

    pub fn with_watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    /// Rejects settings the follow loop cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.max_stat_failures == 0 {
            return Err(Error::InvalidConfig {
                message: "max_stat_failures must be at least 1".to_string(),
            });
        }
        if self.max_read_failures == 0 {
            return Err(Error::InvalidConfig {
                message: "max_read_failures must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
