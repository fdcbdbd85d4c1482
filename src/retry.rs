//! Consecutive failure accounting.

/// Counts consecutive failures up to a fatal limit.
#[derive(Debug, Clone)]
pub(crate) struct RetryBudget {
    failures: u32,
    limit: u32,
}

impl RetryBudget {
    pub(crate) fn new(limit: u32) -> Self {
        Self { failures: 0, limit }
    }

    /// Records one failure; returns true once the limit is reached.
    pub(crate) fn fail(&mut self) -> bool {
        self.failures = self.failures.saturating_add(1);
        self.failures >= self.limit
    }

    pub(crate) fn reset(&mut self) {
        self.failures = 0;
    }

    pub(crate) fn failures(&self) -> u32 {
        self.failures
    }
}
