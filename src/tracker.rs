//! Size monitoring: growth, truncation and rotation detection.

use crate::error::Error;
use crate::file::FollowedFile;
use crate::retry::RetryBudget;

/// Result of validating the followed file before a read attempt.
#[derive(Debug)]
pub(crate) enum SizeCheck {
    /// The file is readable at the current offset.
    Ready,
    /// The path could not be stat'd; back off and try again.
    NotReady,
    /// The file is gone for good.
    Fatal(Error),
}

pub(crate) struct SizeTracker {
    failures: RetryBudget,
}

impl SizeTracker {
    pub(crate) fn new(max_failures: u32) -> Self {
        Self {
            failures: RetryBudget::new(max_failures),
        }
    }

    /// Re-stats the path and reloads the file if it shrank.
    pub(crate) async fn check(&mut self, file: &mut FollowedFile) -> SizeCheck {
        let current_size = match file.stat_size().await {
            Ok(size) => size,
            Err(e) => {
                let exhausted = self.failures.fail();
                let attempts = self.failures.failures();
                if exhausted {
                    tracing::error!(
                        path = %file.path().display(),
                        attempts,
                        error = %e,
                        "Giving up on followed file"
                    );
                    return SizeCheck::Fatal(Error::FileVanished {
                        path: file.path().to_path_buf(),
                        attempts,
                    });
                }
                tracing::warn!(
                    path = %file.path().display(),
                    attempts,
                    error = %e,
                    "Failed to get size of followed file"
                );
                return SizeCheck::NotReady;
            }
        };
        self.failures.reset();

        if !detect_file_truncation(current_size, file.size) {
            file.size = current_size;
            return SizeCheck::Ready;
        }

        tracing::warn!(
            path = %file.path().display(),
            recorded = file.size,
            current = current_size,
            "Followed file shrank, reopening from the start"
        );

        match file.reload().await {
            Ok(()) => SizeCheck::Ready,
            Err(e) => {
                tracing::error!(
                    path = %file.path().display(),
                    error = %e,
                    "Failed to reopen followed file"
                );
                SizeCheck::Fatal(Error::ReloadFailed {
                    path: file.path().to_path_buf(),
                    source: e,
                })
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn failures(&self) -> u32 {
        self.failures.failures()
    }
}

/// Detect if the file was truncated or replaced by a smaller one
fn detect_file_truncation(current_size: u64, recorded_size: u64) -> bool {
    current_size < recorded_size
}
