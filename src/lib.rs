//! A log follower library that implements `tail -f` style file following.
//!
//! A [`Follower`] polls a growing file and hands every complete appended line
//! (including its trailing `\n`) to a callback, in file order. Partial lines
//! are held back until their delimiter arrives, a file that shrinks is
//! reopened and read from the start, and transient stat or read failures are
//! retried with back-off before giving up with a typed error.
//!
//! # Example
//!
//! ```rust,no_run
//! use log_follower::{follow_lines, FollowConfig};
//! use tokio_stream::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut stream = follow_lines("app.log", FollowConfig::default()).await?;
//!
//!     while let Some(line) = stream.next().await {
//!         match line {
//!             Ok(content) => print!("{}", content),
//!             Err(e) => eprintln!("Error: {}", e),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

// Internal modules - not part of public API
mod config;
mod error;
mod file;
mod follower;
mod reader;
mod retry;
mod stream;
mod tracker;
mod watcher;

#[cfg(test)]
mod test_helpers;

// Public API exports
pub use config::{
    DEFAULT_INTERVAL, DEFAULT_MAX_READ_FAILURES, DEFAULT_MAX_STAT_FAILURES,
    DEFAULT_READ_RETRY_DELAY, DEFAULT_STAT_RETRY_DELAY, FollowConfig,
};
pub use error::{BoxError, Error, FileAccessKind, Result};
pub use follower::{Callback, Follower, FollowerHandle, FollowerState, stdout_callback};
pub use stream::LineStream;

use std::path::Path;

/// Creates a stream of lines appended to `path` from now on.
///
/// # Arguments
///
/// * `path` - File path to follow
/// * `config` - Polling interval, back-off and retry limits
///
/// # Example
///
/// ```rust,no_run
/// use log_follower::{follow_lines, FollowConfig};
/// use tokio_stream::StreamExt;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = FollowConfig::default().with_watch(true);
///     let mut stream = follow_lines("app.log", config).await?;
///
///     while let Some(line) = stream.next().await {
///         print!("{}", line?);
///     }
///
///     Ok(())
/// }
/// ```
pub async fn follow_lines<P: AsRef<Path>>(path: P, config: FollowConfig) -> Result<LineStream> {
    LineStream::new(path, 0, config).await
}
