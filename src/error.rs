//! Error types for the log follower library.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by line callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a path was rejected when constructing a follower.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAccessKind {
    NotFound,
    NotReadable,
    IsDirectory,
}

impl fmt::Display for FileAccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FileAccessKind::NotFound => "does not exist",
            FileAccessKind::NotReadable => "is not readable",
            FileAccessKind::IsDirectory => "is a directory",
        };
        f.write_str(text)
    }
}

/// The main error type for log follower operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors when opening or seeking the followed file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File watching errors from the notify crate.
    #[error("File watcher error: {0}")]
    Watcher(#[from] notify::Error),

    /// The path handed to the follower cannot be followed.
    #[error("File '{}' {kind}", .path.display())]
    FileAccess { path: PathBuf, kind: FileAccessKind },

    /// A polling setting is out of range.
    #[error("Invalid follow configuration: {message}")]
    InvalidConfig { message: String },

    /// The file could not be stat'd for too many consecutive polls.
    #[error("File '{}' unavailable after {attempts} consecutive size checks", .path.display())]
    FileVanished { path: PathBuf, attempts: u32 },

    /// The file shrank and could not be reopened.
    #[error("Failed to reopen '{}' after it shrank: {source}", .path.display())]
    ReloadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reads kept failing until the retry budget ran out.
    #[error("Reading '{}' failed {attempts} consecutive times: {source}\n{trace}", .path.display())]
    ReadExhausted {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: std::io::Error,
        trace: String,
    },

    /// The registered callback rejected a line.
    #[error("Line callback failed: {0}")]
    Callback(#[source] BoxError),

    /// Stream has been closed or dropped.
    #[error("Stream closed")]
    StreamClosed,
}

/// A convenient Result type for log follower operations.
pub type Result<T> = std::result::Result<T, Error>;
