//! Partial-line-safe line reading.

use crate::error::Error;
use crate::retry::RetryBudget;
use std::backtrace::Backtrace;
use std::io::SeekFrom;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncSeek, AsyncSeekExt};

const LINE_DELIMITER: u8 = b'\n';

/// Result of one read attempt.
#[derive(Debug)]
pub(crate) enum ReadOutcome {
    /// A complete line, delimiter included.
    Line(String),
    /// Nothing complete yet; the offset was left untouched.
    Pending,
    /// The read errored; back off and try again.
    Failed,
    /// Reads kept failing until the budget ran out.
    Fatal(Error),
}

pub(crate) struct LineReader {
    path: PathBuf,
    failures: RetryBudget,
    /// Set after an error, when the handle position may no longer match the offset.
    realign: bool,
}

impl LineReader {
    pub(crate) fn new(path: PathBuf, max_failures: u32) -> Self {
        Self {
            path,
            failures: RetryBudget::new(max_failures),
            realign: false,
        }
    }

    /// Reads at most one complete line starting at `offset`.
    pub(crate) async fn attempt<R>(&mut self, reader: &mut R, offset: &mut u64) -> ReadOutcome
    where
        R: AsyncBufRead + AsyncSeek + Unpin,
    {
        match self.read_line(reader, offset).await {
            Ok(Some(line)) => {
                self.failures.reset();
                ReadOutcome::Line(line)
            }
            Ok(None) => {
                self.failures.reset();
                ReadOutcome::Pending
            }
            Err(e) => {
                let exhausted = self.failures.fail();
                let attempts = self.failures.failures();
                if exhausted {
                    tracing::error!(
                        path = %self.path.display(),
                        attempts,
                        error = %e,
                        "Read data failed, giving up"
                    );
                    return ReadOutcome::Fatal(Error::ReadExhausted {
                        path: self.path.clone(),
                        attempts,
                        source: e,
                        trace: Backtrace::force_capture().to_string(),
                    });
                }
                tracing::warn!(
                    path = %self.path.display(),
                    attempts,
                    error = %e,
                    "Failed to read from followed file"
                );
                ReadOutcome::Failed
            }
        }
    }

    async fn read_line<R>(&mut self, reader: &mut R, offset: &mut u64) -> std::io::Result<Option<String>>
    where
        R: AsyncBufRead + AsyncSeek + Unpin,
    {
        if self.realign {
            reader.seek(SeekFrom::Start(*offset)).await?;
            self.realign = false;
        }

        let result = read_complete_line(reader, offset).await;
        if result.is_err() {
            self.realign = true;
        }
        result
    }

    #[cfg(test)]
    pub(crate) fn failures(&self) -> u32 {
        self.failures.failures()
    }
}

/// Reads one line and advances `offset` past it only if it is terminated.
///
/// Empty or unterminated reads rewind the handle to `offset`, so a producer
/// that is mid-write never has half a line delivered. After an error the
/// handle position is unspecified.
async fn read_complete_line<R>(reader: &mut R, offset: &mut u64) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + AsyncSeek + Unpin,
{
    let start = *offset;
    let mut buf = Vec::new();

    let read = reader.read_until(LINE_DELIMITER, &mut buf).await?;

    if read == 0 || !is_complete_line(&buf) {
        reader.seek(SeekFrom::Start(start)).await?;
        return Ok(None);
    }

    *offset = start + read as u64;
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

fn is_complete_line(buf: &[u8]) -> bool {
    buf.last() == Some(&LINE_DELIMITER)
}
