//! Stream adapter that follows a file on a background task.

use crate::config::FollowConfig;
use crate::error::{Error, Result};
use crate::follower::{Follower, FollowerHandle};
use futures::Stream;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A stream of complete lines appended to a followed file.
///
/// A fatal follow error is yielded as the last item before the stream ends.
pub struct LineStream {
    receiver: mpsc::UnboundedReceiver<Result<String>>,
    handle: FollowerHandle,
    _task_handle: JoinHandle<()>,
}

impl LineStream {
    /// Opens `path` and starts following it on a spawned task.
    ///
    /// Construction errors are returned here rather than through the stream.
    pub async fn new<P: AsRef<Path>>(
        path: P,
        start_offset: u64,
        config: FollowConfig,
    ) -> Result<Self> {
        let mut follower = Follower::open(path, start_offset, config).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let line_tx = tx.clone();
        follower.register_callback(move |line: &str| {
            line_tx
                .send(Ok(line.to_string()))
                .map_err(|_| Error::StreamClosed)
        });

        let handle = follower.handle();
        let task_handle = tokio::spawn(async move {
            // A stop or drop that lands before the task runs still counts
            if let Err(e) = follower.follow_pending_stop().await {
                // Fails only when the stream was dropped
                let _ = tx.send(Err(e));
            }
        });

        Ok(LineStream {
            receiver: rx,
            handle,
            _task_handle: task_handle,
        })
    }

    /// Stops the background follower; buffered lines can still be drained.
    pub fn stop(&self) {
        self.handle.stop();
    }

    /// Check if the stream has been closed/dropped
    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.receiver.is_closed()
    }
}

impl Drop for LineStream {
    fn drop(&mut self) {
        self.handle.stop();
    }
}

impl Stream for LineStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_recv(cx)
    }
}
