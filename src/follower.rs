//! The follow loop and its control surface.

use crate::config::FollowConfig;
use crate::error::{BoxError, Error, Result};
use crate::file::FollowedFile;
use crate::reader::{LineReader, ReadOutcome};
use crate::tracker::{SizeCheck, SizeTracker};
use crate::watcher::FileWatcher;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

/// Consumer of followed lines. Each call receives one line with its trailing `\n`.
pub type Callback = Box<dyn FnMut(&str) -> std::result::Result<(), BoxError> + Send>;

/// Whether a follower is currently inside [`Follower::follow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowerState {
    Running,
    Stopped,
}

/// State reachable from outside the loop.
struct Shared {
    stop_requested: AtomicBool,
    running: AtomicBool,
    wake: Notify,
    pending_callback: Mutex<Option<Callback>>,
}

impl Shared {
    fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }

    fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    fn state(&self) -> FollowerState {
        if self.running.load(Ordering::SeqCst) {
            FollowerState::Running
        } else {
            FollowerState::Stopped
        }
    }

    fn pending_callback(&self) -> MutexGuard<'_, Option<Callback>> {
        self.pending_callback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cloneable control handle for a [`Follower`] running elsewhere.
///
/// Both operations are safe to call from other tasks, other threads, or from
/// inside the active callback.
#[derive(Clone)]
pub struct FollowerHandle {
    shared: Arc<Shared>,
}

impl FollowerHandle {
    /// Asks the loop to exit after the current iteration. Idempotent.
    ///
    /// Only affects a running `follow`; each call to `follow` starts with the
    /// request cleared.
    pub fn stop(&self) {
        self.shared.stop();
    }

    /// Replaces the active callback before the next delivered line.
    pub fn register_callback<F, E>(&self, callback: F)
    where
        F: FnMut(&str) -> std::result::Result<(), E> + Send + 'static,
        E: Into<BoxError>,
    {
        *self.shared.pending_callback() = Some(into_callback(callback));
    }

    pub fn state(&self) -> FollowerState {
        self.shared.state()
    }
}

/// Follows one file and hands every complete appended line to a callback.
///
/// # Example
///
/// ```rust,no_run
/// use log_follower::{FollowConfig, Follower};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut follower = Follower::open("app.log", 0, FollowConfig::default()).await?;
///     follower.register_callback(|line: &str| -> Result<(), std::io::Error> {
///         print!("{}", line);
///         Ok(())
///     });
///     follower.follow().await?;
///     Ok(())
/// }
/// ```
pub struct Follower {
    file: FollowedFile,
    tracker: SizeTracker,
    reader: LineReader,
    watcher: Option<FileWatcher>,
    callback: Callback,
    config: FollowConfig,
    shared: Arc<Shared>,
}

impl Follower {
    /// Validates `path` and opens it for following.
    ///
    /// A `start_offset` of zero starts at end of file. Any other value resumes
    /// at that byte; lines are skipped if the file was truncated in between.
    /// Lines go to standard output until a callback is registered.
    pub async fn open<P: AsRef<Path>>(
        path: P,
        start_offset: u64,
        config: FollowConfig,
    ) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref();
        let file = FollowedFile::open(path, start_offset).await?;

        let watcher = if config.watch {
            start_watcher(path)
        } else {
            None
        };

        Ok(Self {
            tracker: SizeTracker::new(config.max_stat_failures),
            reader: LineReader::new(path.to_path_buf(), config.max_read_failures),
            file,
            watcher,
            callback: stdout_callback(),
            config,
            shared: Arc::new(Shared {
                stop_requested: AtomicBool::new(false),
                running: AtomicBool::new(false),
                wake: Notify::new(),
                pending_callback: Mutex::new(None),
            }),
        })
    }

    /// Follows the file until stopped, sleeping `config.interval` between polls.
    pub async fn follow(&mut self) -> Result<()> {
        let interval = self.config.interval;
        self.follow_with_interval(interval).await
    }

    /// Follows the file until stopped, sleeping `interval` between polls.
    ///
    /// Any stop requested before this call is discarded. Returns `Ok(())`
    /// after [`Follower::stop`]. Every other way out of the loop is an error:
    /// the file vanished, could not be reopened after a shrink, kept failing
    /// to read, or the callback failed.
    pub async fn follow_with_interval(&mut self, interval: Duration) -> Result<()> {
        self.shared.stop_requested.store(false, Ordering::SeqCst);
        self.follow_until_stopped(interval).await
    }

    /// Like [`Follower::follow`], but a stop issued before the call is honored.
    pub(crate) async fn follow_pending_stop(&mut self) -> Result<()> {
        let interval = self.config.interval;
        self.follow_until_stopped(interval).await
    }

    async fn follow_until_stopped(&mut self, interval: Duration) -> Result<()> {
        self.shared.running.store(true, Ordering::SeqCst);
        tracing::debug!(
            path = %self.file.path().display(),
            offset = self.file.offset,
            "Following file"
        );

        let result = self.run(interval).await;

        if result.is_err() {
            self.shared.stop_requested.store(true, Ordering::SeqCst);
        }
        // A callback registered through a handle but never delivered to
        // must not outlive the loop inside the shared state
        if let Some(callback) = self.shared.pending_callback().take() {
            self.callback = callback;
        }
        self.shared.running.store(false, Ordering::SeqCst);
        match &result {
            Ok(()) => tracing::debug!(path = %self.file.path().display(), "Follow stopped"),
            Err(e) => tracing::error!(
                path = %self.file.path().display(),
                error = %e,
                "Follow terminated"
            ),
        }
        result
    }

    async fn run(&mut self, interval: Duration) -> Result<()> {
        while !self.shared.stop_requested() {
            match self.tracker.check(&mut self.file).await {
                SizeCheck::Ready => {}
                SizeCheck::NotReady => {
                    self.pause(self.config.stat_retry_delay, false).await;
                    continue;
                }
                SizeCheck::Fatal(e) => return Err(e),
            }

            match self
                .reader
                .attempt(&mut self.file.reader, &mut self.file.offset)
                .await
            {
                ReadOutcome::Line(line) => self.deliver(&line)?,
                ReadOutcome::Pending => {}
                ReadOutcome::Failed => self.pause(self.config.read_retry_delay, false).await,
                ReadOutcome::Fatal(e) => return Err(e),
            }

            self.pause(interval, true).await;
        }
        Ok(())
    }

    fn deliver(&mut self, line: &str) -> Result<()> {
        let pending = self.shared.pending_callback().take();
        if let Some(callback) = pending {
            self.callback = callback;
        }
        (self.callback)(line).map_err(Error::Callback)
    }

    /// Sleeps for `duration`, waking early on stop and, if `watch` is set,
    /// on a change notification for the file.
    async fn pause(&mut self, duration: Duration, watch: bool) {
        if self.shared.stop_requested() {
            return;
        }

        let woken = self.shared.wake.notified();
        let watcher = if watch { self.watcher.as_mut() } else { None };
        let changed = async move {
            match watcher {
                Some(watcher) => watcher.changed().await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = woken => {}
            _ = changed => {}
        }
    }

    /// Asks the loop to exit after the current iteration. Idempotent.
    pub fn stop(&self) {
        self.shared.stop();
    }

    /// Replaces the active callback, discarding any swap still pending from
    /// a [`FollowerHandle`].
    pub fn register_callback<F, E>(&mut self, callback: F)
    where
        F: FnMut(&str) -> std::result::Result<(), E> + Send + 'static,
        E: Into<BoxError>,
    {
        self.shared.pending_callback().take();
        self.callback = into_callback(callback);
    }

    /// A handle for stopping the loop or swapping the callback while
    /// `follow` holds the follower.
    pub fn handle(&self) -> FollowerHandle {
        FollowerHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Byte offset of the next unread byte; persist this to resume later.
    pub fn offset(&self) -> u64 {
        self.file.offset
    }

    /// Size recorded at the last successful size check.
    pub fn size(&self) -> u64 {
        self.file.size
    }

    pub fn state(&self) -> FollowerState {
        self.shared.state()
    }

    pub fn config(&self) -> &FollowConfig {
        &self.config
    }
}

/// Writes each line to standard output as-is.
pub fn stdout_callback() -> Callback {
    Box::new(|line: &str| -> std::result::Result<(), BoxError> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(line.as_bytes())?;
        stdout.flush()?;
        Ok(())
    })
}

fn into_callback<F, E>(mut callback: F) -> Callback
where
    F: FnMut(&str) -> std::result::Result<(), E> + Send + 'static,
    E: Into<BoxError>,
{
    Box::new(move |line: &str| -> std::result::Result<(), BoxError> {
        callback(line).map_err(Into::into)
    })
}

fn start_watcher(path: &Path) -> Option<FileWatcher> {
    let watcher = FileWatcher::new(path).and_then(|mut watcher| {
        watcher.start_watching()?;
        Ok(watcher)
    });

    match watcher {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "File notifications unavailable, polling only"
            );
            None
        }
    }
}
