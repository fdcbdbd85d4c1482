//! Optional file change notifications using the notify crate.
//!
//! Polling stays authoritative; events only cut idle sleeps short.

use crate::error::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Watches the directory holding a followed file.
pub(crate) struct FileWatcher {
    _watcher: RecommendedWatcher,
    receiver: mpsc::UnboundedReceiver<notify::Result<Event>>,
    file_path: PathBuf,
    file_name: String,
}

impl FileWatcher {
    /// Creates a new file watcher for the specified path.
    pub(crate) fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        let (tx, rx) = mpsc::unbounded_channel();

        let watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            file_path,
            file_name,
        })
    }

    /// Starts watching the parent directory so rotations are seen too.
    pub(crate) fn start_watching(&mut self) -> Result<()> {
        let watch_path = watch_directory(&self.file_path);
        self._watcher.watch(&watch_path, RecursiveMode::NonRecursive)?;
        Ok(())
    }

    /// Resolves on the next event that names the followed file.
    ///
    /// Never resolves once the notification channel has closed.
    pub(crate) async fn changed(&mut self) {
        loop {
            match self.receiver.recv().await {
                Some(Ok(event)) => {
                    if is_event_relevant_to_file(&event, &self.file_name) {
                        return;
                    }
                }
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "File watcher reported an error");
                }
                None => std::future::pending::<()>().await,
            }
        }
    }

    #[cfg(test)]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

/// Directory to register with notify for `file_path`.
fn watch_directory(file_path: &Path) -> PathBuf {
    match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Check if a notify event is relevant to a specific file
pub(crate) fn is_event_relevant_to_file(event: &Event, target_file_name: &str) -> bool {
    event.paths.iter().any(|path| {
        path.file_name()
            .map(|name| name.to_string_lossy() == target_file_name)
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TempLogFile;
    use notify::EventKind;
    use notify::event::{DataChange, ModifyKind};
    use std::time::Duration;

    fn modify_event(paths: &[&str]) -> Event {
        Event {
            kind: EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            paths: paths.iter().map(|path| PathBuf::from(*path)).collect(),
            attrs: Default::default(),
        }
    }

    #[test]
    fn test_file_watcher_creation() {
        let file_path = PathBuf::from("/tmp/test.log");
        let watcher = FileWatcher::new(&file_path).unwrap();

        assert_eq!(watcher.file_path(), file_path.as_path());
        assert_eq!(watcher.file_name, "test.log");
    }

    #[test]
    fn test_watch_directory() {
        assert_eq!(
            watch_directory(Path::new("/var/log/app/test.log")),
            PathBuf::from("/var/log/app")
        );
        assert_eq!(watch_directory(Path::new("test.log")), PathBuf::from("."));
    }

    #[test]
    fn test_is_event_relevant_to_file_exact_match() {
        let event = modify_event(&["/tmp/test.log"]);

        assert!(is_event_relevant_to_file(&event, "test.log"));
        assert!(!is_event_relevant_to_file(&event, "other.log"));
    }

    #[test]
    fn test_is_event_relevant_to_file_multiple_paths() {
        // Renames carry both the old and new names
        let event = modify_event(&["/tmp/test.log", "/tmp/test.log.1"]);

        assert!(is_event_relevant_to_file(&event, "test.log"));
        assert!(is_event_relevant_to_file(&event, "test.log.1"));
        assert!(!is_event_relevant_to_file(&event, "missing.log"));
    }

    #[test]
    fn test_is_event_relevant_to_file_no_file_name() {
        let event = modify_event(&["/"]);
        assert!(!is_event_relevant_to_file(&event, "test.log"));

        let empty = modify_event(&[]);
        assert!(!is_event_relevant_to_file(&empty, "test.log"));
    }

    #[test]
    fn test_is_event_relevant_to_file_case_sensitivity() {
        let event = modify_event(&["/tmp/Test.Log"]);

        assert!(!is_event_relevant_to_file(&event, "test.log"));
        assert!(is_event_relevant_to_file(&event, "Test.Log"));
    }

    #[tokio::test]
    async fn test_changed_waits_without_events() {
        let temp_file = TempLogFile::new().unwrap();
        let mut watcher = FileWatcher::new(temp_file.path()).unwrap();
        watcher.start_watching().unwrap();

        let result =
            tokio::time::timeout(Duration::from_millis(10), watcher.changed()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_changed_resolves_on_append() {
        let temp_file = TempLogFile::new().unwrap();
        let mut watcher = FileWatcher::new(temp_file.path()).unwrap();
        watcher.start_watching().unwrap();

        temp_file.append_content("wake up").unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), watcher.changed()).await;
        assert!(result.is_ok());
    }
}
