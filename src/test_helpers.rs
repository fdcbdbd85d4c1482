//! Test utilities for creating temporary log files and collecting delivered lines.

#[cfg(test)]
use std::fs::{File, OpenOptions};
#[cfg(test)]
use std::io::Write;
#[cfg(test)]
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::{Arc, Mutex};

#[cfg(test)]
pub struct TempLogFile {
    pub path: PathBuf,
    _temp_dir: tempfile::TempDir,
}

#[cfg(test)]
impl TempLogFile {
    /// Create a new empty temporary log file for testing
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("test.log");

        File::create(&path)?;

        Ok(Self {
            path,
            _temp_dir: temp_dir,
        })
    }

    /// Create a temporary log file with one initial line
    pub fn with_content(content: &str) -> std::io::Result<Self> {
        let temp_file = Self::new()?;
        temp_file.append_content(content)?;
        Ok(temp_file)
    }

    /// Append a complete line to the temporary log file
    pub fn append_content(&self, content: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;

        writeln!(file, "{}", content)?;
        file.flush()?;
        Ok(())
    }

    /// Append bytes exactly as given, without adding a newline
    pub fn append_raw(&self, content: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;

        file.write_all(content.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Truncate the file (simulate copytruncate log rotation)
    pub fn truncate(&self) -> std::io::Result<()> {
        File::create(&self.path)?;
        Ok(())
    }

    /// Delete the file (simulate the log disappearing)
    pub fn remove(&self) -> std::io::Result<()> {
        std::fs::remove_file(&self.path)
    }

    /// Replace the file with a unix socket: it still stats, with size 0, but
    /// can never be opened for reading
    #[cfg(unix)]
    pub fn replace_with_socket(&self) -> std::io::Result<std::os::unix::net::UnixListener> {
        self.remove()?;
        std::os::unix::net::UnixListener::bind(&self.path)
    }

    /// Get the path to the temporary file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Shared buffer a callback can push delivered lines into.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct LineCollector {
    lines: Arc<Mutex<Vec<String>>>,
}

#[cfg(test)]
impl LineCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback that records every line it receives
    pub fn callback(
        &self,
    ) -> impl FnMut(&str) -> Result<(), std::convert::Infallible> + Send + 'static + use<> {
        let lines = Arc::clone(&self.lines);
        move |line: &str| {
            lines.lock().unwrap().push(line.to_string());
            Ok(())
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Poll until at least `count` lines arrived or `timeout` elapsed
    pub async fn wait_for(&self, count: usize, timeout: std::time::Duration) -> Vec<String> {
        let start = tokio::time::Instant::now();
        while self.lines.lock().unwrap().len() < count && start.elapsed() < timeout {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        self.lines()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_temp_log_file_creation() {
        let temp_file = TempLogFile::new().unwrap();
        assert!(temp_file.path().exists());
    }

    #[tokio::test]
    async fn test_append_content_and_raw() {
        let temp_file = TempLogFile::with_content("line 1").unwrap();
        temp_file.append_raw("par").unwrap();
        temp_file.append_raw("tial").unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(content, "line 1\npartial");
    }

    #[tokio::test]
    async fn test_truncate_and_remove() {
        let temp_file = TempLogFile::with_content("initial content").unwrap();
        temp_file.truncate().unwrap();
        assert!(std::fs::read_to_string(temp_file.path()).unwrap().is_empty());

        temp_file.remove().unwrap();
        assert!(!temp_file.path().exists());
    }

    #[test]
    fn test_line_collector_records_lines() {
        let collector = LineCollector::new();
        let mut callback = collector.callback();

        callback("a\n").unwrap();
        callback("b\n").unwrap();

        assert_eq!(collector.lines(), vec!["a\n", "b\n"]);
    }
}
