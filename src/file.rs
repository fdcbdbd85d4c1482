//! The followed file: path, owned handle, recorded size and read offset.

use crate::error::{Error, FileAccessKind, Result};
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, BufReader};

pub(crate) struct FollowedFile {
    path: PathBuf,
    pub(crate) reader: BufReader<File>,
    /// Last size observed by the size tracker.
    pub(crate) size: u64,
    /// Next unread byte.
    pub(crate) offset: u64,
}

impl FollowedFile {
    /// Validates and opens `path`.
    ///
    /// A `start_offset` of zero positions the handle at end of file so only
    /// future appends are read; any other value seeks to that exact byte.
    pub(crate) async fn open(path: &Path, start_offset: u64) -> Result<Self> {
        let file = open_validated(path).await?;
        let size = file.metadata().await?.len();

        let mut reader = BufReader::new(file);
        let target = if start_offset == 0 {
            SeekFrom::End(0)
        } else {
            SeekFrom::Start(start_offset)
        };
        let offset = reader.seek(target).await?;

        tracing::debug!(path = %path.display(), size, offset, "Opened followed file");

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            size,
            offset,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Current on-disk size of the path, which may no longer be the open handle.
    pub(crate) async fn stat_size(&self) -> std::io::Result<u64> {
        Ok(tokio::fs::metadata(&self.path).await?.len())
    }

    /// Replaces the handle with a fresh one positioned at byte 0.
    ///
    /// On failure the old handle is left in place; the caller treats the
    /// failure as terminal.
    pub(crate) async fn reload(&mut self) -> std::io::Result<()> {
        let file = File::open(&self.path).await?;
        let size = file.metadata().await?.len();

        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(0)).await?;

        self.reader = reader;
        self.size = size;
        self.offset = 0;
        Ok(())
    }
}

/// Opens `path` for reading after checking it exists and is a regular file.
async fn open_validated(path: &Path) -> Result<File> {
    let access_error = |kind| Error::FileAccess {
        path: path.to_path_buf(),
        kind,
    };

    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(access_error(FileAccessKind::NotFound));
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(access_error(FileAccessKind::NotReadable));
        }
        Err(e) => return Err(e.into()),
    };

    if metadata.is_dir() {
        return Err(access_error(FileAccessKind::IsDirectory));
    }

    match File::open(path).await {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            Err(access_error(FileAccessKind::NotReadable))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(access_error(FileAccessKind::NotFound)),
        Err(e) => Err(e.into()),
    }
}
