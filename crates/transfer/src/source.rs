//! Buffered, read-only access to the local file being uploaded.

use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::fs::File;
use tokio::io::{AsyncRead, BufReader, ReadBuf};

use crate::error::TransferError;

/// Read buffer for the source file: 64 KiB.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// A local file opened for sequential reading.
///
/// The file handle is released when the source is dropped.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    file_name: String,
    size: u64,
    reader: BufReader<File>,
}

impl FileSource {
    /// Opens `path` read-only. Directories are rejected.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, TransferError> {
        let path = path.as_ref().to_path_buf();
        let access = |source: io::Error| TransferError::FileAccess {
            path: path.clone(),
            source,
        };

        let file = File::open(&path).await.map_err(access)?;
        let metadata = file.metadata().await.map_err(access)?;
        if !metadata.is_file() {
            return Err(access(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        Ok(Self {
            file_name: base_name(&path),
            size: metadata.len(),
            reader: BufReader::with_capacity(READ_BUFFER_SIZE, file),
            path,
        })
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name declared as the multipart filename.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// File size at open time.
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl AsyncRead for FileSource {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.reader).poll_read(cx, buf)
    }
}

/// Last path component, lossily converted to UTF-8.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
