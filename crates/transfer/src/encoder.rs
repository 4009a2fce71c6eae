//! Streams a file and its form fields into a [`PipeWriter`] as a
//! multipart body, running as its own task.
//!
//! Whatever happens while encoding, the pipe's write end is closed exactly
//! once before the task finishes, so the reading side always reaches
//! end-of-stream. Failures are recorded in a shared [`FirstError`] instead
//! of being returned, because the caller only inspects them after its
//! request has completed.

use std::path::PathBuf;

use md5::{Digest, Md5};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{FirstError, PipeError, TransferError};
use crate::multipart::MultipartWriter;
use crate::pipe::PipeWriter;
use crate::source::FileSource;

/// Form field carrying the file content.
pub const FILE_FIELD: &str = "file";

/// Bytes moved from the source to the pipe per iteration.
const COPY_CHUNK_SIZE: usize = 32 * 1024;

/// What the encoder managed to write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeSummary {
    /// File bytes copied into the body.
    pub bytes: u64,
    /// Hex MD5 of the copied bytes (empty unless the whole file was read).
    pub md5: String,
    /// True if every part and the closing boundary were written.
    pub completed: bool,
}

/// Multipart producer bound to the write end of a transfer pipe.
pub struct StreamEncoder<R> {
    source: R,
    source_path: PathBuf,
    file_name: String,
    fields: Vec<(String, String)>,
    writer: MultipartWriter<PipeWriter>,
    errors: FirstError,
    cancel: CancellationToken,
    progress: Option<mpsc::Sender<u64>>,
}

impl StreamEncoder<FileSource> {
    /// Encoder for an opened local file, named after its base name.
    pub fn from_file(source: FileSource, pipe: PipeWriter, errors: FirstError) -> Self {
        let file_name = source.file_name().to_string();
        let source_path = source.path().to_path_buf();
        let mut encoder = Self::new(source, file_name, pipe, errors);
        encoder.source_path = source_path;
        encoder
    }
}

impl<R> StreamEncoder<R>
where
    R: AsyncRead + Unpin + Send,
{
    /// Creates an encoder that declares `file_name` as the file part's filename.
    pub fn new(
        source: R,
        file_name: impl Into<String>,
        pipe: PipeWriter,
        errors: FirstError,
    ) -> Self {
        let file_name = file_name.into();
        Self {
            source,
            source_path: PathBuf::from(&file_name),
            file_name,
            fields: Vec::new(),
            writer: MultipartWriter::new(pipe),
            errors,
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    /// Appends a text part written after the file part.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Aborts encoding when `cancel` fires; the pipe is still closed.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Reports cumulative copied bytes. Updates are dropped when the channel is full.
    pub fn with_progress(mut self, progress: mpsc::Sender<u64>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// `Content-Type` header matching the body this encoder writes.
    pub fn content_type(&self) -> String {
        self.writer.content_type()
    }

    pub fn boundary(&self) -> &str {
        self.writer.boundary()
    }

    /// Runs the encoder on the tokio runtime.
    pub fn spawn(self) -> JoinHandle<EncodeSummary>
    where
        R: 'static,
    {
        tokio::spawn(self.run())
    }

    /// Encodes the whole body, records the first failure, and closes the pipe.
    pub async fn run(mut self) -> EncodeSummary {
        let cancel = self.cancel.clone();
        let mut summary = EncodeSummary::default();

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransferError::Pipe(PipeError::Closed)),
            result = self.encode(&mut summary) => result,
        };

        match outcome {
            Ok(()) => {
                summary.completed = true;
                debug!(
                    file = %self.file_name,
                    bytes = summary.bytes,
                    "multipart body encoded"
                );
            }
            Err(err) => {
                debug!(file = %self.file_name, error = %err, "multipart encoding failed");
                self.errors.record(err);
            }
        }

        if let Err(err) = self.writer.get_mut().close().await {
            self.errors.record(err.into());
        }
        summary
    }

    async fn encode(&mut self, summary: &mut EncodeSummary) -> Result<(), TransferError> {
        self.writer
            .begin_file_part(FILE_FIELD, &self.file_name)
            .await?;

        let mut hasher = Md5::new();
        let mut buf = vec![0u8; COPY_CHUNK_SIZE];
        loop {
            let n = self
                .source
                .read(&mut buf)
                .await
                .map_err(|source| TransferError::FileAccess {
                    path: self.source_path.clone(),
                    source,
                })?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            self.writer.write_data(&buf[..n]).await?;
            summary.bytes += n as u64;

            if let Some(tx) = &self.progress {
                let _ = tx.try_send(summary.bytes);
            }
        }
        summary.md5 = hex::encode(hasher.finalize());

        for (name, value) in &self.fields {
            self.writer.write_field(name, value).await?;
        }
        self.writer.finish().await
    }
}
