//! In-memory byte pipe between the multipart encoder and the HTTP body.
//!
//! Built on [`tokio::io::duplex`]: writes wait once `capacity` bytes are
//! buffered and resume as the reader drains them. Dropping or closing the
//! writer makes the reader see end-of-stream after the buffer is drained;
//! dropping or closing the reader makes pending and future writes fail with
//! [`PipeError::Closed`].

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, DuplexStream, ReadBuf};
use tokio_util::io::ReaderStream;

use crate::error::PipeError;

/// Default pipe buffer: 64 KiB.
pub const DEFAULT_PIPE_CAPACITY: usize = 64 * 1024;

/// Creates a connected writer/reader pair buffering at most `capacity` bytes.
pub fn transfer_pipe(capacity: usize) -> (PipeWriter, PipeReader) {
    let (write_half, read_half) = tokio::io::duplex(capacity.max(1));
    (
        PipeWriter {
            inner: Some(write_half),
        },
        PipeReader {
            inner: Some(read_half),
        },
    )
}

/// Producer end of a [`transfer_pipe`].
#[derive(Debug)]
pub struct PipeWriter {
    inner: Option<DuplexStream>,
}

impl PipeWriter {
    /// Writes all of `buf`, waiting for the reader to make room.
    pub async fn write(&mut self, buf: &[u8]) -> Result<(), PipeError> {
        let stream = self.inner.as_mut().ok_or(PipeError::Closed)?;
        stream.write_all(buf).await?;
        Ok(())
    }

    /// Signals end-of-stream to the reader. Closing twice is a no-op.
    pub async fn close(&mut self) -> Result<(), PipeError> {
        let Some(mut stream) = self.inner.take() else {
            return Ok(());
        };
        match stream.shutdown().await {
            Ok(()) => Ok(()),
            // The reader is gone, so there is nobody left to signal.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
            Err(e) => Err(PipeError::Io(e)),
        }
    }

    /// True once [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

impl AsyncWrite for PipeWriter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.inner.as_mut() {
            Some(stream) => Pin::new(stream).poll_write(cx, buf),
            None => Poll::Ready(Err(io::ErrorKind::BrokenPipe.into())),
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.inner.as_mut() {
            Some(stream) => Pin::new(stream).poll_flush(cx),
            None => Poll::Ready(Ok(())),
        }
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.inner.as_mut() {
            Some(stream) => Pin::new(stream).poll_shutdown(cx),
            None => Poll::Ready(Ok(())),
        }
    }
}

/// Consumer end of a [`transfer_pipe`].
#[derive(Debug)]
pub struct PipeReader {
    inner: Option<DuplexStream>,
}

impl PipeReader {
    /// Hangs up. Pending writes on the other end fail; later reads return EOF.
    pub fn close(&mut self) {
        self.inner = None;
    }

    /// Wraps the reader as a stream of byte chunks, suitable for an HTTP body.
    pub fn into_stream(self) -> ReaderStream<PipeReader> {
        ReaderStream::new(self)
    }
}

impl AsyncRead for PipeReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.inner.as_mut() {
            Some(stream) => Pin::new(stream).poll_read(cx, buf),
            None => Poll::Ready(Ok(())),
        }
    }
}
