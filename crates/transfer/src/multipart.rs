//! Incremental `multipart/form-data` writer.
//!
//! Parts are written straight into the underlying [`AsyncWrite`] as they
//! are produced, so the body never has to be held in memory.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::boundary::{generate_boundary, is_valid_boundary};
use crate::error::{PipeError, TransferError};

/// Content type declared for file parts.
const FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// Writes a multipart body part by part.
#[derive(Debug)]
pub struct MultipartWriter<W> {
    writer: W,
    boundary: String,
    has_parts: bool,
    in_file_part: bool,
    finished: bool,
}

impl<W: AsyncWrite + Unpin> MultipartWriter<W> {
    /// Creates a writer with a random boundary.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            boundary: generate_boundary(),
            has_parts: false,
            in_file_part: false,
            finished: false,
        }
    }

    /// Creates a writer with a caller-chosen boundary.
    pub fn with_boundary(writer: W, boundary: impl Into<String>) -> Result<Self, TransferError> {
        let boundary = boundary.into();
        if !is_valid_boundary(&boundary) {
            return Err(TransferError::Encoding(format!(
                "invalid boundary {boundary:?}"
            )));
        }
        Ok(Self {
            boundary,
            ..Self::new(writer)
        })
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        let needs_quotes = self
            .boundary
            .bytes()
            .any(|b| b"()<>@,;:\\\"/[]?= ".contains(&b));
        if needs_quotes {
            format!("multipart/form-data; boundary=\"{}\"", self.boundary)
        } else {
            format!("multipart/form-data; boundary={}", self.boundary)
        }
    }

    /// Starts a file part. Follow with [`write_data`](Self::write_data).
    pub async fn begin_file_part(
        &mut self,
        field: &str,
        filename: &str,
    ) -> Result<(), TransferError> {
        check_header_value("field name", field)?;
        check_header_value("filename", filename)?;
        let headers = format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {FILE_CONTENT_TYPE}\r\n\r\n",
            escape_quotes(field),
            escape_quotes(filename),
        );
        self.begin_part(&headers).await?;
        self.in_file_part = true;
        Ok(())
    }

    /// Appends raw bytes to the current file part.
    pub async fn write_data(&mut self, data: &[u8]) -> Result<(), TransferError> {
        if !self.in_file_part {
            return Err(TransferError::Encoding("no file part in progress".into()));
        }
        self.write_raw(data).await
    }

    /// Writes a complete text field part.
    pub async fn write_field(&mut self, name: &str, value: &str) -> Result<(), TransferError> {
        check_header_value("field name", name)?;
        let headers = format!(
            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
            escape_quotes(name)
        );
        self.begin_part(&headers).await?;
        self.write_raw(value.as_bytes()).await
    }

    /// Writes the closing boundary. Further parts are rejected.
    pub async fn finish(&mut self) -> Result<(), TransferError> {
        self.ensure_open()?;
        let trailer = if self.has_parts {
            format!("\r\n--{}--\r\n", self.boundary)
        } else {
            format!("--{}--\r\n", self.boundary)
        };
        self.write_raw(trailer.as_bytes()).await?;
        self.writer.flush().await.map_err(PipeError::from)?;
        self.finished = true;
        self.in_file_part = false;
        Ok(())
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    async fn begin_part(&mut self, headers: &str) -> Result<(), TransferError> {
        self.ensure_open()?;
        let delimiter = if self.has_parts {
            format!("\r\n--{}\r\n", self.boundary)
        } else {
            format!("--{}\r\n", self.boundary)
        };
        self.in_file_part = false;
        self.write_raw(delimiter.as_bytes()).await?;
        self.write_raw(headers.as_bytes()).await?;
        self.has_parts = true;
        Ok(())
    }

    async fn write_raw(&mut self, data: &[u8]) -> Result<(), TransferError> {
        self.writer
            .write_all(data)
            .await
            .map_err(|e| TransferError::Pipe(e.into()))
    }

    fn ensure_open(&self) -> Result<(), TransferError> {
        if self.finished {
            return Err(TransferError::Encoding(
                "multipart body already finished".into(),
            ));
        }
        Ok(())
    }
}

/// Header parameters cannot carry line breaks.
fn check_header_value(what: &str, value: &str) -> Result<(), TransferError> {
    if value.contains(['\r', '\n']) {
        return Err(TransferError::Encoding(format!(
            "{what} contains a line break: {value:?}"
        )));
    }
    Ok(())
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
