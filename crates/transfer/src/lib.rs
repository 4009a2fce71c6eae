//! Streaming multipart upload pipeline.
//!
//! A [`StreamEncoder`] task reads a [`FileSource`] and writes a
//! `multipart/form-data` body into the write end of a [`transfer_pipe`],
//! while the HTTP layer drains the read end as the request body. Neither
//! side ever holds the whole file in memory.

mod boundary;
mod encoder;
mod error;
mod multipart;
mod pipe;
mod source;

pub use boundary::{generate_boundary, is_valid_boundary};
pub use encoder::{EncodeSummary, FILE_FIELD, StreamEncoder};
pub use error::{FirstError, PipeError, TransferError};
pub use multipart::MultipartWriter;
pub use pipe::{DEFAULT_PIPE_CAPACITY, PipeReader, PipeWriter, transfer_pipe};
pub use source::{FileSource, base_name};
