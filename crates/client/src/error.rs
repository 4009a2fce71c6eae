use std::time::Duration;

use gofile_transfer::TransferError;

/// Errors from server selection and uploads.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading the file, encoding the body, or feeding the pipe failed.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status; `status` is the literal status text.
    #[error("unexpected status: {status}")]
    UnexpectedStatus { code: u16, status: String },

    /// The envelope's `status` was something other than `ok`.
    #[error("request rejected by service: {status}")]
    Rejected { status: String },

    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no upload servers available")]
    NoServersAvailable,

    #[error("upload timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid server name: {0:?}")]
    InvalidServer(String),
}

impl Error {
    /// Builds [`Error::UnexpectedStatus`] from the status line the server sent.
    pub(crate) fn from_response(resp: &reqwest::Response) -> Self {
        let reason = resp
            .extensions()
            .get::<hyper::ext::ReasonPhrase>()
            .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned());
        Self::from_status(resp.status(), reason.as_deref())
    }

    /// Falls back to the canonical reason phrase when the server's own is unknown.
    pub(crate) fn from_status(status: reqwest::StatusCode, reason: Option<&str>) -> Self {
        let code = status.as_u16();
        let status = match reason.or_else(|| status.canonical_reason()) {
            Some(reason) if !reason.is_empty() => format!("{code} {reason}"),
            _ => code.to_string(),
        };
        Error::UnexpectedStatus { code, status }
    }
}
