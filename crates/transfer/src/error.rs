use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::warn;

/// Failures on the internal byte pipe.
#[derive(Debug, thiserror::Error)]
pub enum PipeError {
    /// The reading side went away (request dropped or attempt cancelled).
    #[error("pipe closed by the consumer")]
    Closed,

    #[error("pipe I/O error: {0}")]
    Io(std::io::Error),
}

impl From<std::io::Error> for PipeError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::BrokenPipe => PipeError::Closed,
            _ => PipeError::Io(err),
        }
    }
}

/// Errors produced while turning a local file into a request body.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("cannot read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error(transparent)]
    Pipe(#[from] PipeError),
}

impl TransferError {
    /// Underlying I/O error kind for file access failures.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            TransferError::FileAccess { source, .. } => Some(source.kind()),
            TransferError::Pipe(PipeError::Io(e)) => Some(e.kind()),
            _ => None,
        }
    }

    /// True when the error only reflects the consumer hanging up.
    pub fn is_consumer_hangup(&self) -> bool {
        matches!(self, TransferError::Pipe(PipeError::Closed))
    }
}

/// Single-assignment error slot shared between the encoder task and the
/// caller awaiting the request.
///
/// Only the first recorded error is kept; later ones are logged and dropped.
#[derive(Debug, Clone, Default)]
pub struct FirstError {
    slot: Arc<Mutex<Option<TransferError>>>,
}

impl FirstError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `err` if nothing was recorded yet. Returns true if it was kept.
    pub fn record(&self, err: TransferError) -> bool {
        let mut slot = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if slot.is_some() {
            warn!(error = %err, "suppressing secondary transfer error");
            return false;
        }
        *slot = Some(err);
        true
    }

    /// Returns true if an error has been recorded.
    pub fn is_set(&self) -> bool {
        match self.slot.lock() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }

    /// Removes and returns the recorded error.
    pub fn take(&self) -> Option<TransferError> {
        match self.slot.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}
