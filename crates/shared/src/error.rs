use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    RemoteRejection,
    Transport,
    MalformedResponse,
}

/// Human-readable failure surfaced to the user. Every kind is recoverable by
/// re-initiating the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorDescriptor {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    /// Non-success status from the extraction service; `message` carries the
    /// response body verbatim when one was readable.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// The request never completed: connection failure, abort, timeout.
    #[error("{0}")]
    Transport(String),
    /// Success status whose body could not be parsed into a result
    /// descriptor.
    #[error("invalid extraction response: {0}")]
    MalformedResponse(String),
}

impl ExtractionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractionError::Rejected { .. } => ErrorKind::RemoteRejection,
            ExtractionError::Transport(_) => ErrorKind::Transport,
            ExtractionError::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }
}

impl From<ExtractionError> for ErrorDescriptor {
    fn from(err: ExtractionError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
