//! Client error types

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, SecureFileError>;

/// Failures raised by a [`Transport`](crate::Transport) implementation
#[derive(Error, Debug)]
pub enum TransportError {
    /// HTTP client error (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Any other transport failure
    #[error("{0}")]
    Other(String),
}

/// Secure file client errors
#[derive(Error, Debug)]
pub enum SecureFileError {
    /// The transport failed before a complete response was received
    #[error("transport error while {context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: TransportError,
    },

    /// A response arrived with a status other than the operation's success code
    #[error("unexpected HTTP status {status} for {path}")]
    UnexpectedStatus { status: u16, path: String },

    /// Body or header could not be decoded into the expected structure
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Local filesystem failure
    #[error("local IO error on {}: {source}", .path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The upload body could not be built
    #[error("failed to build upload body: {0}")]
    UploadBody(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl SecureFileError {
    pub(crate) fn transport(context: impl Into<String>, source: TransportError) -> Self {
        Self::Transport {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LocalIo {
            path: path.into(),
            source,
        }
    }

    /// Check if this is a transport failure
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Check if the server answered with an unexpected status
    pub fn is_unexpected_status(&self) -> bool {
        matches!(self, Self::UnexpectedStatus { .. })
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if the response could not be decoded
    pub fn is_malformed_response(&self) -> bool {
        matches!(self, Self::MalformedResponse(_))
    }

    /// Check if this is a local filesystem failure
    pub fn is_local_io(&self) -> bool {
        matches!(self, Self::LocalIo { .. })
    }
}
