use std::{convert::Infallible, path::PathBuf};

use uhsapi::UploadStatus;

/// Input rejected while constructing or mutating a value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum InvalidArgument {
    #[error("invalid header name {0:?}")]
    HeaderName(String),
    #[error("invalid value for header {name:?}: {reason}")]
    HeaderValue { name: String, reason: &'static str },
    #[error("malformed uri {0:?}")]
    Uri(String),
    #[error("unsupported uri scheme {0:?}")]
    Scheme(String),
    #[error("invalid port {0:?}, must be within 1-65535")]
    Port(String),
    #[error("invalid uri path {path:?}: {reason}")]
    Path { path: String, reason: &'static str },
    #[error("invalid uri query {0:?}: must not contain a fragment")]
    Query(String),
    #[error("invalid status code {0}, must be within 100-599")]
    StatusCode(u16),
    #[error("invalid http method {0:?}")]
    Method(String),
    #[error("invalid request target {0:?}: must not contain whitespace")]
    RequestTarget(String),
    #[error("unsupported protocol version {0:?}")]
    ProtocolVersion(String),
    #[error("invalid upload status code {0}")]
    UploadStatus(i64),
    #[error("invalid stream mode {0:?}")]
    StreamMode(String),
    #[error("invalid target path for move, must not be empty")]
    TargetPath,
}

/// Operation not allowed in the current state of the value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum IllegalState {
    #[error("no resource available, the stream was detached or closed")]
    NoResource,
    #[error("stream is not readable")]
    NotReadable,
    #[error("stream is not writable")]
    NotWritable,
    #[error("stream is not seekable")]
    NotSeekable,
    #[error("cannot access uploaded file: {0}")]
    UploadFailed(UploadStatus),
    #[error("uploaded file has already been moved")]
    AlreadyMoved,
    #[error("target directory {0:?} does not exist or is not writable")]
    TargetDirectory(PathBuf),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
    #[error(transparent)]
    IllegalState(#[from] IllegalState),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    pub fn is_illegal_state(&self) -> bool {
        matches!(self, Self::IllegalState(_))
    }

    pub fn as_invalid_argument(&self) -> Option<&InvalidArgument> {
        match self {
            Self::InvalidArgument(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_illegal_state(&self) -> Option<&IllegalState> {
        match self {
            Self::IllegalState(err) => Some(err),
            _ => None,
        }
    }
}

impl From<Infallible> for Error {
    fn from(value: Infallible) -> Self {
        match value {}
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
