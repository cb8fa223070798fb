use std::io::ErrorKind;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StreamError>;

/// Errors shared by every layer of a stream pipeline.
///
/// Routine outcomes are not errors: a seek to an unreachable position
/// returns `Ok(false)` and a short transfer returns the number of bytes
/// actually moved.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Access mode violation: stream is not opened for {0}")]
    AccessMode(&'static str),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Unsupported operation: stream is not {0}")]
    Unsupported(&'static str),
    #[error("Compression error: {0}")]
    Compress(String),
    #[error("Decompression error: {0}")]
    Decompress(String),
    #[error("Buffer full: accepted {accepted} of {requested} bytes")]
    BufferFull { accepted: usize, requested: usize },
    #[error("Parsing error: {0}")]
    Parse(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StreamError {
    /// Whether the error reports an operation the stream's capability
    /// set does not include.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    /// Whether the error reports corrupt or unencodable data.
    pub fn is_codec(&self) -> bool {
        matches!(self, Self::Compress(_) | Self::Decompress(_))
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<StreamError> for std::io::Error {
    fn from(err: StreamError) -> Self {
        if let StreamError::Io(inner) = err {
            return inner;
        }
        let kind = match &err {
            StreamError::AccessMode(_) => ErrorKind::PermissionDenied,
            StreamError::InvalidArgument(_) => ErrorKind::InvalidInput,
            StreamError::Unsupported(_) => ErrorKind::Unsupported,
            StreamError::Decompress(_) | StreamError::Parse(_) => {
                ErrorKind::InvalidData
            }
            StreamError::BufferFull { .. } => ErrorKind::WouldBlock,
            StreamError::Io(_)
            | StreamError::Compress(_)
            | StreamError::Other(_) => ErrorKind::Other,
        };
        std::io::Error::new(kind, err)
    }
}
