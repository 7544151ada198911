use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures raised by a codec while encoding or decoding a buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("input truncated: {0}")]
    Truncated(&'static str),

    #[error("corrupt input: {0}")]
    Corrupt(String),

    #[error("key mismatch or tampered ciphertext")]
    KeyMismatch,

    #[error("codec backend error: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum GseaError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid path {}: {reason}", path.display())]
    Path { path: PathBuf, reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Codec {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
}

impl GseaError {
    pub fn config(msg: impl Into<String>) -> Self {
        GseaError::Config(msg.into())
    }

    pub fn path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        GseaError::Path {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, GseaError>;

/// Attaches the offending path to a bare `std::io::Error`.
pub trait IoContext<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|source| GseaError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Same as [`IoContext`] for codec results.
pub trait CodecContext<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> CodecContext<T> for std::result::Result<T, CodecError> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|source| GseaError::Codec {
            path: path.to_path_buf(),
            source,
        })
    }
}
