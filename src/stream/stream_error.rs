//! Error type for binary streams.
//!
//! This module provides [StreamError], shared by every [Stream](crate::Stream)
//! implementation, and the [Result] alias used throughout the crate.

use std::collections::TryReserveError;
use std::io;
use std::io::SeekFrom;
use std::path::PathBuf;

use thiserror::Error;

/// Result type of all stream operations.
pub type Result<T> = std::result::Result<T, StreamError>;

// =#========================================================================#=
// STREAM ERROR
// =#========================================================================$=
/// Errors that can occur while constructing or driving a stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The path could not be opened for reading.
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file could not be mapped into memory.
    #[error("failed to map {}: {source}", .path.display())]
    Map {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input buffer could not be copied into the stream.
    #[error("failed to copy {expected} input bytes")]
    CopyFailed {
        expected: usize,
        #[source]
        source: TryReserveError,
    },

    /// A strict prefetch got fewer bytes than the chunk size.
    #[error("failed to prefetch {expected} bytes, file provided {actual}")]
    ShortPrefetch { expected: usize, actual: usize },

    /// A fixed-width decode found fewer bytes than it needs.
    #[error("short read at offset {offset}: expected {expected} bytes, got {actual}")]
    ShortRead {
        offset: u64,
        expected: usize,
        actual: usize,
    },

    /// Seek target lies before the start of the stream or overflows.
    #[error("invalid seek to {target:?}")]
    InvalidSeek { target: SeekFrom },

    /// The stream was already closed.
    #[error("stream already closed")]
    AlreadyClosed,

    #[error("IO error - {0}")]
    Io(#[from] io::Error),
}

impl StreamError {
    /// Returns the underlying OS error kind, if this error carries one.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            StreamError::Open { source, .. } | StreamError::Map { source, .. } => {
                Some(source.kind())
            }
            StreamError::Io(err) => Some(err.kind()),
            _ => None,
        }
    }

    /// Whether this error signals that the data ran out.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(
            self,
            StreamError::ShortRead { .. } | StreamError::ShortPrefetch { .. }
        ) || self.io_kind() == Some(io::ErrorKind::UnexpectedEof)
    }
}

// =#========================================================================#=
// TESTS
// =#========================================================================$=
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_error_keeps_os_kind() {
        let err = StreamError::Open {
            path: PathBuf::from("missing.bin"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(err.io_kind(), Some(io::ErrorKind::NotFound));
        assert!(err.to_string().starts_with("failed to open missing.bin"));
        assert!(!err.is_end_of_stream());
    }

    #[test]
    fn test_short_read_is_end_of_stream() {
        let err = StreamError::ShortRead {
            offset: 2,
            expected: 4,
            actual: 2,
        };
        assert!(err.is_end_of_stream());
        assert_eq!(err.io_kind(), None);
        assert_eq!(
            err.to_string(),
            "short read at offset 2: expected 4 bytes, got 2"
        );
    }
}
