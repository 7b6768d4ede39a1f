/// Errors from the command layer.
use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;

use linecmd::{StreamError, TokenizeError};

/// Everything that can abort a `linecmd` run.
#[derive(Debug, Error)]
pub enum AppError {
    /// The input or transcript file could not be opened.
    #[error("Cannot open '{}': {source}", path.display())]
    Open {
        /// The path as given on the command line.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading or mirroring input failed.
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
}

impl AppError {
    /// Return the CLI exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Open { source, .. } if source.kind() == ErrorKind::NotFound => 4,
            Self::Tokenize(TokenizeError::Source(StreamError::InvalidUtf8 { .. })) => 2,
            Self::Open { .. } | Self::Tokenize(_) => 1,
        }
    }

    /// Machine-readable error code for the JSON envelope.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Open { source, .. } if source.kind() == ErrorKind::NotFound => "file_not_found",
            Self::Open { .. } => "open_failed",
            Self::Tokenize(TokenizeError::Source(StreamError::InvalidUtf8 { .. })) => {
                "invalid_utf8"
            }
            Self::Tokenize(TokenizeError::Source(StreamError::Io(_))) => "read_failed",
            Self::Tokenize(TokenizeError::Sink(_)) => "sink_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_maps_to_4() {
        let err = AppError::Open {
            path: PathBuf::from("nope.txt"),
            source: std::io::Error::from(ErrorKind::NotFound),
        };
        assert_eq!(err.exit_code(), 4);
        assert_eq!(err.code(), "file_not_found");
        assert!(err.to_string().starts_with("Cannot open 'nope.txt'"));
    }

    #[test]
    fn test_invalid_utf8_maps_to_2() {
        let err = AppError::from(TokenizeError::Source(StreamError::InvalidUtf8 {
            bytes: vec![0xff],
        }));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.code(), "invalid_utf8");
    }

    #[test]
    fn test_read_failure_maps_to_1() {
        let err = AppError::from(TokenizeError::Source(StreamError::Io(
            std::io::Error::other("boom"),
        )));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.code(), "read_failed");
    }
}
