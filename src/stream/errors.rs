/// Errors from the character stream layer.
use thiserror::Error;

/// Typed errors raised while pulling characters from a source.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The underlying reader failed.
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    /// The byte source produced a sequence that does not decode as UTF-8.
    #[error("invalid UTF-8 sequence {}", hex(bytes))]
    InvalidUtf8 {
        /// The offending bytes, lead byte first.
        bytes: Vec<u8>,
    },
}

/// An observer sink failed while mirroring input.
#[derive(Debug, Error)]
#[error("sink {id} failed: {source}")]
pub struct SinkError {
    /// Registry handle of the failing sink.
    pub id: super::sink::SinkId,
    /// The write or flush failure.
    #[source]
    pub source: std::io::Error,
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:#04x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
