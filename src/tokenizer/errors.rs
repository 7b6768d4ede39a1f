/// Errors surfaced by the tokenizer.
///
/// Malformed input never produces an error; only the stream and the sinks can fail.
use thiserror::Error;

use crate::stream::{SinkError, StreamError};

/// Failures that abort reading the current line.
#[derive(Debug, Error)]
pub enum TokenizeError {
    /// The character source failed. Passed through unmodified.
    #[error(transparent)]
    Source(#[from] StreamError),

    /// An observer sink failed while mirroring input.
    #[error(transparent)]
    Sink(#[from] SinkError),
}
