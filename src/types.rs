/// Shared serializable output types for all commands.
///
/// These types are what gets written to stdout, either as JSON or rendered
/// as a table. They are decoupled from the library's `Line` type.
use serde::{Deserialize, Serialize};

use linecmd::Line;

use crate::errors::AppError;

/// One tokenized line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineOutput {
    /// 1-based line number within the session.
    pub line: usize,
    /// Positional arguments; `null` for absent values.
    pub args: Vec<Option<String>>,
    /// Flag names without the leading `--`.
    pub flags: Vec<String>,
    /// Raw text exactly as read, terminator included.
    pub raw: String,
    /// `false` when the line was an `exit` command.
    #[serde(rename = "continue")]
    pub should_continue: bool,
    /// The line was ended by end of input rather than a newline.
    pub end_of_input: bool,
    /// Absorbed malformed input (unterminated quote, dangling escape).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

impl LineOutput {
    /// Convert a tokenizer `Line` with its 1-based position.
    #[must_use]
    pub fn from_line(number: usize, line: Line) -> Self {
        Self {
            line: number,
            diagnostics: line.diagnostics.iter().map(ToString::to_string).collect(),
            args: line.args,
            flags: line.flags,
            raw: line.raw,
            should_continue: line.should_continue,
            end_of_input: line.end_of_input,
        }
    }
}

/// A structured error envelope for JSON error output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorOutput {
    /// Always `false`.
    pub ok: bool,
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail in the JSON error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (snake_case).
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorOutput {
    /// Construct from an `AppError`.
    #[must_use]
    pub fn from_app_error(err: &AppError) -> Self {
        Self {
            ok: false,
            error: ErrorDetail {
                code: err.code().to_owned(),
                message: err.to_string(),
            },
        }
    }
}
