/// Tokenizer layer: argument state machine, line assembly, settings.
pub mod argument;
pub mod config;
pub mod errors;
pub mod line;

pub use argument::{Boundary, Token, read_argument};
pub use config::Config;
pub use errors::TokenizeError;
pub use line::{Classified, Diagnostic, Line, Lines, Tokenizer, classify};
