//! linecmd — a line-oriented command tokenizer.
//!
//! Reads characters from a blocking [`stream::CharSource`] and produces one
//! [`Line`] per call: positional arguments, `--flags`, the raw text of the
//! line, and whether the session should continue (`exit` stops it).
//!
//! ```
//! use linecmd::{StrSource, Tokenizer};
//!
//! let mut tokenizer = Tokenizer::new(StrSource::new("copy \"my file\" dest --force\n"));
//! let line = tokenizer.read_line().unwrap();
//! assert_eq!(line.args, [
//!     Some("copy".to_owned()),
//!     Some("my file".to_owned()),
//!     Some("dest".to_owned()),
//! ]);
//! assert_eq!(line.flags, ["force"]);
//! assert!(line.should_continue);
//! ```

pub mod stream;
pub mod tokenizer;

pub use stream::{
    CharSink, CharSource, SharedBuffer, SinkError, SinkId, SinkRegistry, StrSource, StreamError,
    Utf8Source, WriterSink,
};
pub use tokenizer::{Config, Diagnostic, Line, TokenizeError, Tokenizer};
