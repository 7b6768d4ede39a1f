/// Stream layer: character sources, observer sinks, and their errors.
pub mod errors;
pub mod sink;
pub mod source;

pub use errors::{SinkError, StreamError};
pub use sink::{CharSink, SharedBuffer, SinkId, SinkRegistry, WriterSink};
pub use source::{CharSource, StrSource, Utf8Source};
