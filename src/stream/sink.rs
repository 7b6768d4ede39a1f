/// Observer sinks that mirror every consumed character (echo, transcripts, logging).
use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use super::errors::SinkError;

/// A write-only character observer.
pub trait CharSink {
    /// Receive one raw input character.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the character could not be written.
    fn write_char(&mut self, c: char) -> std::io::Result<()>;

    /// Push buffered output through. Called once after every completed line.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if flushing failed.
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Adapts any `std::io::Write` (stdout, a file, a socket) into a [`CharSink`].
pub struct WriterSink<W> {
    inner: W,
}

impl<W: Write> WriterSink<W> {
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> CharSink for WriterSink<W> {
    fn write_char(&mut self, c: char) -> std::io::Result<()> {
        let mut buf = [0u8; 4];
        self.inner.write_all(c.encode_utf8(&mut buf).as_bytes())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// In-memory sink whose contents stay readable after it has been registered.
///
/// Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    buf: Rc<RefCell<String>>,
}

impl SharedBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far.
    #[must_use]
    pub fn contents(&self) -> String {
        self.buf.borrow().clone()
    }

    /// Take everything written so far, leaving the buffer empty.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.buf.borrow_mut())
    }
}

impl CharSink for SharedBuffer {
    fn write_char(&mut self, c: char) -> std::io::Result<()> {
        self.buf.borrow_mut().push(c);
        Ok(())
    }
}

/// Handle returned by [`SinkRegistry::add`], used to remove the sink later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkId(u64);

impl fmt::Display for SinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered set of sinks. Characters are delivered in registration order.
#[derive(Default)]
pub struct SinkRegistry {
    sinks: Vec<(SinkId, Box<dyn CharSink>)>,
    next_id: u64,
}

impl SinkRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink at the end of the delivery order.
    pub fn add<S: CharSink + 'static>(&mut self, sink: S) -> SinkId {
        let id = SinkId(self.next_id);
        self.next_id += 1;
        self.sinks.push((id, Box::new(sink)));
        id
    }

    /// Unregister a sink, handing it back. `None` if the id is unknown.
    pub fn remove(&mut self, id: SinkId) -> Option<Box<dyn CharSink>> {
        let idx = self.sinks.iter().position(|(sid, _)| *sid == id)?;
        Some(self.sinks.remove(idx).1)
    }

    /// Drop every registered sink.
    pub fn clear(&mut self) {
        self.sinks.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Deliver one character to every sink, stopping at the first failure.
    pub(crate) fn broadcast(&mut self, c: char) -> Result<(), SinkError> {
        for (id, sink) in &mut self.sinks {
            sink.write_char(c)
                .map_err(|source| SinkError { id: *id, source })?;
        }
        Ok(())
    }

    pub(crate) fn flush_all(&mut self) -> Result<(), SinkError> {
        for (id, sink) in &mut self.sinks {
            sink.flush().map_err(|source| SinkError { id: *id, source })?;
        }
        Ok(())
    }
}

impl fmt::Debug for SinkRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkRegistry")
            .field("ids", &self.sinks.iter().map(|(id, _)| *id).collect::<Vec<_>>())
            .finish()
    }
}
