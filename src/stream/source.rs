/// Character sources: where the tokenizer pulls its input from.
use std::io::{BufRead, ErrorKind};

use super::errors::StreamError;

/// A blocking source of characters.
///
/// `Ok(None)` signals end of stream. Once a source has reported end of stream,
/// every later call is expected to report it again.
pub trait CharSource {
    /// Read the next character, blocking until one is available.
    ///
    /// # Errors
    ///
    /// Returns `StreamError` if the underlying stream fails.
    fn read_char(&mut self) -> Result<Option<char>, StreamError>;
}

impl<S: CharSource + ?Sized> CharSource for &mut S {
    fn read_char(&mut self) -> Result<Option<char>, StreamError> {
        (**self).read_char()
    }
}

impl<S: CharSource + ?Sized> CharSource for Box<S> {
    fn read_char(&mut self) -> Result<Option<char>, StreamError> {
        (**self).read_char()
    }
}

/// Decodes UTF-8 characters from any buffered byte reader (stdin, files, sockets).
pub struct Utf8Source<R> {
    inner: R,
}

impl<R: BufRead> Utf8Source<R> {
    /// Wrap a buffered reader.
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Unwrap the underlying reader.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Look at the next byte without consuming it.
    fn peek_byte(&mut self) -> Result<Option<u8>, StreamError> {
        loop {
            match self.inner.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>, StreamError> {
        let byte = self.peek_byte()?;
        if byte.is_some() {
            self.inner.consume(1);
        }
        Ok(byte)
    }
}

/// Encoded length of a UTF-8 sequence, from its lead byte.
fn sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7f => Some(1),
        0xc2..=0xdf => Some(2),
        0xe0..=0xef => Some(3),
        0xf0..=0xf4 => Some(4),
        _ => None,
    }
}

impl<R: BufRead> CharSource for Utf8Source<R> {
    fn read_char(&mut self) -> Result<Option<char>, StreamError> {
        let Some(lead) = self.next_byte()? else {
            return Ok(None);
        };
        if lead.is_ascii() {
            return Ok(Some(char::from(lead)));
        }

        let len = sequence_len(lead).ok_or(StreamError::InvalidUtf8 { bytes: vec![lead] })?;
        let mut bytes = [lead, 0, 0, 0];
        for i in 1..len {
            // A byte that cannot continue the sequence stays in the stream.
            match self.peek_byte()? {
                Some(b @ 0x80..=0xbf) => {
                    self.inner.consume(1);
                    bytes[i] = b;
                }
                _ => {
                    return Err(StreamError::InvalidUtf8 {
                        bytes: bytes[..i].to_vec(),
                    });
                }
            }
        }

        std::str::from_utf8(&bytes[..len])
            .ok()
            .and_then(|s| s.chars().next())
            .map(Some)
            .ok_or_else(|| StreamError::InvalidUtf8 {
                bytes: bytes[..len].to_vec(),
            })
    }
}

/// An in-memory source over a string slice.
pub struct StrSource<'a> {
    chars: std::str::Chars<'a>,
}

impl<'a> StrSource<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars(),
        }
    }
}

impl CharSource for StrSource<'_> {
    fn read_char(&mut self) -> Result<Option<char>, StreamError> {
        Ok(self.chars.next())
    }
}
