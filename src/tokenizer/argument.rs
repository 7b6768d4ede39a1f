/// Argument reader: the character-level state machine that assembles one token.
///
/// Rules, in priority order for each character read:
///
/// 1. Every character is appended to the raw line buffer and mirrored to the
///    sinks before it is interpreted.
/// 2. A character following a backslash is taken literally, whatever it is.
/// 3. `\` starts an escape (inside quotes too).
/// 4. `"` toggles quote mode and is dropped.
/// 5. Inside quotes everything else is literal, including spaces and newlines.
/// 6. Tab and carriage return are dropped.
/// 7. Space ends the token (soft boundary); newline ends it and the line (hard).
/// 8. End of stream is a hard boundary. A pending escape is dropped and an open
///    quote is closed implicitly; both are reported on the token.
use crate::stream::{CharSource, SinkRegistry};

use super::errors::TokenizeError;

/// What ended a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// An unquoted, unescaped space. The line continues.
    Space,
    /// An unquoted, unescaped newline. The line ends.
    Newline,
    /// The source is exhausted. The line ends.
    EndOfInput,
}

impl Boundary {
    /// Whether this boundary ends the line.
    #[must_use]
    pub fn is_hard(self) -> bool {
        !matches!(self, Self::Space)
    }
}

/// One token as produced by [`read_argument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Text after escape and quote interpretation. May be empty.
    pub value: String,
    /// The terminator that ended the token. Not part of `value`.
    pub boundary: Boundary,
    /// A quote toggle happened somewhere in this token.
    pub quote_mode_used: bool,
    /// End of input arrived inside quotes.
    pub open_quote: bool,
    /// End of input arrived right after a backslash; the escape was dropped.
    pub dangling_escape: bool,
}

/// Read exactly one token from `source`.
///
/// Every consumed character is pushed onto `raw` and delivered to `sinks`
/// before it is interpreted, so `raw` always holds the verbatim input.
///
/// # Errors
///
/// Returns `TokenizeError` if the source or a sink fails. Characters consumed
/// before the failure stay in `raw`, including the one a sink rejected.
pub fn read_argument<S: CharSource + ?Sized>(
    source: &mut S,
    sinks: &mut SinkRegistry,
    raw: &mut String,
) -> Result<Token, TokenizeError> {
    let mut value = String::new();
    let mut quoting = false;
    let mut escaped = false;
    let mut quote_mode_used = false;

    let boundary = loop {
        let Some(c) = source.read_char()? else {
            break Boundary::EndOfInput;
        };
        raw.push(c);
        sinks.broadcast(c)?;

        if escaped {
            value.push(c);
            escaped = false;
            continue;
        }

        match c {
            '\\' => escaped = true,
            '"' => {
                quoting = !quoting;
                quote_mode_used = true;
            }
            _ if quoting => value.push(c),
            // Tab is reserved for completion.
            '\t' | '\r' => {}
            ' ' => break Boundary::Space,
            '\n' => break Boundary::Newline,
            _ => value.push(c),
        }
    };

    Ok(Token {
        value,
        boundary,
        quote_mode_used,
        open_quote: quoting,
        dangling_escape: escaped,
    })
}
