/// Line reader: turns a stream of tokens into one `Line` per call.
use std::fmt;
use std::io::StdinLock;

use tracing::{debug, trace, warn};

use crate::stream::{CharSource, SinkRegistry, Utf8Source};

use super::argument::{Boundary, Token, read_argument};
use super::config::Config;
use super::errors::TokenizeError;

/// First-argument value that asks the session to stop.
pub const EXIT_SENTINEL: &str = "exit";

/// Literal that becomes an absent argument when [`Config::null_as_absent`] is set.
pub const NULL_LITERAL: &str = "null";

/// Marker that identifies a flag token.
pub const FLAG_MARKER: &str = "--";

/// Malformed input that was absorbed rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// End of input arrived inside quotes; the token was closed implicitly.
    UnterminatedQuote {
        /// Zero-based position of the token within the line.
        token: usize,
    },
    /// End of input arrived right after a backslash; the escape was dropped.
    DanglingEscape {
        /// Zero-based position of the token within the line.
        token: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedQuote { token } => {
                write!(f, "unterminated quote in token {token}")
            }
            Self::DanglingEscape { token } => {
                write!(f, "dangling escape at end of token {token}")
            }
        }
    }
}

/// The result of reading one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Positional arguments in order. `None` is an absent value.
    pub args: Vec<Option<String>>,
    /// Flag names in order, without the leading `--`.
    pub flags: Vec<String>,
    /// Every character consumed for this line, terminator included.
    pub raw: String,
    /// `false` when the first argument is `exit` (any case).
    pub should_continue: bool,
    /// The line was ended by the source running dry rather than a newline.
    pub end_of_input: bool,
    /// Absorbed malformed input, in the order encountered.
    pub diagnostics: Vec<Diagnostic>,
}

/// Where a token goes once its line context is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// Absent positional value.
    Absent,
    /// Flag name, marker stripped.
    Flag(String),
    /// Positional argument, verbatim.
    Positional(String),
}

/// Decide whether a token is an absent value, a flag, or a positional argument.
///
/// Quoted tokens are always positional.
#[must_use]
pub fn classify(token: Token, config: &Config) -> Classified {
    if token.quote_mode_used {
        return Classified::Positional(token.value);
    }
    if config.null_as_absent && token.value.eq_ignore_ascii_case(NULL_LITERAL) {
        return Classified::Absent;
    }
    if config.auto_detect_flags {
        if let Some(name) = token.value.strip_prefix(FLAG_MARKER) {
            if !name.is_empty() {
                return Classified::Flag(name.to_owned());
            }
        }
    }
    Classified::Positional(token.value)
}

/// Whether the first positional argument asks the session to stop.
///
/// Quoting does not matter here; an absent first argument never stops.
#[must_use]
pub fn is_exit(first: Option<&Option<String>>) -> bool {
    matches!(first, Some(Some(arg)) if arg.eq_ignore_ascii_case(EXIT_SENTINEL))
}

/// Reads command lines from a [`CharSource`].
///
/// The tokenizer exclusively owns its source, configuration, sinks and the raw
/// buffer of the last line; none of them are shared with other threads.
#[derive(Debug)]
pub struct Tokenizer<S> {
    source: S,
    config: Config,
    sinks: SinkRegistry,
    raw: String,
}

impl Tokenizer<Utf8Source<StdinLock<'static>>> {
    /// Tokenizer over the process's standard input, holding its lock.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(Utf8Source::new(std::io::stdin().lock()))
    }
}

impl<S: CharSource> Tokenizer<S> {
    /// Tokenizer with the default [`Config`] and no sinks.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_config(source, Config::default())
    }

    #[must_use]
    pub fn with_config(source: S, config: Config) -> Self {
        Self {
            source,
            config,
            sinks: SinkRegistry::new(),
            raw: String::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Settings may be changed between lines.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    #[must_use]
    pub fn sinks(&self) -> &SinkRegistry {
        &self.sinks
    }

    pub fn sinks_mut(&mut self) -> &mut SinkRegistry {
        &mut self.sinks
    }

    /// Raw text of the most recent line, exactly as consumed.
    #[must_use]
    pub fn last_raw(&self) -> &str {
        &self.raw
    }

    /// Give back the source.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Read one line: tokens up to and including the next hard boundary.
    ///
    /// At end of input this keeps returning a line holding a single empty
    /// argument with `end_of_input` set and an empty `raw`.
    ///
    /// # Errors
    ///
    /// Returns `TokenizeError` if the source or a sink fails. The raw buffer
    /// keeps whatever was consumed before the failure.
    pub fn read_line(&mut self) -> Result<Line, TokenizeError> {
        self.raw.clear();

        let mut args = Vec::new();
        let mut flags = Vec::new();
        let mut diagnostics = Vec::new();

        let mut index = 0;
        let boundary = loop {
            let token = read_argument(&mut self.source, &mut self.sinks, &mut self.raw)?;
            trace!(
                index,
                value = %token.value,
                quoted = token.quote_mode_used,
                boundary = ?token.boundary,
                "token"
            );

            if token.open_quote {
                warn!(token = index, "unterminated quote at end of input");
                diagnostics.push(Diagnostic::UnterminatedQuote { token: index });
            }
            if token.dangling_escape {
                warn!(token = index, "dangling escape at end of input");
                diagnostics.push(Diagnostic::DanglingEscape { token: index });
            }

            let boundary = token.boundary;
            match classify(token, &self.config) {
                Classified::Absent => args.push(None),
                Classified::Flag(name) => flags.push(name),
                Classified::Positional(value) => args.push(Some(value)),
            }

            if boundary.is_hard() {
                break boundary;
            }
            index += 1;
        };

        self.sinks.flush_all()?;

        let should_continue = !is_exit(args.first());
        debug!(
            args = args.len(),
            flags = flags.len(),
            should_continue,
            raw_len = self.raw.len(),
            "line read"
        );

        Ok(Line {
            args,
            flags,
            raw: self.raw.clone(),
            should_continue,
            end_of_input: boundary == Boundary::EndOfInput,
            diagnostics,
        })
    }

    /// Iterate over lines until the source is exhausted.
    ///
    /// The empty line produced by an already-exhausted source is not yielded.
    /// Stopping on `exit` is left to the caller via [`Line::should_continue`].
    pub fn lines(&mut self) -> Lines<'_, S> {
        Lines {
            tokenizer: self,
            done: false,
        }
    }
}

/// Iterator returned by [`Tokenizer::lines`].
pub struct Lines<'a, S> {
    tokenizer: &'a mut Tokenizer<S>,
    done: bool,
}

impl<S: CharSource> Iterator for Lines<'_, S> {
    type Item = Result<Line, TokenizeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.tokenizer.read_line() {
            Ok(line) if line.end_of_input => {
                self.done = true;
                (!line.raw.is_empty()).then_some(Ok(line))
            }
            Ok(line) => Some(Ok(line)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{CharSink, SharedBuffer, StrSource, StreamError, Utf8Source};

    fn read(input: &str) -> Line {
        Tokenizer::new(StrSource::new(input)).read_line().unwrap()
    }

    fn read_with(input: &str, config: Config) -> Line {
        Tokenizer::with_config(StrSource::new(input), config)
            .read_line()
            .unwrap()
    }

    fn some(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some((*v).to_owned())).collect()
    }

    const NULLS: Config = Config {
        auto_detect_flags: true,
        null_as_absent: true,
    };

    #[test]
    fn test_simple_line() {
        let line = read("a b c\n");
        assert_eq!(line.args, some(&["a", "b", "c"]));
        assert!(line.flags.is_empty());
        assert!(line.should_continue);
        assert!(!line.end_of_input);
    }

    #[test]
    fn test_flag_detection() {
        let line = read("--verbose x\n");
        assert_eq!(line.args, some(&["x"]));
        assert_eq!(line.flags, ["verbose"]);
    }

    #[test]
    fn test_flags_keep_order_and_interleave() {
        let line = read("run --fast a --dry-run b\n");
        assert_eq!(line.args, some(&["run", "a", "b"]));
        assert_eq!(line.flags, ["fast", "dry-run"]);
    }

    #[test]
    fn test_quoted_flag_is_positional() {
        let line = read("\"--verbose\"\n");
        assert_eq!(line.args, some(&["--verbose"]));
        assert!(line.flags.is_empty());
    }

    #[test]
    fn test_bare_marker_is_positional() {
        let line = read("-- -x\n");
        assert_eq!(line.args, some(&["--", "-x"]));
        assert!(line.flags.is_empty());
    }

    #[test]
    fn test_escaped_marker_is_still_a_flag() {
        // Escaping does not count as quoting.
        let line = read("\\--name\n");
        assert_eq!(line.flags, ["name"]);
    }

    #[test]
    fn test_flag_detection_disabled() {
        let config = Config {
            auto_detect_flags: false,
            null_as_absent: false,
        };
        let line = read_with("--verbose x\n", config);
        assert_eq!(line.args, some(&["--verbose", "x"]));
        assert!(line.flags.is_empty());
    }

    #[test]
    fn test_exit_stops() {
        assert!(!read("exit\n").should_continue);
        assert!(!read("EXIT\n").should_continue);
        assert!(!read("Exit now\n").should_continue);
    }

    #[test]
    fn test_quoted_exit_still_stops() {
        let line = read("\"exit\"\n");
        assert_eq!(line.args, some(&["exit"]));
        assert!(!line.should_continue);
    }

    #[test]
    fn test_exit_must_be_first() {
        assert!(read("say exit\n").should_continue);
        assert!(read("exits\n").should_continue);
    }

    #[test]
    fn test_exit_after_leading_flag() {
        // Flags are not positional; `exit` is still the first argument.
        assert!(!read("--force exit\n").should_continue);
    }

    #[test]
    fn test_null_as_absent() {
        let line = read_with("null\n", NULLS);
        assert_eq!(line.args, vec![None::<String>]);
        let line = read_with("a NuLl b\n", NULLS);
        assert_eq!(line.args, vec![Some("a".to_owned()), None, Some("b".to_owned())]);
    }

    #[test]
    fn test_quoted_null_is_literal() {
        let line = read_with("\"null\"\n", NULLS);
        assert_eq!(line.args, some(&["null"]));
    }

    #[test]
    fn test_null_literal_when_disabled() {
        assert_eq!(read("null\n").args, some(&["null"]));
    }

    #[test]
    fn test_absent_first_argument_continues() {
        let line = read_with("null exit\n", NULLS);
        assert_eq!(line.args, vec![None, Some("exit".to_owned())]);
        assert!(line.should_continue);
    }

    #[test]
    fn test_flag_named_null() {
        let line = read_with("--null\n", NULLS);
        assert_eq!(line.flags, ["null"]);
        assert!(line.args.is_empty());
    }

    #[test]
    fn test_escaped_space() {
        assert_eq!(read("a\\ b\n").args, some(&["a b"]));
    }

    #[test]
    fn test_empty_line_is_one_empty_arg() {
        let line = read("\n");
        assert_eq!(line.args, some(&[""]));
        assert!(line.flags.is_empty());
        assert!(line.should_continue);
    }

    #[test]
    fn test_flag_only_line_has_no_args() {
        let line = read("--help\n");
        assert!(line.args.is_empty());
        assert!(line.should_continue);
    }

    #[test]
    fn test_trailing_space_adds_empty_arg() {
        assert_eq!(read("a \n").args, some(&["a", ""]));
    }

    #[test]
    fn test_crlf_line_ending() {
        let line = read("a b\r\n");
        assert_eq!(line.args, some(&["a", "b"]));
        assert_eq!(line.raw, "a b\r\n");
    }

    #[test]
    fn test_raw_text_side_channel() {
        let input = "cp \"my file\" b\\ c --force\n";
        let mut tokenizer = Tokenizer::new(StrSource::new(input));
        let line = tokenizer.read_line().unwrap();
        assert_eq!(tokenizer.last_raw(), input);
        assert_eq!(line.raw, input);
        assert_eq!(line.args, some(&["cp", "my file", "b c"]));
    }

    #[test]
    fn test_raw_resets_per_line() {
        let mut tokenizer = Tokenizer::new(StrSource::new("first line\nsecond\n"));
        tokenizer.read_line().unwrap();
        assert_eq!(tokenizer.last_raw(), "first line\n");
        let line = tokenizer.read_line().unwrap();
        assert_eq!(tokenizer.last_raw(), "second\n");
        assert_eq!(line.args, some(&["second"]));
    }

    #[test]
    fn test_quoted_newline_spans_physical_lines() {
        let mut tokenizer = Tokenizer::new(StrSource::new("echo \"a\nb\"\nnext\n"));
        let line = tokenizer.read_line().unwrap();
        assert_eq!(line.args, some(&["echo", "a\nb"]));
        assert_eq!(tokenizer.read_line().unwrap().args, some(&["next"]));
    }

    #[test]
    fn test_end_of_input_without_newline() {
        let mut tokenizer = Tokenizer::new(StrSource::new("last"));
        let line = tokenizer.read_line().unwrap();
        assert_eq!(line.args, some(&["last"]));
        assert!(line.end_of_input);

        let line = tokenizer.read_line().unwrap();
        assert_eq!(line.args, some(&[""]));
        assert!(line.end_of_input);
        assert!(line.raw.is_empty());
    }

    #[test]
    fn test_diagnostics_for_malformed_tail() {
        let line = read("say \"unfinished");
        assert_eq!(line.args, some(&["say", "unfinished"]));
        assert_eq!(line.diagnostics, [Diagnostic::UnterminatedQuote { token: 1 }]);

        let line = read("path\\");
        assert_eq!(line.args, some(&["path"]));
        assert_eq!(line.diagnostics, [Diagnostic::DanglingEscape { token: 0 }]);
    }

    #[test]
    fn test_sinks_mirror_and_do_not_change_output() {
        let input = "x \"y\" --z\n";
        let plain = read(input);

        let echo = SharedBuffer::new();
        let transcript = SharedBuffer::new();
        let mut tokenizer = Tokenizer::new(StrSource::new(input));
        tokenizer.sinks_mut().add(echo.clone());
        tokenizer.sinks_mut().add(transcript.clone());
        let mirrored = tokenizer.read_line().unwrap();

        assert_eq!(plain, mirrored);
        assert_eq!(echo.contents(), input);
        assert_eq!(transcript.contents(), input);
    }

    #[test]
    fn test_sink_removed_between_lines() {
        let echo = SharedBuffer::new();
        let mut tokenizer = Tokenizer::new(StrSource::new("one\ntwo\n"));
        let id = tokenizer.sinks_mut().add(echo.clone());
        tokenizer.read_line().unwrap();
        assert!(tokenizer.sinks_mut().remove(id).is_some());
        tokenizer.read_line().unwrap();
        assert_eq!(echo.contents(), "one\n");
    }

    #[test]
    fn test_config_changes_between_lines() {
        let mut tokenizer = Tokenizer::new(StrSource::new("--a\n--a\n"));
        assert_eq!(tokenizer.read_line().unwrap().flags, ["a"]);
        tokenizer.config_mut().auto_detect_flags = false;
        assert_eq!(tokenizer.read_line().unwrap().args, some(&["--a"]));
    }

    #[test]
    fn test_sink_failure_keeps_consumed_raw() {
        struct Broken;
        impl CharSink for Broken {
            fn write_char(&mut self, _c: char) -> std::io::Result<()> {
                Err(std::io::Error::other("disk full"))
            }
        }

        let mut tokenizer = Tokenizer::new(StrSource::new("ab\n"));
        let id = tokenizer.sinks_mut().add(Broken);
        assert!(matches!(tokenizer.read_line(), Err(TokenizeError::Sink(_))));
        assert_eq!(tokenizer.last_raw(), "a");

        assert!(tokenizer.sinks_mut().remove(id).is_some());
        let rest = tokenizer.read_line().unwrap();
        assert_eq!(rest.raw, "b\n");
    }

    #[test]
    fn test_source_failure_surfaces() {
        struct Failing;
        impl CharSource for Failing {
            fn read_char(&mut self) -> Result<Option<char>, StreamError> {
                Err(StreamError::Io(std::io::Error::other("gone")))
            }
        }

        let mut tokenizer = Tokenizer::new(Failing);
        assert!(matches!(
            tokenizer.read_line(),
            Err(TokenizeError::Source(StreamError::Io(_)))
        ));
    }

    #[test]
    fn test_invalid_utf8_does_not_eat_separator() {
        let mut tokenizer = Tokenizer::new(Utf8Source::new(&b"x\xc3 y\n"[..]));
        assert!(matches!(
            tokenizer.read_line(),
            Err(TokenizeError::Source(StreamError::InvalidUtf8 { .. }))
        ));
        assert_eq!(tokenizer.last_raw(), "x");

        let rest = tokenizer.read_line().unwrap();
        assert_eq!(rest.args, some(&["", "y"]));
        assert_eq!(rest.raw, " y\n");
    }

    #[test]
    fn test_stdin_tokenizer_defaults() {
        let tokenizer = Tokenizer::stdin();
        assert_eq!(tokenizer.config(), &Config::default());
        assert!(tokenizer.sinks().is_empty());
        assert_eq!(tokenizer.last_raw(), "");
    }

    #[test]
    fn test_lines_iterator() {
        let mut tokenizer = Tokenizer::new(StrSource::new("a\nexit\nb"));
        let lines: Vec<Line> = tokenizer.lines().collect::<Result<_, _>>().unwrap();
        assert_eq!(lines.len(), 3);
        assert!(!lines[1].should_continue);
        assert_eq!(lines[2].args, some(&["b"]));
        assert!(lines[2].end_of_input);
    }

    #[test]
    fn test_lines_iterator_skips_empty_tail() {
        let mut tokenizer = Tokenizer::new(StrSource::new("a\n"));
        assert_eq!(tokenizer.lines().count(), 1);

        let mut empty = Tokenizer::new(StrSource::new(""));
        assert_eq!(empty.lines().count(), 0);
    }

    #[test]
    fn test_classify_table() {
        let token = |value: &str, quoted: bool| Token {
            value: value.to_owned(),
            boundary: Boundary::Newline,
            quote_mode_used: quoted,
            open_quote: false,
            dangling_escape: false,
        };
        let config = Config::default();
        assert_eq!(classify(token("--x", false), &config), Classified::Flag("x".into()));
        assert_eq!(
            classify(token("--x", true), &config),
            Classified::Positional("--x".into())
        );
        assert_eq!(
            classify(token("null", false), &config),
            Classified::Positional("null".into())
        );
        assert_eq!(classify(token("NULL", false), &NULLS), Classified::Absent);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn plain_word_is_single_positional(word in "[A-Za-z0-9_.,:/=+-]{1,24}") {
                prop_assume!(!word.starts_with("--") || word.len() <= 2);
                let line = read(&format!("{word}\n"));
                prop_assert_eq!(line.args, vec![Some(word.clone())]);
                prop_assert!(line.flags.is_empty());
            }

            #[test]
            fn raw_reproduces_consumed_input(
                words in proptest::collection::vec("[a-z\" \\\\-]{0,8}", 1..6)
            ) {
                let input = format!("{}\n", words.join(" "));
                let mut tokenizer = Tokenizer::new(StrSource::new(&input));
                let line = tokenizer.read_line().unwrap();
                prop_assert_eq!(&line.raw, &input);
                prop_assert_eq!(tokenizer.last_raw(), line.raw.as_str());
            }
        }
    }
}
