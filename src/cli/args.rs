/// CLI argument definitions via clap derive.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use linecmd::Config;

/// linecmd — tokenize command lines into arguments and flags.
#[derive(Debug, Parser)]
#[command(
    name = "linecmd",
    about = "Tokenize command lines into positional arguments and --flags",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output format. Auto-detects: table when TTY, json when piped.
    #[arg(long, global = true, value_name = "FORMAT", default_value = "auto")]
    pub output: OutputFormat,

    /// Shorthand for --output json.
    #[arg(long, global = true, conflicts_with = "output")]
    pub json: bool,

    /// Comma-separated table columns to show
    /// (line, args, flags, continue, raw, notes).
    #[arg(long, global = true, value_name = "COLS")]
    pub columns: Option<String>,

    /// Omit table headers (useful for awk/cut processing).
    #[arg(long, global = true)]
    pub no_header: bool,

    /// Verbose tokenizer logging and stage timing on stderr.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Auto-detect: table when stdout is a TTY, json when piped.
    #[default]
    Auto,
    /// JSON array or object (pretty-printed).
    Json,
    /// Compact single-line JSON.
    Compact,
    /// Newline-delimited JSON (one object per line).
    Ndjson,
    /// Aligned table with headers (human-readable).
    Table,
    /// Raw line text only, exactly as read.
    Raw,
}

/// All subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read lines interactively from stdin until `exit` or end of input.
    Repl(ReplArgs),
    /// Tokenize every line of a file (or stdin) in one go.
    Parse(ParseArgs),
}

/// Tokenizer switches shared by all subcommands.
#[derive(Debug, Args)]
pub struct TokenizerArgs {
    /// Treat `--name` tokens as ordinary arguments.
    #[arg(long)]
    pub no_flags: bool,

    /// Turn an unquoted `null` into an absent argument (JSON null).
    #[arg(long)]
    pub null_as_absent: bool,
}

impl TokenizerArgs {
    /// Build the tokenizer configuration.
    #[must_use]
    pub fn config(&self) -> Config {
        Config {
            auto_detect_flags: !self.no_flags,
            null_as_absent: self.null_as_absent,
        }
    }
}

/// Arguments for `linecmd repl`.
#[derive(Debug, Parser)]
pub struct ReplArgs {
    #[command(flatten)]
    pub tokenizer: TokenizerArgs,

    /// Mirror every input character back to stdout.
    #[arg(long)]
    pub echo: bool,

    /// Append every input character to this file.
    #[arg(long, value_name = "FILE")]
    pub transcript: Option<PathBuf>,

    /// Prompt printed before each line when stdin is a terminal.
    #[arg(long, value_name = "STR", default_value = "> ")]
    pub prompt: String,
}

/// Arguments for `linecmd parse`.
#[derive(Debug, Parser)]
pub struct ParseArgs {
    /// Input file. Reads stdin when omitted or `-`.
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    #[command(flatten)]
    pub tokenizer: TokenizerArgs,

    /// Stop at the first line whose first argument is `exit`.
    #[arg(long)]
    pub stop_at_exit: bool,
}
