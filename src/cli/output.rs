/// Output formatting: JSON, table, raw modes. TTY detection.
use std::io::{IsTerminal, Write};

use comfy_table::{Cell, Table, presets::UTF8_BORDERS_ONLY};
use serde::Serialize;

use super::args::{Cli, OutputFormat};
use crate::types::{ErrorOutput, LineOutput};

/// Table columns accepted by `--columns`, in display order.
pub const LINE_COLUMNS: &[&str] = &["line", "args", "flags", "continue", "raw", "notes"];

/// Resolve the effective output format, handling `--json` flag and TTY auto-detection.
#[must_use]
pub fn resolve_format(fmt: OutputFormat, json_flag: bool) -> OutputFormat {
    if json_flag {
        return OutputFormat::Json;
    }
    if fmt == OutputFormat::Auto {
        if std::io::stdout().is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    } else {
        fmt
    }
}

/// How line results are rendered.
pub struct OutputCtx {
    pub format: OutputFormat,
    /// Table columns to show, in `LINE_COLUMNS` order. Every column when unset.
    pub columns: Vec<&'static str>,
    pub no_header: bool,
    /// When true, report stage timings through the debug log.
    pub debug: bool,
}

impl OutputCtx {
    /// Build from the parsed command line.
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        Self::new(
            resolve_format(cli.output, cli.json),
            cli.columns.as_deref(),
            cli.no_header,
            cli.debug,
        )
    }

    /// `columns` is a comma-separated selection; unknown names are logged and skipped.
    #[must_use]
    pub fn new(format: OutputFormat, columns: Option<&str>, no_header: bool, debug: bool) -> Self {
        Self {
            format,
            columns: select_columns(columns),
            no_header,
            debug,
        }
    }

    /// Start a named debug timer. Logs elapsed time on drop only when `--debug` is set.
    #[must_use]
    pub fn timer(&self, label: &'static str) -> DebugTimer {
        DebugTimer::new(label, self.debug)
    }
}

fn select_columns(selection: Option<&str>) -> Vec<&'static str> {
    let Some(selection) = selection else {
        return LINE_COLUMNS.to_vec();
    };
    let wanted: Vec<&str> = selection.split(',').map(str::trim).collect();
    for name in wanted.iter().filter(|w| !LINE_COLUMNS.contains(*w)) {
        tracing::warn!(column = *name, "unknown table column ignored");
    }
    LINE_COLUMNS
        .iter()
        .copied()
        .filter(|column| wanted.contains(column))
        .collect()
}

// --- Line output ---

/// Write all lines of a session to stdout.
pub fn write_lines(lines: &[LineOutput], ctx: &OutputCtx) {
    match ctx.format {
        OutputFormat::Json => print_json(lines),
        OutputFormat::Compact => print_compact_json(lines),
        OutputFormat::Ndjson => print_ndjson(lines),
        OutputFormat::Raw => {
            for line in lines {
                print_raw(line);
            }
        }
        OutputFormat::Table | OutputFormat::Auto => write_lines_table(lines, ctx),
    }
}

/// Write a single line as soon as it has been read (interactive sessions).
pub fn write_line(line: &LineOutput, ctx: &OutputCtx) {
    match ctx.format {
        OutputFormat::Json => print_json(line),
        OutputFormat::Compact | OutputFormat::Ndjson => print_compact_json(line),
        OutputFormat::Raw => print_raw(line),
        OutputFormat::Table | OutputFormat::Auto => {
            write_lines_table(std::slice::from_ref(line), ctx);
        }
    }
}

fn print_raw(line: &LineOutput) {
    if line.raw.ends_with('\n') {
        print!("{}", line.raw);
    } else {
        println!("{}", line.raw);
    }
}

fn write_lines_table(lines: &[LineOutput], ctx: &OutputCtx) {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);

    if !ctx.no_header {
        table.set_header(ctx.columns.iter().map(|c| Cell::new(c.to_uppercase())));
    }

    for line in lines {
        let row: Vec<Cell> = ctx
            .columns
            .iter()
            .map(|column| Cell::new(line_cell(line, column)))
            .collect();
        table.add_row(row);
    }

    println!("{table}");
}

fn line_cell(line: &LineOutput, column: &str) -> String {
    match column {
        "line" => line.line.to_string(),
        "args" => line
            .args
            .iter()
            .map(|a| format_arg(a.as_deref()))
            .collect::<Vec<_>>()
            .join(" "),
        "flags" => line
            .flags
            .iter()
            .map(|f| format!("--{f}"))
            .collect::<Vec<_>>()
            .join(" "),
        "continue" => (if line.should_continue { "yes" } else { "no" }).to_owned(),
        "raw" => format!("{:?}", line.raw),
        "notes" => {
            let mut notes = line.diagnostics.clone();
            if line.end_of_input {
                notes.push("end of input".to_owned());
            }
            notes.join("; ")
        }
        _ => String::new(),
    }
}

/// Render one argument for humans: quoted, with absent values marked.
fn format_arg(arg: Option<&str>) -> String {
    arg.map_or_else(|| "<null>".to_owned(), |a| format!("{a:?}"))
}

// --- Error output ---

/// Write a structured error to stderr: the JSON envelope in JSON modes,
/// `error[<code>]: <message>` otherwise.
pub fn write_error(err: &ErrorOutput, format: OutputFormat) {
    let stderr = std::io::stderr();
    let mut out = stderr.lock();
    let _ = writeln!(out, "{}", render_error(err, format));
}

fn render_error(err: &ErrorOutput, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json | OutputFormat::Compact | OutputFormat::Ndjson => {
            serde_json::to_string_pretty(err).unwrap_or_default()
        }
        _ => format!("error[{}]: {}", err.error.code, err.error.message),
    }
}

// --- Debug timer ---

/// A RAII timer that logs elapsed milliseconds on drop.
///
/// Created via [`OutputCtx::timer`]. Does nothing when `debug` is false.
pub struct DebugTimer {
    label: &'static str,
    start: std::time::Instant,
    active: bool,
}

impl DebugTimer {
    #[must_use]
    fn new(label: &'static str, active: bool) -> Self {
        Self {
            label,
            start: std::time::Instant::now(),
            active,
        }
    }
}

impl Drop for DebugTimer {
    fn drop(&mut self) {
        if self.active {
            let ms = self.start.elapsed().as_secs_f64() * 1000.0;
            tracing::debug!(stage = self.label, elapsed_ms = ms, "timing");
        }
    }
}

// --- Generic JSON helpers ---

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => tracing::error!("JSON serialization error: {e}"),
    }
}

fn print_compact_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string(value) {
        Ok(s) => println!("{s}"),
        Err(e) => tracing::error!("JSON serialization error: {e}"),
    }
}

fn print_ndjson<T: Serialize>(values: &[T]) {
    for v in values {
        print_compact_json(v);
    }
}
