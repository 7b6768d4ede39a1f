/// `parse` command: tokenize a whole file (or stdin) and print every line.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use linecmd::{CharSource, Config, Tokenizer, Utf8Source};

use crate::cli::OutputCtx;
use crate::cli::args::ParseArgs;
use crate::cli::output::write_lines;
use crate::errors::AppError;
use crate::types::LineOutput;

/// Run `linecmd parse`.
///
/// # Errors
///
/// Returns `AppError` if the input cannot be opened, is not UTF-8, or fails mid-read.
pub fn run(args: &ParseArgs, ctx: &OutputCtx) -> Result<(), AppError> {
    let reader: Box<dyn BufRead> = match args.input.as_deref() {
        None => Box::new(std::io::stdin().lock()),
        Some(path) if path == Path::new("-") => Box::new(std::io::stdin().lock()),
        Some(path) => {
            let file = File::open(path).map_err(|source| AppError::Open {
                path: path.to_path_buf(),
                source,
            })?;
            Box::new(BufReader::new(file))
        }
    };

    let _t_tokenize = ctx.timer("tokenize");
    let output = tokenize_all(
        Utf8Source::new(reader),
        args.tokenizer.config(),
        args.stop_at_exit,
    )?;
    drop(_t_tokenize);

    let _t_write = ctx.timer("write");
    write_lines(&output, ctx);
    drop(_t_write);

    Ok(())
}

fn tokenize_all<S: CharSource>(
    source: S,
    config: Config,
    stop_at_exit: bool,
) -> Result<Vec<LineOutput>, AppError> {
    let mut tokenizer = Tokenizer::with_config(source, config);
    let mut output = Vec::new();
    for (i, line) in tokenizer.lines().enumerate() {
        let line = line?;
        let stop = stop_at_exit && !line.should_continue;
        output.push(LineOutput::from_line(i + 1, line));
        if stop {
            break;
        }
    }
    Ok(output)
}
