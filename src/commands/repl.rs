/// `repl` command: read lines interactively until `exit` or end of input.
use std::fs::OpenOptions;
use std::io::{BufWriter, IsTerminal, Write};

use linecmd::{CharSource, Tokenizer, WriterSink};
use tracing::debug;

use crate::cli::OutputCtx;
use crate::cli::args::ReplArgs;
use crate::cli::output::write_line;
use crate::errors::AppError;
use crate::types::LineOutput;

/// Run `linecmd repl`.
///
/// # Errors
///
/// Returns `AppError` if the transcript cannot be opened, stdin fails, or a sink fails.
pub fn run(args: &ReplArgs, ctx: &OutputCtx) -> Result<(), AppError> {
    let stdin = std::io::stdin();
    let prompt = stdin.is_terminal().then_some(args.prompt.as_str());

    let mut tokenizer = Tokenizer::stdin();
    *tokenizer.config_mut() = args.tokenizer.config();

    if args.echo {
        tokenizer.sinks_mut().add(WriterSink::new(std::io::stdout()));
    }
    if let Some(path) = &args.transcript {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| AppError::Open {
                path: path.clone(),
                source,
            })?;
        tokenizer.sinks_mut().add(WriterSink::new(BufWriter::new(file)));
    }

    let count = session(&mut tokenizer, prompt, |line| write_line(&line, ctx), ctx)?;
    debug!(lines = count, "session ended");
    Ok(())
}

/// Drive one session: read, hand each line to `emit`, stop on `exit` or end of input.
///
/// Returns the number of lines emitted.
fn session<S: CharSource>(
    tokenizer: &mut Tokenizer<S>,
    prompt: Option<&str>,
    mut emit: impl FnMut(LineOutput),
    ctx: &OutputCtx,
) -> Result<usize, AppError> {
    let mut count = 0;
    loop {
        if let Some(prompt) = prompt {
            print!("{prompt}");
            let _ = std::io::stdout().flush();
        }

        let _t_read = ctx.timer("read_line");
        let line = tokenizer.read_line()?;
        drop(_t_read);

        if line.end_of_input && line.raw.is_empty() {
            return Ok(count);
        }

        count += 1;
        let stop = !line.should_continue || line.end_of_input;
        emit(LineOutput::from_line(count, line));
        if stop {
            return Ok(count);
        }
    }
}
