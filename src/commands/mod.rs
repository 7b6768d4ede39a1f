/// Command dispatch: routes `Command` enum variants to their implementations.
pub mod parse;
pub mod repl;

use crate::cli::OutputCtx;
use crate::cli::args::Command;
use crate::errors::AppError;

/// Dispatch a parsed `Command` to its handler.
///
/// # Errors
///
/// Returns `AppError` on any command failure.
pub fn dispatch(command: &Command, ctx: &OutputCtx) -> Result<(), AppError> {
    match command {
        Command::Repl(args) => repl::run(args, ctx),
        Command::Parse(args) => parse::run(args, ctx),
    }
}
