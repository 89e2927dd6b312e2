/// Command handlers. Each returns an [`Outcome`] instead of printing; the
/// read loop renders it and decides what to log.
mod archive;
mod cat;
mod cd;
mod cp;
mod ls;
mod mv;
mod rm;

pub use rm::{Confirm, StdinConfirm};

use crate::archive::{TarGzCodec, ZipCodec};
use crate::parser::{ArchiveOp, FileOp, ParsedCommand, Route};
use crate::paths::Session;

/// Result of one command. Multi-target commands join their per-target
/// failure lines into a single `Failure` report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Success with nothing to print.
    Quiet,
    /// Success with output text.
    Text(String),
    /// One human-readable report, possibly multi-line.
    Failure(String),
}

pub(crate) fn err(message: impl std::fmt::Display) -> String {
    format!("ERROR: {}", message)
}

pub(crate) fn aggregate(failures: Vec<String>) -> Outcome {
    if failures.is_empty() {
        Outcome::Quiet
    } else {
        Outcome::Failure(failures.join("\n"))
    }
}

/// Binds a routed command to its handler. Control and unknown routes are
/// handled by the read loop before dispatch.
pub fn dispatch(
    route: Route,
    cmd: &ParsedCommand,
    session: &mut Session,
    confirm: &mut dyn Confirm,
) -> Outcome {
    match route {
        Route::File(op) => match op {
            FileOp::Ls => ls::ls(session, &cmd.args),
            FileOp::Cd => cd::cd(session, &cmd.args),
            FileOp::Cat => cat::cat(session, &cmd.args),
            FileOp::Cp => cp::cp(session, &cmd.args),
            FileOp::Mv => mv::mv(session, &cmd.args),
            FileOp::Rm => rm::rm(session, &cmd.args, confirm),
        },
        Route::Archive(op) => match op {
            ArchiveOp::Zip => archive::zip(session, &cmd.args, &ZipCodec),
            ArchiveOp::Unzip => archive::unzip(session, &cmd.args, &ZipCodec),
            ArchiveOp::Tar => archive::tar(session, &cmd.args, &TarGzCodec),
            ArchiveOp::Untar => archive::untar(session, &cmd.args, &TarGzCodec),
        },
        Route::Control(_) | Route::Unknown => Outcome::Quiet,
    }
}
