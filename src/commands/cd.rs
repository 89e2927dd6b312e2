use super::{err, Outcome};
use crate::paths::{Expect, Session};

/// Changes the session working directory. The new directory is
/// canonicalized once here so later relative resolutions are plain joins
/// and `..` never accumulates in the session state.
pub fn cd(session: &mut Session, args: &[String]) -> Outcome {
    let token = match args.first() {
        None => return Outcome::Quiet,
        Some(token) => token,
    };

    let Some(dir) = session.resolve(Some(token.as_str()), Expect::Dir) else {
        return Outcome::Failure(err("directory does not exist or is not a directory"));
    };

    match std::fs::canonicalize(&dir) {
        Ok(canonical) => {
            session.set_cwd(canonical);
            Outcome::Quiet
        }
        Err(e) => Outcome::Failure(err(format!("cannot change directory to '{}': {}", token, e))),
    }
}
