use super::{err, Outcome};
use crate::paths::{Expect, Session};

pub fn cat(session: &Session, args: &[String]) -> Outcome {
    let [token] = args else {
        return Outcome::Failure(err("'cat' requires a single file argument"));
    };

    let Some(path) = session.resolve(Some(token.as_str()), Expect::File) else {
        return Outcome::Failure(err(format!(
            "file '{}' does not exist or is not a file",
            token
        )));
    };

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => return Outcome::Failure(err(format!("cannot read '{}': {}", token, e))),
    };

    let size = bytes.len();
    match String::from_utf8(bytes) {
        Ok(text) => Outcome::Text(text),
        // not decodable as text; report the fact instead of dumping bytes
        Err(_) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| token.clone());
            Outcome::Text(format!("{}: binary file ({} bytes)", name, size))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::TestEnv;

    fn args(s: &str) -> Vec<String> {
        vec![s.to_string()]
    }

    #[test]
    fn prints_file_content() {
        let env = TestEnv::new();
        let outcome = cat(&env.session(), &args("file1.txt"));
        assert_eq!(
            outcome,
            Outcome::Text("Hello World!\nLine 2".to_string())
        );
    }

    #[test]
    fn empty_file_prints_nothing() {
        let env = TestEnv::new();
        let outcome = cat(&env.session(), &args("empty.txt"));
        assert_eq!(outcome, Outcome::Text(String::new()));
    }

    #[test]
    fn missing_file_is_error() {
        let env = TestEnv::new();
        let outcome = cat(&env.session(), &args("nonexistent.txt"));
        assert!(matches!(outcome, Outcome::Failure(ref r) if r.starts_with("ERROR:")));
    }

    #[test]
    fn directory_is_error() {
        let env = TestEnv::new();
        let outcome = cat(&env.session(), &args("subdir"));
        assert!(matches!(outcome, Outcome::Failure(_)));
    }

    #[test]
    fn no_args_is_error() {
        let env = TestEnv::new();
        let outcome = cat(&env.session(), &[]);
        assert!(matches!(outcome, Outcome::Failure(_)));
    }

    #[test]
    fn extra_args_are_rejected() {
        let env = TestEnv::new();
        let outcome = cat(
            &env.session(),
            &["file1.txt".to_string(), "file2.txt".to_string()],
        );
        assert!(matches!(outcome, Outcome::Failure(_)));
    }

    #[test]
    fn binary_file_reports_marker_not_bytes() {
        let env = TestEnv::new();
        std::fs::write(env.path("blob.bin"), [0xFF, 0xFE, 0x00, 0x80, 0x01]).unwrap();
        let outcome = cat(&env.session(), &args("blob.bin"));
        assert_eq!(
            outcome,
            Outcome::Text("blob.bin: binary file (5 bytes)".to_string())
        );
    }
}
