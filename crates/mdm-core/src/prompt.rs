//! Overwrite confirmation when a final file exists with an unexpected size.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Mutex;

/// Asked before a fetch replaces an existing file whose size does not match.
/// Returning `false` skips that one file; the rest of the run continues.
pub trait OverwritePrompt: Send + Sync {
    fn confirm_overwrite(&self, path: &Path, existing: u64, expected: u64) -> bool;
}

/// Interactive prompt on stdin/stderr. Concurrent fetches are serialized so
/// questions never interleave.
#[derive(Debug, Default)]
pub struct StdinPrompt {
    lock: Mutex<()>,
}

impl StdinPrompt {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OverwritePrompt for StdinPrompt {
    fn confirm_overwrite(&self, path: &Path, existing: u64, expected: u64) -> bool {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut stderr = io::stderr().lock();
        let _ = write!(
            stderr,
            "{}: file already exists ({} bytes, expected {}), overwriting? [y/n] ",
            path.display(),
            existing,
            expected
        );
        let _ = stderr.flush();
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(e) => {
                tracing::warn!("could not read overwrite answer: {}", e);
                false
            }
        }
    }
}

/// Fixed answer for non-interactive runs (`--yes`) and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl OverwritePrompt for FixedAnswer {
    fn confirm_overwrite(&self, _path: &Path, _existing: u64, _expected: u64) -> bool {
        self.0
    }
}

/// Only an explicit `y` / `yes` (any case) counts as consent.
pub fn is_affirmative(answer: &str) -> bool {
    let a = answer.trim();
    a.eq_ignore_ascii_case("y") || a.eq_ignore_ascii_case("yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affirmative_answers() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative("Y\r\n"));
        assert!(is_affirmative("yes"));
    }

    #[test]
    fn everything_else_declines() {
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("\n"));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("yep"));
        assert!(!is_affirmative("sure"));
    }

    #[test]
    fn fixed_answer() {
        let p = Path::new("a.mp4");
        assert!(FixedAnswer(true).confirm_overwrite(p, 1, 2));
        assert!(!FixedAnswer(false).confirm_overwrite(p, 1, 2));
    }
}
