use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{Result, ReviewError};

pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// Pipes the text into an external helper such as `wl-copy` or `pbcopy`.
pub struct CommandClipboard {
    command: Vec<String>,
}

impl CommandClipboard {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl Clipboard for CommandClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| ReviewError::Clipboard("no clipboard command configured".into()))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ReviewError::Clipboard(format!("{program}: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(text.as_bytes()) {
                drop(stdin);
                // reap the helper before reporting
                let _ = child.kill();
                let _ = child.wait();
                return Err(ReviewError::Clipboard(format!("{program}: {e}")));
            }
        }

        let status = child
            .wait()
            .map_err(|e| ReviewError::Clipboard(format!("{program}: {e}")))?;

        if !status.success() {
            return Err(ReviewError::Clipboard(format!("{program} exited with {status}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_clipboard_fails_softly() {
        let mut clip = CommandClipboard::new(Vec::new());
        assert!(matches!(clip.copy("hello"), Err(ReviewError::Clipboard(_))));
    }

    #[test]
    fn missing_program_is_a_clipboard_error() {
        let mut clip = CommandClipboard::new(vec!["transverify-no-such-clipboard-tool".into()]);
        assert!(matches!(clip.copy("hello"), Err(ReviewError::Clipboard(_))));
    }

    #[cfg(unix)]
    #[test]
    fn pipes_text_into_command() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("clip.txt");
        let script = format!("cat > '{}'", target.display());

        let mut clip = CommandClipboard::new(vec!["sh".into(), "-c".into(), script]);
        clip.copy("hello world").unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "hello world");
    }

    #[cfg(unix)]
    #[test]
    fn helper_that_stops_reading_is_reported_and_reaped() {
        // larger than any pipe buffer, so the write cannot complete
        let text = "x".repeat(4 * 1024 * 1024);

        let mut clip = CommandClipboard::new(vec!["sh".into(), "-c".into(), "exit 0".into()]);
        match clip.copy(&text) {
            Err(ReviewError::Clipboard(msg)) => assert!(msg.starts_with("sh: ")),
            other => panic!("expected clipboard error, got {other:?}"),
        }
    }
}
