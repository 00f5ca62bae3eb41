//! Terminal file picker

use std::{io::ErrorKind, path::PathBuf};

use anyhow::{Result, bail};

use crate::port::picker::FilePicker;

/// Asks for a path on the terminal.
///
/// An empty answer or an interrupted prompt (Esc, Ctrl-C) counts as a dismissed dialog.
pub struct PromptFilePicker {
    prompt: String
}

impl PromptFilePicker {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into() }
    }
}

/// Interpret a typed answer; only existing regular files are accepted
pub(crate) fn resolve_answer(answer: &str) -> Result<Option<PathBuf>> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(None);
    }

    let path = PathBuf::from(answer);
    if !path.is_file() {
        bail!("'{}' is not a file", path.display());
    }
    Ok(Some(path))
}

impl FilePicker for PromptFilePicker {
    fn pick_file(&self) -> Result<Option<PathBuf>> {
        let answer = cliclack::input(&self.prompt).required(false).interact::<String>();

        match answer {
            Ok(answer) => resolve_answer(&answer),
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answers() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(resolve_answer("   ").unwrap(), None);
        assert_eq!(resolve_answer(&file.path().display().to_string()).unwrap(), Some(file.path().to_path_buf()));
        assert!(resolve_answer(&dir.path().display().to_string()).is_err());
        assert!(resolve_answer("/definitely/not/here.txt").is_err());
    }
}
