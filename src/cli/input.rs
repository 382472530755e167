// Readline input handler with history and editing support

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

pub struct InputHandler {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
}

impl InputHandler {
    /// Create an input handler that persists history to ~/.recovery-coach/history.txt
    pub fn new() -> Result<Self> {
        let history_path = dirs::home_dir().map(|home| home.join(".recovery-coach").join("history.txt"));
        Self::with_history_path(history_path)
    }

    /// Create an input handler with an explicit history file (or none)
    pub fn with_history_path(history_path: Option<PathBuf>) -> Result<Self> {
        let mut editor = DefaultEditor::new().context("Failed to initialize readline editor")?;

        if let Some(path) = &history_path {
            if path.exists() {
                let _ = editor.load_history(path);
            }
        }

        Ok(Self {
            editor,
            history_path,
        })
    }

    /// Read a line of input
    ///
    /// Returns `Ok(None)` on Ctrl+C or Ctrl+D.
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                let line = line.trim().to_string();
                if !line.is_empty() {
                    self.editor
                        .add_history_entry(&line)
                        .context("Failed to add history entry")?;
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err).context("Failed to read input"),
        }
    }

    pub fn save_history(&mut self) -> Result<()> {
        let Some(path) = &self.history_path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        self.editor
            .save_history(path)
            .with_context(|| format!("Failed to save history to {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_history_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.txt");

        let mut handler = InputHandler::with_history_path(Some(path.clone())).unwrap();
        handler.save_history().unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_no_history_path_is_noop() {
        let mut handler = InputHandler::with_history_path(None).unwrap();
        assert!(handler.save_history().is_ok());
    }
}
