//! Line source with rustyline
//!
//! Reads the terminal a line at a time with editing and history, printing
//! the configured banner as the prompt, and hands the tokenizer one
//! character at a time.

use std::collections::VecDeque;
use std::path::PathBuf;

use rustyline::config::Config;
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::{CompletionType, EditMode, Editor};

use crate::frontend::core::lexer::CharSource;
use crate::util::config::ReplConfig;

/// Interactive character source
///
/// Not `Send`: an interactive terminal always drives the synchronous
/// tokenizer.
pub struct EditorSource {
    editor: Editor<(), FileHistory>,
    prompt: String,
    history_file: Option<PathBuf>,
    pending: VecDeque<char>,
    finished: bool,
}

impl std::fmt::Debug for EditorSource {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("EditorSource")
            .field("prompt", &self.prompt)
            .field("history_file", &self.history_file)
            .field("pending", &self.pending.len())
            .field("finished", &self.finished)
            .finish()
    }
}

impl EditorSource {
    /// Create an editor from the REPL configuration
    pub fn new(config: &ReplConfig) -> Result<Self, ReadlineError> {
        let rl_config = Config::builder()
            .history_ignore_space(true)
            .max_history_size(config.history_size)?
            .completion_type(CompletionType::List)
            .edit_mode(EditMode::Emacs)
            .build();

        let mut editor = Editor::with_config(rl_config)?;

        // Load history if file exists
        if let Some(history_file) = &config.history_file {
            if history_file.exists() {
                if let Err(e) = editor.load_history(history_file) {
                    tracing::warn!("cannot load history {}: {}", history_file.display(), e);
                }
            }
        }

        Ok(Self {
            editor,
            prompt: config.banner.clone(),
            history_file: config.history_file.clone(),
            pending: VecDeque::new(),
            finished: false,
        })
    }

    /// Read one line into the pending buffer; false at end of input
    fn fill(&mut self) -> bool {
        loop {
            match self.editor.readline(&self.prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                            tracing::debug!("history: {}", e);
                        }
                    }
                    self.pending.extend(line.chars());
                    self.pending.push_back('\n');
                    return true;
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl-C drops the line being typed
                    continue;
                }
                Err(ReadlineError::Eof) => return false,
                Err(e) => {
                    tracing::error!("readline: {}", e);
                    return false;
                }
            }
        }
    }

    fn save_history(&mut self) {
        if let Some(history_file) = &self.history_file {
            if let Err(e) = self.editor.save_history(history_file) {
                tracing::warn!("cannot save history {}: {}", history_file.display(), e);
            }
        }
    }
}

impl CharSource for EditorSource {
    fn next_char(&mut self) -> Option<char> {
        if self.finished {
            return None;
        }
        if self.pending.is_empty() && !self.fill() {
            self.finished = true;
            return None;
        }
        self.pending.pop_front()
    }

    fn is_interactive(&self) -> bool {
        true
    }
}

impl Drop for EditorSource {
    fn drop(&mut self) {
        self.save_history();
    }
}
