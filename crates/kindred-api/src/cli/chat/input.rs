//! Async readline input handling for the chat loop.

use rustyline_async::{Readline, ReadlineError, ReadlineEvent, SharedWriter};

/// Events produced by the input handler.
#[derive(Debug)]
pub enum InputEvent {
    /// User submitted a line (already trimmed).
    Message(String),
    /// End of file (Ctrl+D).
    Eof,
    /// Interrupt signal (Ctrl+C).
    Interrupted,
}

/// Async input handler wrapping rustyline_async.
pub struct ChatInput {
    rl: Readline,
}

impl ChatInput {
    /// Returns the handler and a `SharedWriter` for printing without
    /// clobbering the prompt.
    pub fn new(prompt: String) -> Result<(Self, SharedWriter), ReadlineError> {
        let (rl, stdout) = Readline::new(prompt)?;
        Ok((Self { rl }, stdout))
    }

    pub async fn read_line(&mut self) -> InputEvent {
        match self.rl.readline().await {
            Ok(ReadlineEvent::Line(line)) => {
                let trimmed = line.trim().to_string();
                if !trimmed.is_empty() {
                    let _ = self.rl.add_history_entry(trimmed.clone());
                }
                InputEvent::Message(trimmed)
            }
            Ok(ReadlineEvent::Eof) => InputEvent::Eof,
            Ok(ReadlineEvent::Interrupted) => InputEvent::Interrupted,
            Err(e) => {
                tracing::debug!(error = %e, "Readline failed; treating as EOF");
                InputEvent::Eof
            }
        }
    }

    /// Clear the terminal screen.
    pub fn clear(&mut self) {
        let _ = self.rl.clear();
    }

    /// Restore the terminal before the process exits.
    pub fn flush(&mut self) {
        let _ = self.rl.flush();
    }
}
