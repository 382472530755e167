// Interactive chat REPL against a local coach

use anyhow::Result;
use std::sync::Arc;

use super::commands::{format_help, format_helplines, Command};
use super::input::InputHandler;
use crate::coach::Coach;
use crate::store::{SosEvent, SosLevel};

/// Result of handling one line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Print(String),
    Quit,
}

pub struct ChatRepl {
    coach: Arc<Coach>,
    user_id: String,
    max_message_chars: usize,
}

impl ChatRepl {
    pub fn new(coach: Arc<Coach>, user_id: impl Into<String>, max_message_chars: usize) -> Self {
        Self {
            coach,
            user_id: user_id.into(),
            max_message_chars,
        }
    }

    /// Read lines until /quit, Ctrl+C or Ctrl+D
    pub async fn run(&self, input: &mut InputHandler) -> Result<()> {
        println!("Recovery coach. Type /help for commands, /sos if you need help now.\n");

        while let Some(line) = input.read_line("> ")? {
            if line.is_empty() {
                continue;
            }

            match self.handle_line(&line).await {
                LineOutcome::Print(text) => println!("\n{}\n", text),
                LineOutcome::Quit => break,
            }
        }

        if let Err(e) = input.save_history() {
            tracing::warn!(error = %e, "Failed to save input history");
        }
        println!("Take care.");
        Ok(())
    }

    pub async fn handle_line(&self, line: &str) -> LineOutcome {
        if let Some(command) = Command::parse(line) {
            return self.handle_command(command);
        }

        if line.chars().count() > self.max_message_chars {
            return LineOutcome::Print(format!(
                "That message is too long (max {} characters).",
                self.max_message_chars
            ));
        }

        let reply = self.coach.respond(&self.user_id, line).await;

        let mut text = reply.reply;
        if reply.classification.needs_follow_up() {
            text.push_str("\n\nHelplines:\n");
            text.push_str(&format_helplines(None));
        }
        LineOutcome::Print(text)
    }

    fn handle_command(&self, command: Command) -> LineOutcome {
        match command {
            Command::Help => LineOutcome::Print(format_help()),
            Command::Quit => LineOutcome::Quit,
            Command::Clear => match self.coach.store().clear_messages(&self.user_id) {
                Ok(_) => LineOutcome::Print("Conversation cleared.".to_string()),
                Err(e) => LineOutcome::Print(format!("Could not clear history: {}", e)),
            },
            Command::Usage(usage) => LineOutcome::Print(format!("Usage: {}", usage)),
            Command::Helplines(country) => {
                LineOutcome::Print(format_helplines(country.as_deref()))
            }
            Command::Sos => {
                let event = SosEvent::manual(&self.user_id, SosLevel::Crisis);
                if let Err(e) = self.coach.store().record_sos_event(event) {
                    tracing::error!(error = %e, "Failed to record SOS event");
                } else {
                    self.coach.metrics().record_sos_event(SosLevel::Crisis.as_str(), "manual");
                }
                LineOutcome::Print(format!(
                    "You don't have to face this alone. Please reach out now:\n{}",
                    format_helplines(None)
                ))
            }
            Command::Analyze(text) => {
                let result = self.coach.analyze(&text);
                LineOutcome::Print(
                    serde_json::to_string_pretty(&result)
                        .unwrap_or_else(|_| result.risk_level.to_string()),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crisis::CrisisDetector;
    use crate::responder::CRISIS_SUPPORT_MESSAGE;
    use crate::store::{MemoryStore, RecoveryStore};

    fn create_repl() -> (ChatRepl, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let coach = Coach::new(CrisisDetector::default(), store.clone()).unwrap();
        (ChatRepl::new(Arc::new(coach), "local", 2000), store)
    }

    #[tokio::test]
    async fn test_crisis_line_shows_helplines() {
        let (repl, _) = create_repl();

        match repl.handle_line("I feel hopeless").await {
            LineOutcome::Print(text) => {
                assert!(text.starts_with(CRISIS_SUPPORT_MESSAGE));
                assert!(text.contains("Helplines:"));
            }
            LineOutcome::Quit => panic!("Expected output"),
        }
    }

    #[tokio::test]
    async fn test_sos_command_records_event() {
        let (repl, store) = create_repl();

        repl.handle_line("/sos").await;

        let events = store.sos_events("local").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, SosLevel::Crisis);
    }

    #[tokio::test]
    async fn test_clear_command_forgets_history() {
        let (repl, store) = create_repl();

        repl.handle_line("hello").await;
        assert_eq!(store.message_count("local").unwrap(), 2);

        repl.handle_line("/clear").await;
        assert_eq!(store.message_count("local").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clear_keeps_sos_events() {
        let (repl, store) = create_repl();

        repl.handle_line("I feel hopeless").await;
        repl.handle_line("/sos").await;
        assert_eq!(store.sos_events("local").unwrap().len(), 2);

        repl.handle_line("/clear").await;
        assert_eq!(store.message_count("local").unwrap(), 0);
        assert_eq!(store.sos_events("local").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_bare_analyze_is_not_sent() {
        let (repl, store) = create_repl();

        let outcome = repl.handle_line("/analyze").await;
        assert_eq!(outcome, LineOutcome::Print("Usage: /analyze <text>".to_string()));
        assert_eq!(store.message_count("local").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_quit() {
        let (repl, _) = create_repl();
        assert_eq!(repl.handle_line("/quit").await, LineOutcome::Quit);
    }

    #[tokio::test]
    async fn test_long_message_rejected() {
        let (repl, store) = create_repl();

        let outcome = repl.handle_line(&"a".repeat(2001)).await;
        assert!(matches!(outcome, LineOutcome::Print(text) if text.contains("too long")));
        assert_eq!(store.message_count("local").unwrap(), 0);
    }
}
