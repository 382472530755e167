// Slash command handling for the chat REPL

use crate::crisis::{helplines_for, Helpline, DEFAULT_COUNTRY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    /// Forget this session's conversation history
    Clear,
    /// Show helplines, optionally for a country code
    Helplines(Option<String>),
    /// Record a manual crisis SOS event and show helplines
    Sos,
    /// Classify text without sending it
    Analyze(String),
    /// A command given without its required argument
    Usage(&'static str),
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();

        match trimmed {
            "/help" | "/?" => return Some(Command::Help),
            "/quit" | "/exit" => return Some(Command::Quit),
            "/clear" | "/reset" => return Some(Command::Clear),
            "/helplines" => return Some(Command::Helplines(None)),
            "/sos" => return Some(Command::Sos),
            "/analyze" => return Some(Command::Usage("/analyze <text>")),
            _ => {}
        }

        if let Some(rest) = trimmed.strip_prefix("/helplines ") {
            let country = rest.trim();
            return Some(Command::Helplines(if country.is_empty() {
                None
            } else {
                Some(country.to_string())
            }));
        }

        if let Some(rest) = trimmed.strip_prefix("/analyze ") {
            let text = rest.trim();
            if !text.is_empty() {
                return Some(Command::Analyze(text.to_string()));
            }
        }

        None
    }
}

pub fn format_help() -> String {
    r#"Available commands:
  /help               - Show this help message
  /quit               - Exit the chat
  /clear              - Clear conversation history (start fresh)
  /helplines [CODE]   - Show gambling helplines (US, UK, CA, AU)
  /sos                - Ask for help now: records an SOS and shows helplines
  /analyze <text>     - Show how a message would be classified

Anything else is sent to the coach."#
        .to_string()
}

pub fn format_helplines(country: Option<&str>) -> String {
    let lines: Vec<String> = helplines_for(country.unwrap_or(DEFAULT_COUNTRY))
        .iter()
        .map(format_helpline)
        .collect();
    lines.join("\n")
}

fn format_helpline(helpline: &Helpline) -> String {
    let mut line = format!("  {} - {}", helpline.name, helpline.phone);
    if let Some(sms) = helpline.sms {
        line.push_str(&format!(" (text {})", sms));
    }
    line.push_str(&format!("\n    {}", helpline.web));
    line
}
