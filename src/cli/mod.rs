// CLI module
// Interactive chat on the terminal

mod commands;
mod input;
mod repl;

pub use commands::{format_help, format_helplines, Command};
pub use input::InputHandler;
pub use repl::{ChatRepl, LineOutcome};
