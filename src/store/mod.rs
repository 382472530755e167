// Store module
//
// Repository abstraction over conversation history and safety events, so
// the coach can be backed by a real datastore without touching the
// classifier or reply logic.

mod memory;
mod types;

pub use memory::MemoryStore;
pub use types::{SosEvent, SosLevel, SosSource};

use anyhow::Result;

use crate::conversation::ChatMessage;

pub trait RecoveryStore: Send + Sync {
    /// Append a message to a user's history
    fn append_message(&self, user_id: &str, message: ChatMessage) -> Result<()>;

    /// The newest `limit` messages for a user, oldest first
    fn recent_messages(&self, user_id: &str, limit: usize) -> Result<Vec<ChatMessage>>;

    /// Number of stored messages for a user
    fn message_count(&self, user_id: &str) -> Result<usize>;

    /// Completed exchanges with a user, unaffected by the history cap
    fn turn_count(&self, user_id: &str) -> Result<usize>;

    /// Record a safety event for follow-up
    fn record_sos_event(&self, event: SosEvent) -> Result<()>;

    /// A user's safety events, newest first
    fn sos_events(&self, user_id: &str) -> Result<Vec<SosEvent>>;

    /// Forget a user's conversation; returns whether any existed
    ///
    /// Safety events are kept for follow-up.
    fn clear_messages(&self, user_id: &str) -> Result<bool>;
}
