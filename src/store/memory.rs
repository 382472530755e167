// In-memory store with process lifetime

use anyhow::Result;
use dashmap::DashMap;

use super::{RecoveryStore, SosEvent};
use crate::conversation::{ChatMessage, ConversationHistory};

/// Concurrent in-memory store using DashMap
pub struct MemoryStore {
    conversations: DashMap<String, ConversationHistory>,
    sos_events: DashMap<String, Vec<SosEvent>>,
    history_cap: usize,
}

impl MemoryStore {
    pub fn new(history_cap: usize) -> Self {
        Self {
            conversations: DashMap::new(),
            sos_events: DashMap::new(),
            history_cap,
        }
    }

    /// Number of users with stored conversation history
    pub fn user_count(&self) -> usize {
        self.conversations.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(ConversationHistory::DEFAULT_MAX_MESSAGES)
    }
}

impl RecoveryStore for MemoryStore {
    fn append_message(&self, user_id: &str, message: ChatMessage) -> Result<()> {
        self.conversations
            .entry(user_id.to_string())
            .or_insert_with(|| ConversationHistory::with_limit(self.history_cap))
            .add_message(message);
        Ok(())
    }

    fn recent_messages(&self, user_id: &str, limit: usize) -> Result<Vec<ChatMessage>> {
        Ok(self
            .conversations
            .get(user_id)
            .map(|history| history.recent(limit))
            .unwrap_or_default())
    }

    fn message_count(&self, user_id: &str) -> Result<usize> {
        Ok(self
            .conversations
            .get(user_id)
            .map(|history| history.message_count())
            .unwrap_or(0))
    }

    fn turn_count(&self, user_id: &str) -> Result<usize> {
        Ok(self
            .conversations
            .get(user_id)
            .map(|history| history.turn_count())
            .unwrap_or(0))
    }

    fn record_sos_event(&self, event: SosEvent) -> Result<()> {
        tracing::info!(
            user_id = %event.user_id,
            level = event.level.as_str(),
            source = ?event.source,
            "Recorded SOS event"
        );
        self.sos_events
            .entry(event.user_id.clone())
            .or_default()
            .push(event);
        Ok(())
    }

    fn sos_events(&self, user_id: &str) -> Result<Vec<SosEvent>> {
        Ok(self
            .sos_events
            .get(user_id)
            .map(|events| events.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    fn clear_messages(&self, user_id: &str) -> Result<bool> {
        Ok(self.conversations.remove(user_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SosLevel;

    #[test]
    fn test_history_is_per_user() {
        let store = MemoryStore::default();
        store.append_message("alice", ChatMessage::user("hi")).unwrap();
        store.append_message("bob", ChatMessage::user("hey")).unwrap();
        store.append_message("alice", ChatMessage::assistant("hello")).unwrap();

        assert_eq!(store.message_count("alice").unwrap(), 2);
        assert_eq!(store.message_count("bob").unwrap(), 1);
        assert_eq!(store.message_count("carol").unwrap(), 0);
        assert_eq!(store.user_count(), 2);
    }

    #[test]
    fn test_history_cap() {
        let store = MemoryStore::new(4);
        for i in 0..10 {
            store
                .append_message("alice", ChatMessage::user(format!("m{}", i)))
                .unwrap();
        }

        let messages = store.recent_messages("alice", 100).unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].content, "m6");
        assert_eq!(messages[3].content, "m9");
    }

    #[test]
    fn test_sos_events_newest_first() {
        let store = MemoryStore::default();
        store
            .record_sos_event(SosEvent::manual("alice", SosLevel::Urge))
            .unwrap();
        store
            .record_sos_event(SosEvent::manual("alice", SosLevel::Crisis))
            .unwrap();

        let events = store.sos_events("alice").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].level, SosLevel::Crisis);
        assert!(store.sos_events("bob").unwrap().is_empty());
    }

    #[test]
    fn test_clear_messages_keeps_sos_events() {
        let store = MemoryStore::default();
        store.append_message("alice", ChatMessage::user("hi")).unwrap();
        store
            .record_sos_event(SosEvent::manual("alice", SosLevel::Crisis))
            .unwrap();

        assert!(store.clear_messages("alice").unwrap());
        assert!(!store.clear_messages("alice").unwrap());
        assert_eq!(store.message_count("alice").unwrap(), 0);
        assert_eq!(store.turn_count("alice").unwrap(), 0);
        assert_eq!(store.sos_events("alice").unwrap().len(), 1);
    }

    #[test]
    fn test_turn_count_past_history_cap() {
        let store = MemoryStore::new(4);
        for i in 0..30 {
            store
                .append_message("alice", ChatMessage::user(format!("m{}", i)))
                .unwrap();
        }

        assert_eq!(store.message_count("alice").unwrap(), 4);
        assert_eq!(store.turn_count("alice").unwrap(), 15);
    }
}
