//! UI-agnostic conversation state
//!
//! The store is the single owner of the message log for a session. UIs read
//! messages through accessors and mutate only through the operations below.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// First message of every session and of every reset.
pub const GREETING: &str = "Hello! I'm your AI Medical Assistant. How can I help you today? \
You can ask me about symptoms, general health questions, or request medicine information.";

/// Marker placed in front of a disclaimer appended to an assistant reply.
pub const DISCLAIMER_MARKER: &str = "⚠️";

/// A chat message in the assistant conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

impl Message {
    /// Wall-clock time of the message as `HH:MM`.
    pub fn display_time(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Who sent a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    User,
    Assistant,
}

/// Append-only message log plus the transient loading flag and the
/// server-assigned conversation id.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    messages: Vec<Message>,
    next_id: u64,
    loading: bool,
    conversation_id: Option<String>,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        let mut store = Self {
            messages: Vec::new(),
            next_id: 1,
            loading: false,
            conversation_id: None,
        };
        store.push(MessageKind::Assistant, GREETING.to_string());
        store
    }

    pub fn append_user_message(&mut self, content: impl Into<String>) -> &Message {
        self.push(MessageKind::User, content.into())
    }

    /// Appends an assistant reply. A disclaimer, if any, becomes a marked
    /// suffix of the content rather than a separate field.
    pub fn append_assistant_message(
        &mut self,
        content: impl Into<String>,
        disclaimer: Option<&str>,
    ) -> &Message {
        let mut content = content.into();
        if let Some(disclaimer) = disclaimer.filter(|d| !d.trim().is_empty()) {
            content.push_str("\n\n");
            content.push_str(DISCLAIMER_MARKER);
            content.push(' ');
            content.push_str(disclaimer);
        }
        self.push(MessageKind::Assistant, content)
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Records the conversation id. `None` never clears an id already set;
    /// only `reset` does that.
    pub fn set_conversation_id(&mut self, id: Option<String>) {
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            if self.conversation_id.as_deref() != Some(id.as_str()) {
                tracing::debug!(conversation_id = %id, "conversation id assigned");
            }
            self.conversation_id = Some(id);
        }
    }

    /// Back to a single greeting with a fresh id sequence.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.next_id = 1;
        self.loading = false;
        self.conversation_id = None;
        self.push(MessageKind::Assistant, GREETING.to_string());
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    fn push(&mut self, kind: MessageKind, content: String) -> &Message {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message {
            id,
            kind,
            content,
            timestamp: Local::now(),
        });
        &self.messages[self.messages.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_holds_greeting() {
        let store = ConversationStore::new();
        assert_eq!(store.len(), 1);
        assert_eq!(store.messages()[0].id, 1);
        assert_eq!(store.messages()[0].kind, MessageKind::Assistant);
        assert_eq!(store.messages()[0].content, GREETING);
        assert!(!store.is_loading());
        assert!(store.conversation_id().is_none());
    }

    #[test]
    fn test_ids_increase_by_one() {
        let mut store = ConversationStore::new();
        store.append_user_message("hi");
        store.append_assistant_message("hello", None);
        store.append_user_message("");
        store.append_assistant_message("answer", Some("careful"));

        let ids: Vec<u64> = store.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_disclaimer_becomes_marked_suffix() {
        let mut store = ConversationStore::new();
        let msg = store.append_assistant_message("Drink water.", Some("See a doctor."));
        assert_eq!(msg.content, "Drink water.\n\n⚠️ See a doctor.");
        assert_eq!(msg.kind, MessageKind::Assistant);
    }

    #[test]
    fn test_blank_disclaimer_is_ignored() {
        let mut store = ConversationStore::new();
        let msg = store.append_assistant_message("Drink water.", Some("  "));
        assert_eq!(msg.content, "Drink water.");
    }

    #[test]
    fn test_conversation_id_not_cleared_by_none() {
        let mut store = ConversationStore::new();
        store.set_conversation_id(Some("abc".to_string()));
        store.set_conversation_id(None);
        assert_eq!(store.conversation_id(), Some("abc"));

        store.set_conversation_id(Some("def".to_string()));
        assert_eq!(store.conversation_id(), Some("def"));
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let mut store = ConversationStore::new();
        store.append_user_message("one");
        store.append_assistant_message("two", None);
        store.set_loading(true);
        store.set_conversation_id(Some("abc".to_string()));

        store.reset();

        assert_eq!(store.len(), 1);
        assert_eq!(store.messages()[0].id, 1);
        assert_eq!(store.messages()[0].content, GREETING);
        assert!(store.conversation_id().is_none());
        assert!(!store.is_loading());

        let next = store.append_user_message("again");
        assert_eq!(next.id, 2);
    }

    #[test]
    fn test_display_time_is_hours_and_minutes() {
        let store = ConversationStore::new();
        let time = store.messages()[0].display_time();
        assert_eq!(time.len(), 5);
        assert_eq!(&time[2..3], ":");
    }
}
