//! Per-session state, keyed the way a hosting framework's session store is.
//!
//! Nothing here outlives the process: ending a session drops every entry.

use crate::conversation::{Conversation, Turn};
use chrono::{DateTime, Local};
use log::info;
use std::collections::HashMap;
use uuid::Uuid;

/// Key under which the chat history lives.
pub const MESSAGES_KEY: &str = "messages";

#[derive(Debug)]
pub struct SessionState {
    id: Uuid,
    started_at: DateTime<Local>,
    store: HashMap<String, Conversation>,
}

impl SessionState {
    pub fn new() -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            started_at: Local::now(),
            store: HashMap::new(),
        };
        info!("session {} started", session.id);
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the conversation under `key`, creating an empty one if absent.
    pub fn conversation_mut(&mut self, key: &str) -> &mut Conversation {
        self.store.entry(key.to_string()).or_default()
    }

    pub fn conversation(&self, key: &str) -> Option<&Conversation> {
        self.store.get(key)
    }

    pub fn messages(&self) -> &[Turn] {
        self.conversation(MESSAGES_KEY)
            .map(Conversation::turns)
            .unwrap_or(&[])
    }

    pub fn messages_mut(&mut self) -> &mut Conversation {
        self.conversation_mut(MESSAGES_KEY)
    }

    /// Ends the session, discarding all of its state.
    pub fn end(self) {
        let elapsed = Local::now().signed_duration_since(self.started_at);
        info!(
            "session {} ended after {} turns ({}s)",
            self.id,
            self.messages().len(),
            elapsed.num_seconds()
        );
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_start_empty_and_uninitialised() {
        let session = SessionState::new();
        assert!(session.conversation(MESSAGES_KEY).is_none());
        assert!(session.messages().is_empty());
    }

    #[test]
    fn test_messages_mut_initialises_once() {
        let mut session = SessionState::new();
        session.messages_mut().push(Turn::user("hello"));
        assert!(session.conversation(MESSAGES_KEY).is_some());

        // A second access must not reset the history.
        session.messages_mut();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].content, "hello");
    }

    #[test]
    fn test_sessions_are_isolated() {
        let mut first = SessionState::new();
        let second = SessionState::new();
        first.messages_mut().push(Turn::user("only in first"));

        assert_ne!(first.id(), second.id());
        assert!(second.messages().is_empty());
    }

    #[test]
    fn test_other_keys_do_not_touch_messages() {
        let mut session = SessionState::new();
        session.conversation_mut("drafts").push(Turn::user("draft"));
        assert!(session.messages().is_empty());
        assert_eq!(session.conversation("drafts").map(Conversation::len), Some(1));
    }
}
