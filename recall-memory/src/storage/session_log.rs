//! In-memory append-only conversation logs, one per session

use std::collections::HashMap;

/// Ordered message texts grouped by session
#[derive(Debug, Default, Clone)]
pub struct SessionLogs {
    sessions: HashMap<String, Vec<String>>,
}

impl SessionLogs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the session's log, creating the log if absent
    pub fn append(&mut self, session_id: &str, text: String) {
        self.sessions
            .entry(session_id.to_string())
            .or_default()
            .push(text);
    }

    /// Read all messages for a session in insertion order
    pub fn read_all(&self, session_id: &str) -> Vec<String> {
        self.sessions.get(session_id).cloned().unwrap_or_default()
    }

    /// Count messages in a session
    pub fn count(&self, session_id: &str) -> usize {
        self.sessions.get(session_id).map_or(0, Vec::len)
    }

    /// Number of sessions with at least one message
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }
}
