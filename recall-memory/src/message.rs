//! Metadata stored alongside each indexed vector

use serde::{Deserialize, Serialize};

/// The message behind one vector in the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Session this message belongs to
    pub session_id: String,

    /// Original message text
    pub text: String,
}

impl MessageRecord {
    pub fn new(session_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            text: text.into(),
        }
    }

    pub fn belongs_to(&self, session_id: &str) -> bool {
        self.session_id == session_id
    }
}
