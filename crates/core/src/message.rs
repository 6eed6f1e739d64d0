//! Persisted conversation messages.
//!
//! Messages are append-only and totally ordered by timestamp within a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::short_id;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sender {
    /// The educator
    User,
    /// The AI assistant
    Assistant,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Assistant => "ASSISTANT",
        }
    }

    /// Parse the stored representation. Unknown values yield `None`.
    pub fn from_stored(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("ASSISTANT") {
            Some(Self::Assistant)
        } else if s.eq_ignore_ascii_case("USER") {
            Some(Self::User)
        } else {
            None
        }
    }

    /// Label used when replaying history into a prompt.
    pub fn prompt_label(&self) -> &'static str {
        match self {
            Self::User => "Educator",
            Self::Assistant => "Assistant",
        }
    }
}

/// A single message in a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID (`msg_` prefix)
    pub id: String,

    /// Owning session
    pub session_id: String,

    /// The text content
    pub content: String,

    /// Who sent this message
    pub sender: Sender,

    pub timestamp: DateTime<Utc>,

    /// Requested action type, as sent by the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,

    /// Serialized action metadata JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_metadata: Option<String>,

    /// Model that produced the content (assistant only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<String>,

    /// Rough token estimate (assistant only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
}

impl Message {
    /// Create a new user message.
    pub fn user(
        session_id: impl Into<String>,
        content: impl Into<String>,
        action_type: Option<String>,
        action_metadata: Option<String>,
    ) -> Self {
        Self {
            id: new_message_id(),
            session_id: session_id.into(),
            content: content.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            action_type,
            action_metadata,
            ai_model: None,
            tokens_used: None,
        }
    }

    /// Create a new assistant message.
    pub fn assistant(
        session_id: impl Into<String>,
        content: impl Into<String>,
        ai_model: impl Into<String>,
        tokens_used: u32,
    ) -> Self {
        Self {
            id: new_message_id(),
            session_id: session_id.into(),
            content: content.into(),
            sender: Sender::Assistant,
            timestamp: Utc::now(),
            action_type: None,
            action_metadata: None,
            ai_model: Some(ai_model.into()),
            tokens_used: Some(tokens_used),
        }
    }

    pub fn with_action(mut self, action_type: Option<String>, action_metadata: Option<String>) -> Self {
        self.action_type = action_type;
        self.action_metadata = action_metadata;
        self
    }
}

pub fn new_message_id() -> String {
    format!("msg_{}", short_id())
}
