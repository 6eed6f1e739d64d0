//! Conversation sessions.
//!
//! A session is created on the first message that does not match an existing
//! (session id, user id) pair. It is mutated on every turn and never deleted,
//! only deactivated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TITLE_MAX_CHARS: usize = 50;
const TITLE_CUT_CHARS: usize = 47;
const TITLE_MIN_WORD_CUT: usize = 20;

/// A durable conversation between one user and the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session ID (`session_` prefix)
    pub id: String,

    /// Owning user
    pub user_id: String,

    /// Derived from the first prompt
    pub title: String,

    pub created_at: DateTime<Utc>,

    pub last_activity: DateTime<Utc>,

    pub active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_subject: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_action_type: Option<String>,
}

impl Session {
    /// Start a new active session titled after the opening prompt.
    pub fn new(user_id: impl Into<String>, first_prompt: &str, preferred_language: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_session_id(),
            user_id: user_id.into(),
            title: generate_title(first_prompt),
            created_at: now,
            last_activity: now,
            active: true,
            current_subject: None,
            preferred_language: Some(preferred_language.into()),
            education_level: None,
            last_action_type: None,
        }
    }
}

/// Derive a session title from the first prompt.
///
/// Prompts longer than 50 characters are cut to 47 characters and suffixed
/// with `...`. The cut moves back to the last space when that space sits in
/// the final 27 characters of the prefix (index 20 or later).
pub fn generate_title(prompt: &str) -> String {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return "New Chat Session".to_string();
    }
    if trimmed.chars().count() <= TITLE_MAX_CHARS {
        return trimmed.to_string();
    }

    let head: String = trimmed.chars().take(TITLE_CUT_CHARS).collect();
    let last_space = head.chars().enumerate().filter(|(_, c)| *c == ' ').map(|(i, _)| i).last();
    match last_space {
        Some(idx) if idx >= TITLE_MIN_WORD_CUT => {
            let cut: String = head.chars().take(idx).collect();
            format!("{cut}...")
        }
        _ => format!("{head}..."),
    }
}

pub fn new_session_id() -> String {
    format!("session_{}", short_id())
}

/// First eight hex characters of a fresh v4 UUID.
pub(crate) fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}
