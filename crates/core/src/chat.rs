//! Wire types for the chat pipeline.
//!
//! Field names on the wire are camelCase and normative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::action::ParamMap;
use crate::message::{Message, Sender};
use crate::session::Session;

/// Longest prompt accepted, in characters.
pub const MAX_PROMPT_CHARS: usize = 4000;

/// An educator's request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "serde_json::Map::is_empty"
    )]
    pub action_params: ParamMap,

    /// subject, gradeLevel, lessonTopic, duration, classSize, language
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "serde_json::Map::is_empty"
    )]
    pub educational_context: ParamMap,
}

/// An explicit JSON `null` reads the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl ChatRequest {
    pub fn new(user_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    /// The action type, if one was given and is not blank.
    pub fn action_type(&self) -> Option<&str> {
        self.action_type.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// A context value rendered as text. Numbers and booleans are stringified.
    pub fn context_value(&self, key: &str) -> Option<String> {
        value_as_text(self.educational_context.get(key)?)
    }
}

/// Render a scalar JSON value as prompt text.
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Success,
    Error,
    Processing,
}

/// Parameters that shaped an action response, echoed to the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMetadata {
    pub action_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_count: Option<u32>,
}

/// The pipeline's answer. Always produced, even on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    pub timestamp: DateTime<Utc>,

    pub status: ResponseStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_prompts: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_metadata: Option<ActionMetadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
}

impl ChatResponse {
    /// A failed response carrying only a message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message_id: None,
            content: None,
            session_id: None,
            timestamp: Utc::now(),
            status: ResponseStatus::Error,
            ai_model: None,
            suggested_prompts: Vec::new(),
            action_metadata: None,
            error_message: Some(message.into()),
            tokens_used: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

/// Session-level context echoed in session listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContextView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_subject: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_action_type: Option<String>,
}

/// A message as returned by the history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub message_id: String,
    pub content: String,
    pub sender_type: Sender,
    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_metadata: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
}

impl From<Message> for MessageView {
    fn from(msg: Message) -> Self {
        // Metadata is stored as text; unparsable blobs are dropped from the view.
        let action_metadata = msg
            .action_metadata
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok());
        Self {
            message_id: msg.id,
            content: msg.content,
            sender_type: msg.sender,
            timestamp: msg.timestamp,
            action_type: msg.action_type,
            action_metadata,
            ai_model: msg.ai_model,
            tokens_used: msg.tokens_used,
        }
    }
}

/// A session summary, optionally with its full message history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<SessionContextView>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<MessageView>>,
}

impl SessionView {
    /// Summary form used in session listings.
    pub fn summary(session: Session) -> Self {
        let context = SessionContextView {
            current_subject: session.current_subject,
            preferred_language: session.preferred_language,
            education_level: session.education_level,
            last_action_type: session.last_action_type,
        };
        Self {
            session_id: session.id,
            title: session.title,
            created_at: session.created_at,
            last_activity: session.last_activity,
            active: session.active,
            context: Some(context),
            messages: None,
        }
    }

    /// History form: session header plus ordered messages.
    pub fn with_messages(session: Session, messages: Vec<Message>) -> Self {
        Self {
            session_id: session.id,
            title: session.title,
            created_at: session.created_at,
            last_activity: session.last_activity,
            active: session.active,
            context: None,
            messages: Some(messages.into_iter().map(MessageView::from).collect()),
        }
    }
}
