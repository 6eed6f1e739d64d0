//! Context assembly for completion prompts.
//!
//! The prompt is built from five layers in fixed order:
//!
//! 1. **Persona** preamble
//! 2. **Educational context** from the request (recognized keys only, omitted when empty)
//! 3. **Session context** (subject, education level, preferred language)
//! 4. **Recent conversation** (last six messages, omitted when the session is empty)
//! 5. **Current request**

pub mod token;

use std::sync::Arc;

use eduassist_core::chat::value_as_text;
use eduassist_core::{ChatRequest, Message, ParamMap, Session, SessionStore, StoreError};
use serde_json::Value;
use tracing::debug;

pub use token::estimate_tokens;

const PERSONA: &str = "You are an AI assistant specifically designed for educators. \
Provide educational, practical, and actionable responses.\n\n";

/// Messages replayed into the prompt.
pub const HISTORY_WINDOW: usize = 6;

const HISTORY_MAX_CHARS: usize = 150;
const HISTORY_CUT_CHARS: usize = 147;

/// Recognized educational-context keys and their prompt labels, in render order.
const EDUCATIONAL_FIELDS: [(&str, &str); 5] = [
    ("subject", "Subject"),
    ("gradeLevel", "Grade Level"),
    ("lessonTopic", "Lesson Topic"),
    ("duration", "Duration"),
    ("classSize", "Class Size"),
];

/// Builds prompt text and merged educational context for a request.
pub struct ContextBuilder {
    store: Arc<dyn SessionStore>,
}

impl ContextBuilder {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Assemble the full generic-chat prompt.
    pub async fn build_prompt(
        &self,
        request: &ChatRequest,
        session: &Session,
    ) -> Result<String, StoreError> {
        let history = self.recent_messages(&session.id).await?;
        let prompt = render_prompt(request, session, &history);
        debug!(
            session_id = %session.id,
            chars = prompt.chars().count(),
            history = history.len(),
            "Built context prompt"
        );
        Ok(prompt)
    }

    /// The last [`HISTORY_WINDOW`] messages of a session, oldest first.
    pub async fn recent_messages(&self, session_id: &str) -> Result<Vec<Message>, StoreError> {
        let total = self.store.count_messages(session_id).await?;
        let mut messages = self.store.messages_in_session(session_id).await?;
        if total > HISTORY_WINDOW && messages.len() > HISTORY_WINDOW {
            messages.drain(..messages.len() - HISTORY_WINDOW);
        }
        Ok(messages)
    }

    /// Request educational context over session defaults; the request wins.
    pub fn build_structured_context(&self, request: &ChatRequest, session: &Session) -> ParamMap {
        build_structured_context(request, session)
    }

    pub fn estimate_tokens(&self, text: &str) -> u32 {
        estimate_tokens(text)
    }
}

/// Request educational context over session defaults; the request wins.
pub fn build_structured_context(request: &ChatRequest, session: &Session) -> ParamMap {
    let mut merged = request.educational_context.clone();
    let fallbacks = [
        ("subject", &session.current_subject),
        ("gradeLevel", &session.education_level),
        ("language", &session.preferred_language),
    ];
    for (key, value) in fallbacks {
        if let Some(value) = value {
            merged
                .entry(key)
                .or_insert_with(|| Value::String(value.clone()));
        }
    }
    merged
}

/// Render the prompt from already-fetched history.
pub fn render_prompt(request: &ChatRequest, session: &Session, history: &[Message]) -> String {
    let mut out = String::from(PERSONA);
    out.push_str(&educational_block(&request.educational_context));
    out.push_str(&session_block(session));
    out.push_str(&history_block(history));
    out.push_str("Current Request: ");
    out.push_str(&request.prompt);
    out
}

fn educational_block(context: &ParamMap) -> String {
    let lines: Vec<String> = EDUCATIONAL_FIELDS
        .iter()
        .filter_map(|(key, label)| {
            let value = value_as_text(context.get(*key)?)?;
            Some(format!("- {label}: {value}\n"))
        })
        .collect();
    if lines.is_empty() {
        return String::new();
    }
    format!("Educational Context:\n{}\n", lines.concat())
}

fn session_block(session: &Session) -> String {
    let mut out = String::from("Session Context:\n");
    if let Some(subject) = &session.current_subject {
        out.push_str(&format!("- Current Subject: {subject}\n"));
    }
    if let Some(level) = &session.education_level {
        out.push_str(&format!("- Education Level: {level}\n"));
    }
    if let Some(language) = &session.preferred_language {
        out.push_str(&format!("- Preferred Language: {language}\n"));
    }
    out.push('\n');
    out
}

fn history_block(history: &[Message]) -> String {
    if history.is_empty() {
        return String::new();
    }
    let mut out = String::from("Recent Conversation:\n");
    for msg in history {
        out.push_str(&format!(
            "- {}: {}\n",
            msg.sender.prompt_label(),
            truncate_for_history(&msg.content)
        ));
    }
    out.push('\n');
    out
}

fn truncate_for_history(content: &str) -> String {
    if content.chars().count() > HISTORY_MAX_CHARS {
        let head: String = content.chars().take(HISTORY_CUT_CHARS).collect();
        format!("{head}...")
    } else {
        content.to_string()
    }
}
