//! Action registry: the closed set of structured operations an educator can
//! request, with their allowed parameters and static defaults.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Loose key/value map as it arrives on the wire.
pub type ParamMap = serde_json::Map<String, Value>;

/// A structured operation requested alongside the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Translate,
    Summarize,
    Rewrite,
    QuestionGeneration,
}

/// Which configured model a request is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// General chat, translation and summaries.
    Standard,
    /// Generation tasks that need stronger reasoning.
    Advanced,
}

const TRANSLATE_KEYS: &[&str] = &["targetLanguage", "originalLanguage", "tone"];
const SUMMARIZE_KEYS: &[&str] = &["summaryType", "maxLength", "focusArea"];
const REWRITE_KEYS: &[&str] = &["targetAudience", "tone", "purpose"];
const QUESTION_KEYS: &[&str] = &["questionCount", "difficultyLevel", "questionTypes", "cognitiveLevel"];

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Translate,
        ActionKind::Summarize,
        ActionKind::Rewrite,
        ActionKind::QuestionGeneration,
    ];

    /// Case-insensitive lookup by wire name (e.g. `"translate"`, `"QUESTION_GENERATION"`).
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
    }

    /// The wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Translate => "TRANSLATE",
            Self::Summarize => "SUMMARIZE",
            Self::Rewrite => "REWRITE",
            Self::QuestionGeneration => "QUESTION_GENERATION",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Translate => "Translate content to different languages",
            Self::Summarize => "Create concise summaries of content",
            Self::Rewrite => "Rewrite content with different tone or style",
            Self::QuestionGeneration => "Generate educational questions from content",
        }
    }

    pub fn allowed_params(&self) -> &'static [&'static str] {
        match self {
            Self::Translate => TRANSLATE_KEYS,
            Self::Summarize => SUMMARIZE_KEYS,
            Self::Rewrite => REWRITE_KEYS,
            Self::QuestionGeneration => QUESTION_KEYS,
        }
    }

    /// Report every parameter key this action does not accept.
    ///
    /// Keys are checked only, never values. An empty map is always valid.
    pub fn validate_params(&self, params: &ParamMap) -> Vec<String> {
        let allowed = self.allowed_params();
        params
            .keys()
            .filter(|key| !allowed.contains(&key.as_str()))
            .map(|key| format!("Unsupported parameter '{key}' for action type {}", self.as_str()))
            .collect()
    }

    /// Built-in defaults used when no configured defaults exist.
    pub fn default_params(&self) -> ParamMap {
        let value = match self {
            Self::Translate => json!({
                "targetLanguage": "Spanish",
                "originalLanguage": "auto-detect",
                "tone": "neutral",
            }),
            Self::Summarize => json!({
                "summaryType": "PARAGRAPH",
                "maxLength": 200,
                "focusArea": "main_ideas",
            }),
            Self::Rewrite => json!({
                "targetAudience": "general",
                "tone": "professional",
                "purpose": "educational",
            }),
            Self::QuestionGeneration => json!({
                "questionCount": 5,
                "difficultyLevel": "intermediate",
                "questionTypes": ["multiple_choice", "short_answer"],
                "cognitiveLevel": ["knowledge", "comprehension", "application"],
            }),
        };
        match value {
            Value::Object(map) => map,
            _ => ParamMap::new(),
        }
    }

    /// Whether the output quality depends on an educational context being supplied.
    pub fn requires_context(&self) -> bool {
        matches!(self, Self::QuestionGeneration | Self::Rewrite)
    }

    pub fn recommended_context_keys(&self) -> &'static [&'static str] {
        match self {
            Self::QuestionGeneration => &["subject", "gradeLevel", "lessonTopic", "duration"],
            Self::Rewrite => &["gradeLevel", "subject"],
            Self::Summarize => &["subject", "gradeLevel"],
            Self::Translate => &[],
        }
    }

    pub fn model_tier(&self) -> ModelTier {
        match self {
            Self::QuestionGeneration | Self::Rewrite => ModelTier::Advanced,
            Self::Translate | Self::Summarize => ModelTier::Standard,
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
