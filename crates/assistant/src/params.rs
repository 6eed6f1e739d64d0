//! Parameter resolution: configured defaults merged with user overrides,
//! then converted once into typed per-action structs.

use std::collections::HashMap;

use eduassist_config::ActionDefaultsConfig;
use eduassist_core::{ActionKind, ParamMap};
use serde_json::Value;
use tracing::error;

/// Immutable per-kind default parameter maps, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ParameterResolver {
    defaults: HashMap<ActionKind, ParamMap>,
}

impl ParameterResolver {
    /// Kinds missing from `defaults` fall back to the built-in defaults.
    pub fn new(mut defaults: HashMap<ActionKind, ParamMap>) -> Self {
        for kind in ActionKind::ALL {
            defaults.entry(kind).or_insert_with(|| kind.default_params());
        }
        Self { defaults }
    }

    pub fn from_config(actions: &ActionDefaultsConfig) -> Self {
        Self::new(actions.all())
    }

    /// Resolver over the built-in defaults only.
    pub fn builtin() -> Self {
        Self::new(HashMap::new())
    }

    pub fn defaults(&self, kind: ActionKind) -> ParamMap {
        self.defaults
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| kind.default_params())
    }

    /// Merge by action type string.
    ///
    /// An unrecognized kind returns `user` unchanged: unknown kinds fail open,
    /// unknown keys on known kinds are rejected by validation instead.
    pub fn merge(&self, action_type: &str, user: &ParamMap) -> ParamMap {
        match ActionKind::parse(action_type) {
            Some(kind) => self.merge_kind(kind, user),
            None => {
                error!(action_type, "Cannot resolve parameters for unknown action type");
                user.clone()
            }
        }
    }

    /// Copy the defaults for `kind` and overlay every user key, nulls included.
    pub fn merge_kind(&self, kind: ActionKind, user: &ParamMap) -> ParamMap {
        let mut merged = self.defaults(kind);
        for (key, value) in user {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Merge and convert into the typed parameters of one action.
    pub fn resolve<P: ActionParams>(&self, user: &ParamMap) -> P {
        P::from_map(&self.merge_kind(P::KIND, user))
    }

    /// Structural and value validation of user parameters for a known kind.
    pub fn validate(kind: ActionKind, user: &ParamMap) -> Vec<String> {
        let mut errors = kind.validate_params(user);
        errors.extend(check_values(kind, user));
        errors
    }
}

/// Value checks on allowed keys: positive counts and a non-null target language.
///
/// Anything else the user sends is accepted; typed conversion falls back to
/// the built-in default for nulls and mistyped values.
pub fn check_values(kind: ActionKind, user: &ParamMap) -> Vec<String> {
    let mut errors = Vec::new();
    let positive = |key: &str, errors: &mut Vec<String>| {
        if let Some(value) = user.get(key) {
            if !matches!(value.as_i64(), Some(n) if n > 0) {
                errors.push(format!("{key} must be a positive integer"));
            }
        }
    };

    match kind {
        ActionKind::Translate => {
            if matches!(user.get("targetLanguage"), Some(Value::Null)) {
                errors.push("targetLanguage cannot be null".to_string());
            }
        }
        ActionKind::QuestionGeneration => positive("questionCount", &mut errors),
        ActionKind::Summarize => positive("maxLength", &mut errors),
        ActionKind::Rewrite => {}
    }
    errors
}

/// Advisory notes about the prompt for a given action. Never blocking.
pub fn content_advisories(kind: ActionKind, prompt: &str) -> Vec<&'static str> {
    let len = prompt.chars().count();
    let mut notes = Vec::new();
    match kind {
        ActionKind::Translate if len > 2000 => {
            notes.push("Translation text is quite long, consider breaking into smaller segments")
        }
        ActionKind::QuestionGeneration if len < 50 => {
            notes.push("Content seems too short for meaningful question generation")
        }
        ActionKind::Summarize if len < 100 => {
            notes.push("Content might be too short to summarize effectively")
        }
        _ => {}
    }
    notes
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(
            s.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        ),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(String::from))
            .collect(),
        _ => None,
    }
}

fn text(map: &ParamMap, key: &str, fallback: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => fallback.to_string(),
    }
}

fn count(map: &ParamMap, key: &str, fallback: u32) -> u32 {
    map.get(key)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
        .unwrap_or(fallback)
}

fn list(map: &ParamMap, key: &str, fallback: &[&str]) -> Vec<String> {
    map.get(key)
        .and_then(string_list)
        .unwrap_or_else(|| fallback.iter().map(|s| s.to_string()).collect())
}

/// Typed parameters for one action kind.
pub trait ActionParams: Sized {
    const KIND: ActionKind;

    /// Convert a merged map. Missing or mistyped values take the built-in default.
    fn from_map(map: &ParamMap) -> Self;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslateParams {
    pub target_language: String,
    pub original_language: String,
    pub tone: String,
}

impl ActionParams for TranslateParams {
    const KIND: ActionKind = ActionKind::Translate;

    fn from_map(map: &ParamMap) -> Self {
        Self {
            target_language: text(map, "targetLanguage", "Spanish"),
            original_language: text(map, "originalLanguage", "auto-detect"),
            tone: text(map, "tone", "neutral"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummarizeParams {
    pub summary_type: String,
    /// Advisory word budget.
    pub max_length: u32,
    pub focus_area: String,
}

impl ActionParams for SummarizeParams {
    const KIND: ActionKind = ActionKind::Summarize;

    fn from_map(map: &ParamMap) -> Self {
        Self {
            summary_type: text(map, "summaryType", "PARAGRAPH"),
            max_length: count(map, "maxLength", 200),
            focus_area: text(map, "focusArea", "main_ideas"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RewriteParams {
    pub target_audience: String,
    pub tone: String,
    pub purpose: String,
}

impl ActionParams for RewriteParams {
    const KIND: ActionKind = ActionKind::Rewrite;

    fn from_map(map: &ParamMap) -> Self {
        Self {
            target_audience: text(map, "targetAudience", "general"),
            tone: text(map, "tone", "professional"),
            purpose: text(map, "purpose", "educational"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionParams {
    pub question_count: u32,
    pub difficulty_level: String,
    pub question_types: Vec<String>,
    pub cognitive_level: Vec<String>,
}

impl ActionParams for QuestionParams {
    const KIND: ActionKind = ActionKind::QuestionGeneration;

    fn from_map(map: &ParamMap) -> Self {
        Self {
            question_count: count(map, "questionCount", 5),
            difficulty_level: text(map, "difficultyLevel", "intermediate"),
            question_types: list(map, "questionTypes", &["multiple_choice", "short_answer"]),
            cognitive_level: list(
                map,
                "cognitiveLevel",
                &["knowledge", "comprehension", "application"],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> ParamMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn merge_with_empty_params_equals_defaults() {
        let resolver = ParameterResolver::builtin();
        for kind in ActionKind::ALL {
            assert_eq!(resolver.merge_kind(kind, &ParamMap::new()), kind.default_params());
            assert_eq!(resolver.merge(kind.as_str(), &ParamMap::new()), kind.default_params());
        }
    }

    #[test]
    fn tone_override_touches_only_tone() {
        let resolver = ParameterResolver::builtin();
        let merged = resolver.merge("rewrite", &params(json!({"tone": "formal"})));
        assert_eq!(merged["tone"], "formal");
        assert_eq!(merged["targetAudience"], "general");
        assert_eq!(merged["purpose"], "educational");
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn merge_does_not_mutate_shared_defaults() {
        let resolver = ParameterResolver::builtin();
        let _ = resolver.merge("translate", &params(json!({"targetLanguage": "German"})));
        assert_eq!(resolver.defaults(ActionKind::Translate)["targetLanguage"], "Spanish");
    }

    #[test]
    fn explicit_null_overrides_default() {
        let resolver = ParameterResolver::builtin();
        let merged = resolver.merge("translate", &params(json!({"tone": null})));
        assert!(merged["tone"].is_null());
    }

    #[test]
    fn unknown_kind_fails_open() {
        let resolver = ParameterResolver::builtin();
        let user = params(json!({"anything": 1}));
        assert_eq!(resolver.merge("FOO", &user), user);
    }

    #[test]
    fn configured_defaults_take_precedence() {
        let mut actions = ActionDefaultsConfig::default();
        actions.translate.target_language = "Portuguese".into();
        let resolver = ParameterResolver::from_config(&actions);
        let typed: TranslateParams = resolver.resolve(&ParamMap::new());
        assert_eq!(typed.target_language, "Portuguese");
    }

    #[test]
    fn translate_scenario_resolves_expected_params() {
        let resolver = ParameterResolver::builtin();
        let merged = resolver.merge("TRANSLATE", &params(json!({"targetLanguage": "French"})));
        assert_eq!(
            Value::Object(merged),
            json!({"targetLanguage": "French", "originalLanguage": "auto-detect", "tone": "neutral"})
        );
    }

    #[test]
    fn non_positive_counts_rejected() {
        let errors = ParameterResolver::validate(
            ActionKind::QuestionGeneration,
            &params(json!({"questionCount": -1})),
        );
        assert_eq!(errors, vec!["questionCount must be a positive integer"]);

        let errors = check_values(ActionKind::Summarize, &params(json!({"maxLength": "long"})));
        assert_eq!(errors, vec!["maxLength must be a positive integer"]);

        let errors = check_values(ActionKind::Summarize, &params(json!({"maxLength": 2.5})));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn null_target_language_rejected() {
        let errors = check_values(ActionKind::Translate, &params(json!({"targetLanguage": null})));
        assert_eq!(errors, vec!["targetLanguage cannot be null"]);
    }

    #[test]
    fn other_nulls_and_scalars_are_accepted() {
        assert!(check_values(ActionKind::Translate, &params(json!({"tone": null}))).is_empty());
        assert!(check_values(ActionKind::Rewrite, &params(json!({"purpose": null}))).is_empty());
        assert!(
            check_values(ActionKind::QuestionGeneration, &params(json!({"difficultyLevel": 3})))
                .is_empty()
        );

        let resolver = ParameterResolver::builtin();
        let typed: TranslateParams = resolver.resolve(&params(json!({"tone": null})));
        assert_eq!(typed.tone, "neutral");
    }

    #[test]
    fn validation_is_idempotent() {
        let user = params(json!({"foo": 1, "questionCount": 0}));
        let first = ParameterResolver::validate(ActionKind::QuestionGeneration, &user);
        let second = ParameterResolver::validate(ActionKind::QuestionGeneration, &user);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn question_lists_accept_strings_or_arrays() {
        let resolver = ParameterResolver::builtin();
        let typed: QuestionParams = resolver.resolve(&params(json!({
            "questionCount": 3,
            "questionTypes": "true_false, essay",
            "cognitiveLevel": ["analysis"]
        })));
        assert_eq!(typed.question_count, 3);
        assert_eq!(typed.question_types, vec!["true_false", "essay"]);
        assert_eq!(typed.cognitive_level, vec!["analysis"]);
        assert_eq!(typed.difficulty_level, "intermediate");
    }

    #[test]
    fn summarize_params_convert_from_defaults() {
        let typed: SummarizeParams = ParameterResolver::builtin().resolve(&ParamMap::new());
        assert_eq!(
            typed,
            SummarizeParams {
                summary_type: "PARAGRAPH".into(),
                max_length: 200,
                focus_area: "main_ideas".into(),
            }
        );
    }

    #[test]
    fn advisories_are_kind_specific() {
        assert!(!content_advisories(ActionKind::Summarize, "short").is_empty());
        assert!(content_advisories(ActionKind::Rewrite, "short").is_empty());
        assert!(content_advisories(ActionKind::Translate, "short").is_empty());
    }
}
