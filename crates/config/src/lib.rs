//! Configuration loading, validation, and management for EduAssist.
//!
//! Loads configuration from `~/.eduassist/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use eduassist_core::{ActionKind, ModelTier, ParamMap};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.eduassist/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Completion backend: "openai", "ollama", "openrouter", or a key of `providers`
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Upper bound for one completion call, in seconds
    #[serde(default = "default_completion_timeout")]
    pub completion_timeout_secs: u64,

    /// Model tiers
    #[serde(default)]
    pub models: ModelsConfig,

    /// Session store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Per-action default parameters
    #[serde(default)]
    pub actions: ActionDefaultsConfig,

    /// Provider-specific overrides
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_completion_timeout() -> u64 {
    60
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("completion_timeout_secs", &self.completion_timeout_secs)
            .field("models", &self.models)
            .field("store", &self.store)
            .field("gateway", &self.gateway)
            .field("actions", &self.actions)
            .field("providers", &self.providers)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// One model tier: which model to call and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// General chat, translation and summaries
    #[serde(default = "default_standard_model")]
    pub standard: ModelConfig,

    /// Question generation and rewriting
    #[serde(default = "default_advanced_model")]
    pub advanced: ModelConfig,
}

fn default_standard_model() -> ModelConfig {
    ModelConfig {
        name: "gpt-3.5-turbo".into(),
        temperature: 0.7,
        max_tokens: 1000,
    }
}
fn default_advanced_model() -> ModelConfig {
    ModelConfig {
        name: "gpt-4".into(),
        temperature: 0.3,
        max_tokens: 2000,
    }
}

impl ModelsConfig {
    pub fn for_tier(&self, tier: ModelTier) -> &ModelConfig {
        match tier {
            ModelTier::Standard => &self.standard,
            ModelTier::Advanced => &self.advanced,
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            standard: default_standard_model(),
            advanced: default_advanced_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "sqlite" or "memory"
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// SQLite database file; defaults to `~/.eduassist/eduassist.db`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_store_backend() -> String {
    "sqlite".into()
}

impl StoreConfig {
    pub fn database_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("eduassist.db"))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Allow any origin (the web client is served from a different port)
    #[serde(default = "default_true")]
    pub permissive_cors: bool,
}

fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_true() -> bool {
    true
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            permissive_cors: true,
        }
    }
}

/// Default parameters for every action, overridable per deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionDefaultsConfig {
    #[serde(default)]
    pub translate: TranslateDefaults,
    #[serde(default)]
    pub summarize: SummarizeDefaults,
    #[serde(default)]
    pub rewrite: RewriteDefaults,
    #[serde(default)]
    pub question_generation: QuestionGenerationDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateDefaults {
    #[serde(default = "default_target_language")]
    pub target_language: String,
    #[serde(default = "default_original_language")]
    pub original_language: String,
    #[serde(default = "default_translate_tone")]
    pub tone: String,
}

fn default_target_language() -> String {
    "Spanish".into()
}
fn default_original_language() -> String {
    "auto-detect".into()
}
fn default_translate_tone() -> String {
    "neutral".into()
}

impl Default for TranslateDefaults {
    fn default() -> Self {
        Self {
            target_language: default_target_language(),
            original_language: default_original_language(),
            tone: default_translate_tone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeDefaults {
    #[serde(default = "default_summary_type")]
    pub summary_type: String,
    #[serde(default = "default_max_length")]
    pub max_length: u32,
    #[serde(default = "default_focus_area")]
    pub focus_area: String,
}

fn default_summary_type() -> String {
    "PARAGRAPH".into()
}
fn default_max_length() -> u32 {
    200
}
fn default_focus_area() -> String {
    "main_ideas".into()
}

impl Default for SummarizeDefaults {
    fn default() -> Self {
        Self {
            summary_type: default_summary_type(),
            max_length: default_max_length(),
            focus_area: default_focus_area(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteDefaults {
    #[serde(default = "default_target_audience")]
    pub target_audience: String,
    #[serde(default = "default_rewrite_tone")]
    pub tone: String,
    #[serde(default = "default_purpose")]
    pub purpose: String,
}

fn default_target_audience() -> String {
    "general".into()
}
fn default_rewrite_tone() -> String {
    "professional".into()
}
fn default_purpose() -> String {
    "educational".into()
}

impl Default for RewriteDefaults {
    fn default() -> Self {
        Self {
            target_audience: default_target_audience(),
            tone: default_rewrite_tone(),
            purpose: default_purpose(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionGenerationDefaults {
    #[serde(default = "default_question_count")]
    pub question_count: u32,
    #[serde(default = "default_difficulty_level")]
    pub difficulty_level: String,
    #[serde(default = "default_question_types")]
    pub question_types: Vec<String>,
    #[serde(default = "default_cognitive_level")]
    pub cognitive_level: Vec<String>,
}

fn default_question_count() -> u32 {
    5
}
fn default_difficulty_level() -> String {
    "intermediate".into()
}
fn default_question_types() -> Vec<String> {
    vec!["multiple_choice".into(), "short_answer".into()]
}
fn default_cognitive_level() -> Vec<String> {
    vec!["knowledge".into(), "comprehension".into(), "application".into()]
}

impl Default for QuestionGenerationDefaults {
    fn default() -> Self {
        Self {
            question_count: default_question_count(),
            difficulty_level: default_difficulty_level(),
            question_types: default_question_types(),
            cognitive_level: default_cognitive_level(),
        }
    }
}

impl ActionDefaultsConfig {
    /// Default parameters for `kind`, keyed by wire (camelCase) parameter names.
    pub fn defaults_for(&self, kind: ActionKind) -> ParamMap {
        let value = match kind {
            ActionKind::Translate => json!({
                "targetLanguage": self.translate.target_language,
                "originalLanguage": self.translate.original_language,
                "tone": self.translate.tone,
            }),
            ActionKind::Summarize => json!({
                "summaryType": self.summarize.summary_type,
                "maxLength": self.summarize.max_length,
                "focusArea": self.summarize.focus_area,
            }),
            ActionKind::Rewrite => json!({
                "targetAudience": self.rewrite.target_audience,
                "tone": self.rewrite.tone,
                "purpose": self.rewrite.purpose,
            }),
            ActionKind::QuestionGeneration => json!({
                "questionCount": self.question_generation.question_count,
                "difficultyLevel": self.question_generation.difficulty_level,
                "questionTypes": self.question_generation.question_types,
                "cognitiveLevel": self.question_generation.cognitive_level,
            }),
        };
        match value {
            serde_json::Value::Object(map) => map,
            _ => kind.default_params(),
        }
    }

    /// Defaults for every action kind.
    pub fn all(&self) -> HashMap<ActionKind, ParamMap> {
        ActionKind::ALL
            .into_iter()
            .map(|kind| (kind, self.defaults_for(kind)))
            .collect()
    }
}

impl AppConfig {
    /// Load configuration from the default location (`~/.eduassist/config.toml`).
    ///
    /// Also checks environment variables:
    /// - `EDUASSIST_API_KEY` (highest priority), then `OPENAI_API_KEY`
    /// - `EDUASSIST_PROVIDER`
    /// - `EDUASSIST_STANDARD_MODEL`, `EDUASSIST_ADVANCED_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("EDUASSIST_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(provider) = std::env::var("EDUASSIST_PROVIDER") {
            config.default_provider = provider;
        }
        if let Ok(model) = std::env::var("EDUASSIST_STANDARD_MODEL") {
            config.models.standard.name = model;
        }
        if let Ok(model) = std::env::var("EDUASSIST_ADVANCED_MODEL") {
            config.models.advanced.name = model;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".eduassist")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (tier, model) in [("standard", &self.models.standard), ("advanced", &self.models.advanced)] {
            if model.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "models.{tier}.name must not be empty"
                )));
            }
            if model.temperature < 0.0 || model.temperature > 2.0 {
                return Err(ConfigError::ValidationError(format!(
                    "models.{tier}.temperature must be between 0.0 and 2.0"
                )));
            }
            if model.max_tokens == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "models.{tier}.max_tokens must be > 0"
                )));
            }
        }

        if self.completion_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "completion_timeout_secs must be > 0".into(),
            ));
        }

        if self.actions.summarize.max_length == 0 {
            return Err(ConfigError::ValidationError(
                "actions.summarize.max_length must be > 0".into(),
            ));
        }

        if self.actions.question_generation.question_count == 0 {
            return Err(ConfigError::ValidationError(
                "actions.question_generation.question_count must be > 0".into(),
            ));
        }

        if !matches!(self.store.backend.as_str(), "sqlite" | "memory") {
            return Err(ConfigError::ValidationError(format!(
                "unknown store backend '{}' (expected sqlite or memory)",
                self.store.backend
            )));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            completion_timeout_secs: default_completion_timeout(),
            models: ModelsConfig::default(),
            store: StoreConfig::default(),
            gateway: GatewayConfig::default(),
            actions: ActionDefaultsConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.models.standard.name, "gpt-3.5-turbo");
        assert_eq!(config.models.advanced.name, "gpt-4");
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(
            parsed.actions.question_generation.question_types,
            config.actions.question_generation.question_types
        );
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.models.advanced.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_question_count_rejected() {
        let mut config = AppConfig::default();
        config.actions.question_generation.question_count = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("question_count"));
    }

    #[test]
    fn unknown_store_backend_rejected() {
        let mut config = AppConfig::default();
        config.store.backend = "postgres".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.default_provider, "openai");
    }

    #[test]
    fn partial_action_table_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[actions.translate]
target_language = "French"

[actions.summarize]
max_length = 120
"#
        )
        .unwrap();
        let config = AppConfig::load_from(file.path()).unwrap();
        let translate = config.actions.defaults_for(ActionKind::Translate);
        assert_eq!(translate["targetLanguage"], "French");
        assert_eq!(translate["tone"], "neutral");
        let summarize = config.actions.defaults_for(ActionKind::Summarize);
        assert_eq!(summarize["maxLength"], 120);
        assert_eq!(summarize["summaryType"], "PARAGRAPH");
    }

    #[test]
    fn configured_defaults_match_builtin_defaults() {
        let actions = ActionDefaultsConfig::default();
        for kind in ActionKind::ALL {
            assert_eq!(actions.defaults_for(kind), kind.default_params(), "{kind}");
        }
        assert_eq!(actions.all().len(), 4);
    }

    #[test]
    fn unparsable_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_provider = [").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-3.5-turbo"));
        assert!(toml_str.contains("question_generation"));
    }
}
