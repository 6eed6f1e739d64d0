//! Provider trait — the abstraction over text-generation backends.
//!
//! A Provider takes one finished prompt plus an optional persona and returns
//! the generated text. Which backend answers (OpenAI, Ollama, any
//! OpenAI-compatible endpoint) is a deployment decision.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;

/// A single completion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model to use (e.g., "gpt-3.5-turbo", "gpt-4")
    pub model: String,

    /// Persona / system instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// The fully assembled prompt
    pub prompt: String,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

/// The completion capability.
///
/// The pipeline calls `complete()` without knowing which backend is in use.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// Generate text for the request. Empty output is an error.
    async fn complete(&self, request: CompletionRequest) -> std::result::Result<String, ProviderError>;

    /// Health check — can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Provider for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: CompletionRequest) -> std::result::Result<String, ProviderError> {
            Ok(request.prompt)
        }
    }

    #[test]
    fn request_defaults() {
        let req: CompletionRequest =
            serde_json::from_str(r#"{"model":"gpt-4","prompt":"hi"}"#).unwrap();
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert!(req.system.is_none());
        assert!(req.max_tokens.is_none());
    }

    #[tokio::test]
    async fn default_health_check_is_ok() {
        let provider = Echo;
        assert!(provider.health_check().await.unwrap());
        let out = provider
            .complete(CompletionRequest {
                model: "m".into(),
                system: None,
                prompt: "ping".into(),
                temperature: 0.0,
                max_tokens: None,
            })
            .await
            .unwrap();
        assert_eq!(out, "ping");
    }
}
