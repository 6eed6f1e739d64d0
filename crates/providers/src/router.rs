//! Provider router — selects the completion backend based on config.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use eduassist_core::provider::Provider;
use crate::openai_compat::OpenAiCompatProvider;
use crate::timeout::TimeoutProvider;

/// Holds every configured backend and knows which one is the default.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    pub fn default_name(&self) -> &str {
        &self.default_provider
    }

    /// List all registered provider names.
    pub fn list(&self) -> Vec<&str> {
        self.providers.keys().map(|s| s.as_str()).collect()
    }
}

/// Build providers from configuration.
///
/// Every provider is wrapped in a [`TimeoutProvider`] using
/// `completion_timeout_secs`.
pub fn build_from_config(config: &eduassist_config::AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new(&config.default_provider);
    let timeout = Duration::from_secs(config.completion_timeout_secs);

    for (name, provider_config) in &config.providers {
        let api_key = provider_config
            .api_key
            .clone()
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();

        let base_url = provider_config
            .api_url
            .clone()
            .unwrap_or_else(|| default_base_url(name));

        router.register(name.clone(), guarded(name, &base_url, &api_key, timeout));
    }

    // Ensure the default provider exists (even if not explicitly configured)
    if router.get(&config.default_provider).is_none() {
        let api_key = config.api_key.clone().unwrap_or_default();
        let base_url = default_base_url(&config.default_provider);
        router.register(
            config.default_provider.clone(),
            guarded(&config.default_provider, &base_url, &api_key, timeout),
        );
    }

    router
}

fn guarded(name: &str, base_url: &str, api_key: &str, timeout: Duration) -> Arc<dyn Provider> {
    // The HTTP client gets a little slack so the outer guard reports the timeout.
    let http = OpenAiCompatProvider::with_timeout(name, base_url, api_key, timeout + Duration::from_secs(5));
    Arc::new(TimeoutProvider::new(Arc::new(http), timeout))
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_register_and_lookup() {
        let mut router = ProviderRouter::new("openai");
        let provider = Arc::new(OpenAiCompatProvider::openai("sk-test"));
        router.register("openai", provider);

        assert!(router.get("openai").is_some());
        assert!(router.get("nonexistent").is_none());
        assert!(router.default().is_some());
        assert_eq!(router.list(), vec!["openai"]);
    }

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("openai").contains("api.openai.com"));
        assert!(default_base_url("ollama").contains("localhost:11434"));
    }

    #[test]
    fn build_from_default_config() {
        let config = eduassist_config::AppConfig::default();
        let router = build_from_config(&config);
        let provider = router.default().unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn configured_provider_overrides_url() {
        let mut config = eduassist_config::AppConfig::default();
        config.default_provider = "school-llm".into();
        config.providers.insert(
            "school-llm".into(),
            eduassist_config::ProviderConfig {
                api_key: None,
                api_url: Some("http://10.0.0.5:8000/v1".into()),
            },
        );
        let router = build_from_config(&config);
        assert_eq!(router.default_name(), "school-llm");
        assert!(router.default().is_some());
    }
}
