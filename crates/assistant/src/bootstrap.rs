//! Wiring an [`Orchestrator`] from configuration.

use std::sync::Arc;

use eduassist_config::AppConfig;
use eduassist_core::{Error, Result};
use eduassist_providers::build_from_config;
use tracing::info;

use crate::orchestrator::Orchestrator;
use crate::params::ParameterResolver;
use crate::prompts::CatalogSuggester;

/// Open the store, pick the default provider and load action defaults.
pub async fn build(config: &AppConfig) -> Result<Orchestrator> {
    let store = eduassist_store::open(&config.store).await?;
    let router = build_from_config(config);
    let provider = router.default().ok_or_else(|| Error::Config {
        message: format!("provider '{}' is not available", config.default_provider),
    })?;

    info!(
        store = %store.name(),
        provider = %provider.name(),
        standard = %config.models.standard.name,
        advanced = %config.models.advanced.name,
        "Assistant ready"
    );

    Ok(Orchestrator::new(
        store,
        provider,
        ParameterResolver::from_config(&config.actions),
        config.models.clone(),
        Arc::new(CatalogSuggester::new()),
    ))
}
