//! `eduassist config` — Configuration management commands.

use eduassist_config::AppConfig;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();

            if !config.has_api_key() {
                warnings.push("No API key set (set EDUASSIST_API_KEY or OPENAI_API_KEY env var)");
            }

            if config.gateway.host == "0.0.0.0" {
                warnings.push("Gateway bound to 0.0.0.0; chat routes have no authentication");
            }

            if config.store.backend == "memory" {
                warnings.push("Memory store: sessions are lost on restart");
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Provider:  {}", config.default_provider);
            println!("   Standard:  {}", config.models.standard.name);
            println!("   Advanced:  {}", config.models.advanced.name);
            println!(
                "   Gateway:   {}:{}",
                config.gateway.host, config.gateway.port
            );
            println!("   Store:     {}", config.store.backend);
            if config.store.backend == "sqlite" {
                println!("   Database:  {}", config.store.database_path().display());
            }
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    println!("{}", render_redacted(&config)?);
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}

/// TOML rendering with every API key masked.
fn render_redacted(config: &AppConfig) -> Result<String, toml::ser::Error> {
    let mut redacted = config.clone();
    if redacted.api_key.is_some() {
        redacted.api_key = Some("***".into());
    }
    for provider in redacted.providers.values_mut() {
        if provider.api_key.is_some() {
            provider.api_key = Some("***".into());
        }
    }
    toml::to_string_pretty(&redacted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_is_valid() {
        let path = AppConfig::config_dir().join("config.toml");
        assert!(path.to_str().unwrap().contains("config.toml"));
    }

    #[test]
    fn show_masks_secrets() {
        let config = AppConfig {
            api_key: Some("sk-very-secret".into()),
            ..AppConfig::default()
        };
        let rendered = render_redacted(&config).unwrap();
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("***"));
    }
}
