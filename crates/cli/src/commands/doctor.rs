//! `eduassist doctor` — Diagnose system health.

use eduassist_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 EduAssist Doctor — System Diagnostics");
    println!("=======================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file — using defaults (run `eduassist onboard`)");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Cannot continue without a valid config.");
            return Ok(());
        }
    };

    if config.has_api_key() || config.providers.values().any(|p| p.api_key.is_some()) {
        println!("  ✅ API key configured");
    } else {
        println!("  ⚠️  No API key configured — add api_key to config.toml");
        issues += 1;
    }

    match eduassist_assistant::build(&config).await {
        Ok(orchestrator) => {
            println!("  ✅ Store '{}' opened", config.store.backend);
            if orchestrator.provider_healthy().await {
                println!("  ✅ Provider '{}' reachable", orchestrator.provider_name());
            } else {
                println!("  ❌ Provider '{}' not reachable", orchestrator.provider_name());
                issues += 1;
            }
        }
        Err(e) => {
            println!("  ❌ Could not start the assistant: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
