//! `eduassist ask` — One request through the full chat pipeline.

use eduassist_config::AppConfig;
use eduassist_core::{ChatRequest, ParamMap};
use serde_json::Value;
use tracing::debug;

pub struct AskArgs {
    pub prompt: String,
    pub user: String,
    pub action: Option<String>,
    pub params: Vec<String>,
    pub context: Vec<String>,
    pub session: Option<String>,
}

pub async fn run(args: AskArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() && config.default_provider != "ollama" {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    EDUASSIST_API_KEY = 'sk-...'");
        eprintln!("    OPENAI_API_KEY    = 'sk-...'");
        eprintln!();
        eprintln!("  Or add it to {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let request = ChatRequest {
        prompt: args.prompt,
        session_id: args.session,
        user_id: args.user,
        action_type: args.action,
        action_params: parse_pairs(&args.params)?,
        educational_context: parse_pairs(&args.context)?,
    };

    debug!(
        action = ?request.action_type,
        params = request.action_params.len(),
        context = request.educational_context.len(),
        "Dispatching CLI request"
    );
    let orchestrator = eduassist_assistant::build(&config).await?;
    let response = orchestrator.process_chat(&request).await;

    if !response.is_success() {
        let message = response.error_message.unwrap_or_else(|| "Unknown error".into());
        eprintln!("  ❌ {message}");
        return Err(message.into());
    }

    println!("{}", response.content.unwrap_or_default());
    println!();
    println!(
        "  session: {}  model: {}  ~{} tokens",
        response.session_id.unwrap_or_default(),
        response.ai_model.unwrap_or_default(),
        response.tokens_used.unwrap_or_default()
    );
    if !response.suggested_prompts.is_empty() {
        println!("\n  Try next:");
        for prompt in &response.suggested_prompts {
            println!("   • {prompt}");
        }
    }

    Ok(())
}

/// Parse `key=value` pairs. Values that read as JSON (numbers, booleans,
/// arrays) keep their type; everything else is a string.
pub fn parse_pairs(pairs: &[String]) -> Result<ParamMap, String> {
    let mut map = ParamMap::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| format!("Expected key=value, got '{pair}'"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("Missing key in '{pair}'"));
        }
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(v @ (Value::Number(_) | Value::Bool(_) | Value::Array(_))) => v,
            _ => Value::String(raw.to_string()),
        };
        map.insert(key.to_string(), value);
    }
    Ok(map)
}
