//! `eduassist sessions` / `eduassist history` — Read back stored conversations.

use eduassist_config::AppConfig;
use eduassist_core::Error;

pub async fn list(user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let orchestrator = eduassist_assistant::build(&config).await?;

    let sessions = orchestrator.active_sessions(user).await?;
    if sessions.is_empty() {
        println!("No active sessions for {user}.");
        return Ok(());
    }

    println!("Active sessions for {user}:\n");
    for session in sessions {
        let subject = session
            .context
            .as_ref()
            .and_then(|c| c.current_subject.as_deref())
            .unwrap_or("-");
        println!(
            "  {}  {}  [{}]  {}",
            session.session_id,
            session.last_activity.format("%Y-%m-%d %H:%M"),
            subject,
            session.title
        );
    }
    Ok(())
}

pub async fn history(session_id: &str, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let orchestrator = eduassist_assistant::build(&config).await?;

    let view = match orchestrator.history(session_id, user).await {
        Ok(view) => view,
        Err(Error::NotFound(_)) => return Err(format!("Session '{session_id}' not found").into()),
        Err(e) => return Err(e.into()),
    };

    println!("📖 {} ({})\n", view.title, view.session_id);
    for message in view.messages.unwrap_or_default() {
        let who = message.sender_type.prompt_label();
        let action = message
            .action_type
            .map(|a| format!(" [{a}]"))
            .unwrap_or_default();
        println!("{} {who}{action}:", message.timestamp.format("%H:%M:%S"));
        println!("{}\n", message.content);
    }
    Ok(())
}
