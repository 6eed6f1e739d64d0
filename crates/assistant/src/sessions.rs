//! Session resolution, activity tracking and history lookups.

use std::sync::Arc;

use chrono::Utc;
use eduassist_core::{
    ChatRequest, Error, Message, Result, Session, SessionStore, SessionView,
};
use tracing::{debug, info};

const DEFAULT_LANGUAGE: &str = "English";

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// The caller's session if the (id, user) pair matches, otherwise a new one.
    pub async fn resolve(&self, request: &ChatRequest) -> Result<Session> {
        if let Some(session_id) = request.session_id.as_deref().filter(|s| !s.is_empty()) {
            if let Some(session) = self
                .store
                .find_session_by_id_and_user(session_id, &request.user_id)
                .await?
            {
                debug!(session_id, "Resumed existing session");
                return Ok(session);
            }
        }

        let session = Session::new(&request.user_id, &request.prompt, preferred_language(request));
        self.store.save_session(&session).await?;
        info!(
            session_id = %session.id,
            user_id = %request.user_id,
            title = %session.title,
            "Created new chat session"
        );
        Ok(session)
    }

    /// Stamp activity and overlay subject / grade level from the request.
    pub async fn record_activity(&self, session: &mut Session, request: &ChatRequest) -> Result<()> {
        session.last_activity = Utc::now();
        session.last_action_type = request.action_type().map(String::from);
        if let Some(subject) = request.context_value("subject") {
            session.current_subject = Some(subject);
        }
        if let Some(level) = request.context_value("gradeLevel") {
            session.education_level = Some(level);
        }
        self.store.save_session(session).await?;
        Ok(())
    }

    pub async fn append(&self, message: &Message) -> Result<()> {
        self.store.append_message(message).await?;
        Ok(())
    }

    /// Full history of a session owned by `user_id`.
    ///
    /// A session owned by someone else is reported exactly like a missing one.
    pub async fn history(&self, session_id: &str, user_id: &str) -> Result<SessionView> {
        let session = self
            .store
            .find_session_by_id_and_user(session_id, user_id)
            .await?
            .ok_or_else(|| Error::NotFound(session_id.to_string()))?;
        let messages = self.store.messages_in_session(session_id).await?;
        Ok(SessionView::with_messages(session, messages))
    }

    /// Active sessions of a user, most recently used first.
    pub async fn active_sessions(&self, user_id: &str) -> Result<Vec<SessionView>> {
        let sessions = self.store.list_active_sessions(user_id).await?;
        Ok(sessions.into_iter().map(SessionView::summary).collect())
    }

    /// Hide a session from listings. Messages are kept.
    pub async fn deactivate(&self, session_id: &str, user_id: &str) -> Result<()> {
        let mut session = self
            .store
            .find_session_by_id_and_user(session_id, user_id)
            .await?
            .ok_or_else(|| Error::NotFound(session_id.to_string()))?;
        session.active = false;
        self.store.save_session(&session).await?;
        info!(session_id, "Deactivated chat session");
        Ok(())
    }
}

/// `actionParams.targetLanguage`, else `educationalContext.language`, else English.
fn preferred_language(request: &ChatRequest) -> String {
    request
        .action_params
        .get("targetLanguage")
        .and_then(|v| v.as_str())
        .or_else(|| request.educational_context.get("language").and_then(|v| v.as_str()))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_LANGUAGE)
        .to_string()
}
