//! In-memory store — useful for testing and ephemeral deployments.

use async_trait::async_trait;
use eduassist_core::error::StoreError;
use eduassist_core::{Message, Session, SessionStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Sessions keyed by id, messages in one append-only log.
pub struct InMemoryStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    messages: Arc<RwLock<Vec<Message>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            messages: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn find_session_by_id_and_user(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> Result<Option<Session>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session_id)
            .filter(|s| s.user_id == user_id)
            .cloned())
    }

    async fn find_session(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn list_active_sessions(&self, user_id: &str) -> Result<Vec<Session>, StoreError> {
        let sessions = self.sessions.read().await;
        let mut active: Vec<Session> = sessions
            .values()
            .filter(|s| s.user_id == user_id && s.active)
            .cloned()
            .collect();
        active.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        Ok(active)
    }

    async fn append_message(&self, message: &Message) -> Result<(), StoreError> {
        // Hold the session lock across the push so a concurrent save cannot interleave.
        let sessions = self.sessions.read().await;
        if !sessions.contains_key(&message.session_id) {
            return Err(StoreError::MissingSession(message.session_id.clone()));
        }
        self.messages.write().await.push(message.clone());
        Ok(())
    }

    async fn count_messages(&self, session_id: &str) -> Result<usize, StoreError> {
        let messages = self.messages.read().await;
        Ok(messages.iter().filter(|m| m.session_id == session_id).count())
    }

    async fn messages_in_session(&self, session_id: &str) -> Result<Vec<Message>, StoreError> {
        let messages = self.messages.read().await;
        let mut found: Vec<Message> = messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect();
        // Stable sort keeps insertion order on equal timestamps.
        found.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn save_and_find_by_owner() {
        let store = InMemoryStore::new();
        let session = Session::new("teacher-1", "Fractions", "English");
        store.save_session(&session).await.unwrap();

        let found = store
            .find_session_by_id_and_user(&session.id, "teacher-1")
            .await
            .unwrap();
        assert_eq!(found, Some(session.clone()));

        let foreign = store
            .find_session_by_id_and_user(&session.id, "teacher-2")
            .await
            .unwrap();
        assert!(foreign.is_none());
        assert!(store.find_session(&session.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn append_requires_session() {
        let store = InMemoryStore::new();
        let msg = Message::user("session_missing", "hello", None, None);
        let err = store.append_message(&msg).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingSession(_)));
    }

    #[tokio::test]
    async fn messages_are_ordered_by_time() {
        let store = InMemoryStore::new();
        let session = Session::new("t", "x", "English");
        store.save_session(&session).await.unwrap();

        let mut late = Message::user(&session.id, "second", None, None);
        late.timestamp = Utc::now() + Duration::seconds(5);
        let early = Message::user(&session.id, "first", None, None);
        store.append_message(&late).await.unwrap();
        store.append_message(&early).await.unwrap();

        let messages = store.messages_in_session(&session.id).await.unwrap();
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[1].content, "second");
        assert_eq!(store.count_messages(&session.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn equal_timestamps_keep_insertion_order() {
        let store = InMemoryStore::new();
        let session = Session::new("t", "x", "English");
        store.save_session(&session).await.unwrap();

        let now = Utc::now();
        for content in ["a", "b", "c"] {
            let mut msg = Message::user(&session.id, content, None, None);
            msg.timestamp = now;
            store.append_message(&msg).await.unwrap();
        }
        let contents: Vec<String> = store
            .messages_in_session(&session.id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn active_sessions_newest_first() {
        let store = InMemoryStore::new();
        let mut old = Session::new("t", "old", "English");
        old.last_activity = Utc::now() - Duration::hours(1);
        let recent = Session::new("t", "recent", "English");
        let mut closed = Session::new("t", "closed", "English");
        closed.active = false;
        let other = Session::new("someone-else", "other", "English");
        for s in [&old, &recent, &closed, &other] {
            store.save_session(s).await.unwrap();
        }

        let listed = store.list_active_sessions("t").await.unwrap();
        let titles: Vec<&str> = listed.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["recent", "old"]);
    }
}
