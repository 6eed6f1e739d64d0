//! SessionStore trait — durable sessions and their append-only message logs.

use async_trait::async_trait;
use crate::error::StoreError;
use crate::message::Message;
use crate::session::Session;

/// The session/message store.
///
/// Implementations: SQLite, in-memory (for testing and ephemeral deployments).
/// Appends must be atomic; session saves are last-writer-wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "memory").
    fn name(&self) -> &str;

    /// Look up a session only if it belongs to `user_id`.
    async fn find_session_by_id_and_user(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> std::result::Result<Option<Session>, StoreError>;

    /// Look up a session regardless of owner.
    async fn find_session(&self, session_id: &str) -> std::result::Result<Option<Session>, StoreError>;

    /// Insert or replace a session.
    async fn save_session(&self, session: &Session) -> std::result::Result<(), StoreError>;

    /// Active sessions owned by `user_id`, most recent activity first.
    async fn list_active_sessions(&self, user_id: &str) -> std::result::Result<Vec<Session>, StoreError>;

    /// Append a message. Fails if the owning session does not exist.
    async fn append_message(&self, message: &Message) -> std::result::Result<(), StoreError>;

    /// Number of messages in a session.
    async fn count_messages(&self, session_id: &str) -> std::result::Result<usize, StoreError>;

    /// All messages in a session, oldest first. Ties keep insertion order.
    async fn messages_in_session(&self, session_id: &str) -> std::result::Result<Vec<Message>, StoreError>;
}
