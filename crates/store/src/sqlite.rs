//! SQLite session store.
//!
//! Two tables:
//! - `sessions`: one row per conversation, upserted on every turn
//! - `messages`: append-only log, cascaded away with its session
//!
//! Timestamps are stored as fixed-width RFC 3339 text so lexical order is
//! chronological; `iid` breaks ties in insertion order.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use eduassist_core::error::StoreError;
use eduassist_core::{Message, Sender, Session, SessionStore};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

/// A SQLite-backed [`SessionStore`].
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) a database file and run migrations.
    ///
    /// Pass `"sqlite::memory:"` for an in-process ephemeral database (useful for tests).
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        // Every connection to ":memory:" is its own database.
        let max_connections = if path.contains(":memory:") { 1 } else { 4 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite session store initialized at {path}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id                 TEXT PRIMARY KEY NOT NULL,
                user_id            TEXT NOT NULL,
                title              TEXT NOT NULL,
                created_at         TEXT NOT NULL,
                last_activity      TEXT NOT NULL,
                active             INTEGER NOT NULL DEFAULT 1,
                current_subject    TEXT,
                preferred_language TEXT,
                education_level    TEXT,
                last_action_type   TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("sessions table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                iid             INTEGER PRIMARY KEY AUTOINCREMENT,
                id              TEXT UNIQUE NOT NULL,
                session_id      TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                content         TEXT NOT NULL,
                sender          TEXT NOT NULL,
                timestamp       TEXT NOT NULL,
                action_type     TEXT,
                action_metadata TEXT,
                ai_model        TEXT,
                tokens_used     INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("messages table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_sessions_user_activity ON sessions(user_id, active, last_activity DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("sessions index: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_session_time ON messages(session_id, timestamp, iid)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("messages index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Result<Session, StoreError> {
        let get_text = |col: &str| -> Result<String, StoreError> {
            row.try_get(col)
                .map_err(|e| StoreError::QueryFailed(format!("{col} column: {e}")))
        };
        let get_opt = |col: &str| -> Result<Option<String>, StoreError> {
            row.try_get(col)
                .map_err(|e| StoreError::QueryFailed(format!("{col} column: {e}")))
        };
        let active: i64 = row
            .try_get("active")
            .map_err(|e| StoreError::QueryFailed(format!("active column: {e}")))?;

        Ok(Session {
            id: get_text("id")?,
            user_id: get_text("user_id")?,
            title: get_text("title")?,
            created_at: parse_time(&get_text("created_at")?)?,
            last_activity: parse_time(&get_text("last_activity")?)?,
            active: active != 0,
            current_subject: get_opt("current_subject")?,
            preferred_language: get_opt("preferred_language")?,
            education_level: get_opt("education_level")?,
            last_action_type: get_opt("last_action_type")?,
        })
    }

    fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> Result<Message, StoreError> {
        let get_text = |col: &str| -> Result<String, StoreError> {
            row.try_get(col)
                .map_err(|e| StoreError::QueryFailed(format!("{col} column: {e}")))
        };
        let get_opt = |col: &str| -> Result<Option<String>, StoreError> {
            row.try_get(col)
                .map_err(|e| StoreError::QueryFailed(format!("{col} column: {e}")))
        };
        let tokens_used: Option<i64> = row
            .try_get("tokens_used")
            .map_err(|e| StoreError::QueryFailed(format!("tokens_used column: {e}")))?;

        Ok(Message {
            id: get_text("id")?,
            session_id: get_text("session_id")?,
            content: get_text("content")?,
            sender: parse_sender(&get_text("sender")?)?,
            timestamp: parse_time(&get_text("timestamp")?)?,
            action_type: get_opt("action_type")?,
            action_metadata: get_opt("action_metadata")?,
            ai_model: get_opt("ai_model")?,
            tokens_used: tokens_used.and_then(|t| u32::try_from(t).ok()),
        })
    }
}

fn format_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::QueryFailed(format!("Bad timestamp '{s}': {e}")))
}

fn parse_sender(s: &str) -> Result<Sender, StoreError> {
    Sender::from_stored(s).ok_or_else(|| StoreError::QueryFailed(format!("Unknown sender '{s}'")))
}

#[async_trait]
impl SessionStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn find_session_by_id_and_user(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> Result<Option<Session>, StoreError> {
        let row = sqlx::query("SELECT * FROM sessions WHERE id = ? AND user_id = ?")
            .bind(session_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("find session: {e}")))?;
        row.as_ref().map(Self::row_to_session).transpose()
    }

    async fn find_session(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        let row = sqlx::query("SELECT * FROM sessions WHERE id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("find session: {e}")))?;
        row.as_ref().map(Self::row_to_session).transpose()
    }

    async fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, title, created_at, last_activity, active,
                                  current_subject, preferred_language, education_level, last_action_type)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                title = excluded.title,
                last_activity = excluded.last_activity,
                active = excluded.active,
                current_subject = excluded.current_subject,
                preferred_language = excluded.preferred_language,
                education_level = excluded.education_level,
                last_action_type = excluded.last_action_type
            "#,
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(&session.title)
        .bind(format_time(&session.created_at))
        .bind(format_time(&session.last_activity))
        .bind(i64::from(session.active))
        .bind(&session.current_subject)
        .bind(&session.preferred_language)
        .bind(&session.education_level)
        .bind(&session.last_action_type)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("save session: {e}")))?;
        Ok(())
    }

    async fn list_active_sessions(&self, user_id: &str) -> Result<Vec<Session>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM sessions WHERE user_id = ? AND active = 1 ORDER BY last_activity DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("list sessions: {e}")))?;
        rows.iter().map(Self::row_to_session).collect()
    }

    async fn append_message(&self, message: &Message) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO messages (id, session_id, content, sender, timestamp,
                                  action_type, action_metadata, ai_model, tokens_used)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&message.id)
        .bind(&message.session_id)
        .bind(&message.content)
        .bind(message.sender.as_str())
        .bind(format_time(&message.timestamp))
        .bind(&message.action_type)
        .bind(&message.action_metadata)
        .bind(&message.ai_model)
        .bind(message.tokens_used.map(i64::from))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                Err(StoreError::MissingSession(message.session_id.clone()))
            }
            Err(e) => Err(StoreError::Storage(format!("append message: {e}"))),
        }
    }

    async fn count_messages(&self, session_id: &str) -> Result<usize, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM messages WHERE session_id = ?")
            .bind(session_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("count messages: {e}")))?;
        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| StoreError::QueryFailed(format!("cnt column: {e}")))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    async fn messages_in_session(&self, session_id: &str) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM messages WHERE session_id = ? ORDER BY timestamp ASC, iid ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("load messages: {e}")))?;
        rows.iter().map(Self::row_to_message).collect()
    }
}
