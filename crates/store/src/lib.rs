//! Session store implementations for EduAssist.

pub mod in_memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use eduassist_config::StoreConfig;
use eduassist_core::{SessionStore, StoreError};
use std::sync::Arc;

/// Open the backend named in `[store]`.
pub async fn open(config: &StoreConfig) -> Result<Arc<dyn SessionStore>, StoreError> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(InMemoryStore::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let path = config.database_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Storage(format!("Cannot create {}: {e}", parent.display()))
                })?;
            }
            let store = SqliteStore::new(&path.to_string_lossy()).await?;
            Ok(Arc::new(store))
        }
        other => Err(StoreError::Storage(format!("Unknown store backend '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_memory_backend() {
        let config = StoreConfig {
            backend: "memory".into(),
            path: None,
        };
        let store = open(&config).await.unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[tokio::test]
    async fn open_sqlite_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            backend: "sqlite".into(),
            path: Some(dir.path().join("nested").join("chat.db")),
        };
        let store = open(&config).await.unwrap();
        assert_eq!(store.name(), "sqlite");
        assert!(dir.path().join("nested").join("chat.db").exists());
    }

    #[tokio::test]
    async fn unknown_backend_is_rejected() {
        let config = StoreConfig {
            backend: "redis".into(),
            path: None,
        };
        assert!(open(&config).await.is_err());
    }
}
