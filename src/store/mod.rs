//! Persistence abstraction for long-term memory and conversation threads
//!
//! Two collaborator traits back the turn pipeline:
//!
//! - [`KvStore`] - namespaced get/put over an opaque key-value backend; the
//!   memory module stores one `UserProfile` record per user under
//!   `(["memory", user_id], "user_memory")`.
//! - [`ThreadStore`] - append-only persisted message history keyed by a
//!   thread identifier.
//!
//! Both are last-write-wins: no versioning, no compare-and-swap. Concurrent
//! turns for the same user may race on the memory record; the store keeps
//! whichever write lands last.
//!
//! # Example
//!
//! ```rust,ignore
//! use mnemo::store::StoreProvider;
//!
//! // In-process store (default for development/testing)
//! let (kv, threads) = StoreProvider::Memory.create_store().await?;
//!
//! // File-based SQLite via libsql
//! let (kv, threads) = StoreProvider::SQLite { path: "data.db".into() }.create_store().await?;
//! ```

use crate::types::{Message, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// In-process HashMap-backed store.
pub mod memory;
/// libsql-backed store (local SQLite files, remote Turso).
pub mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

/// Namespaced key-value storage for durable records
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a record; `None` means the record has never been written
    async fn get(&self, namespace: &[&str], key: &str) -> Result<Option<serde_json::Value>>;

    /// Write a record, replacing any prior value (last-write-wins)
    async fn put(&self, namespace: &[&str], key: &str, value: serde_json::Value) -> Result<()>;
}

/// Persisted, ordered conversation history keyed by thread id
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Append one message to the end of the thread
    async fn append_message(&self, thread_id: &str, message: &Message) -> Result<()>;

    /// Full history of the thread, oldest first; empty for unknown threads
    async fn history(&self, thread_id: &str) -> Result<Vec<Message>>;
}

/// Store provider configuration
#[derive(Debug, Clone, Default)]
pub enum StoreProvider {
    /// In-process store (ephemeral, lost on restart)
    #[default]
    Memory,
    /// File-based SQLite database
    SQLite {
        /// Path to the SQLite database file
        path: String,
    },
    /// Remote Turso database (requires network access)
    #[cfg(feature = "turso")]
    Turso {
        /// The Turso database URL (e.g., `libsql://your-db.turso.io`)
        url: String,
        /// Authentication token for the Turso database
        auth_token: String,
    },
}

impl StoreProvider {
    /// Create the memory and thread stores from this provider configuration.
    ///
    /// Both handles point at the same backend so a single connection pool
    /// serves profile records and thread history.
    pub async fn create_store(&self) -> Result<(Arc<dyn KvStore>, Arc<dyn ThreadStore>)> {
        match self {
            StoreProvider::Memory => {
                let backend = Arc::new(MemoryBackend::new());
                Ok((backend.clone(), backend))
            }
            StoreProvider::SQLite { path } => {
                let backend = Arc::new(SqliteBackend::new_local(path).await?);
                Ok((backend.clone(), backend))
            }
            #[cfg(feature = "turso")]
            StoreProvider::Turso { url, auth_token } => {
                let backend =
                    Arc::new(SqliteBackend::new_remote(url.clone(), auth_token.clone()).await?);
                Ok((backend.clone(), backend))
            }
        }
    }

    /// Create from environment variables or use defaults
    pub fn from_env() -> Self {
        #[cfg(feature = "turso")]
        {
            if let (Ok(url), Ok(token)) = (
                std::env::var("TURSO_DATABASE_URL"),
                std::env::var("TURSO_AUTH_TOKEN"),
            ) {
                if !url.is_empty() && !token.is_empty() {
                    return StoreProvider::Turso {
                        url,
                        auth_token: token,
                    };
                }
            }
        }

        if let Ok(path) = std::env::var("DATABASE_PATH") {
            if !path.is_empty() && path != ":memory:" {
                return StoreProvider::SQLite { path };
            }
        }

        StoreProvider::Memory
    }

    /// Human-readable backend name, safe to log.
    pub fn name(&self) -> &'static str {
        match self {
            StoreProvider::Memory => "memory",
            StoreProvider::SQLite { .. } => "sqlite",
            #[cfg(feature = "turso")]
            StoreProvider::Turso { .. } => "turso",
        }
    }
}

/// Joins namespace components into the single storage key dimension.
///
/// Components never contain `/` in practice (they are fixed literals plus a
/// user id), so the join is unambiguous for our keys.
pub(crate) fn namespace_key(namespace: &[&str]) -> String {
    namespace.join("/")
}
