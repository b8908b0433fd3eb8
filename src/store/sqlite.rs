//! libsql-backed store.
//!
//! One [`SqliteBackend`] serves both collaborator traits: profile records in
//! a namespaced `kv_records` table and conversation threads in
//! `thread_messages`. Supports local SQLite files and, with the `turso`
//! feature, remote Turso databases.

use crate::store::{namespace_key, KvStore, ThreadStore};
use crate::types::{AppError, Message, MessageRole, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Builder, Connection, Database};
use uuid::Uuid;

pub struct SqliteBackend {
    db: Database,
}

impl SqliteBackend {
    /// Open or create a local SQLite database file.
    pub async fn new_local(path: &str) -> Result<Self> {
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Store(format!("Failed to open database '{}': {}", path, e)))?;

        let backend = Self { db };
        backend.initialize_schema().await?;

        Ok(backend)
    }

    /// Connect to a remote Turso database.
    #[cfg(feature = "turso")]
    pub async fn new_remote(url: String, auth_token: String) -> Result<Self> {
        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| AppError::Store(format!("Failed to connect to Turso: {}", e)))?;

        let backend = Self { db };
        backend.initialize_schema().await?;

        Ok(backend)
    }

    fn connection(&self) -> Result<Connection> {
        self.db
            .connect()
            .map_err(|e| AppError::Store(format!("Failed to get connection: {}", e)))
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection()?;

        // Namespaced key-value records (one profile snapshot per user)
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_records (
                namespace TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (namespace, key)
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Store(format!("Failed to create kv_records table: {}", e)))?;

        // Persisted conversation threads
        conn.execute(
            "CREATE TABLE IF NOT EXISTS thread_messages (
                id TEXT PRIMARY KEY,
                thread_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Store(format!("Failed to create thread_messages table: {}", e)))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_thread_messages_thread
             ON thread_messages(thread_id)",
            (),
        )
        .await
        .map_err(|e| AppError::Store(format!("Failed to create thread index: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl KvStore for SqliteBackend {
    async fn get(&self, namespace: &[&str], key: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT value FROM kv_records WHERE namespace = ? AND key = ?",
                (namespace_key(namespace), key),
            )
            .await
            .map_err(|e| AppError::Store(format!("Failed to query record: {}", e)))?;

        if let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?
        {
            let value: String = row.get(0).map_err(|e| AppError::Store(e.to_string()))?;
            let parsed = serde_json::from_str(&value)
                .map_err(|e| AppError::Store(format!("Corrupt record value: {}", e)))?;
            Ok(Some(parsed))
        } else {
            Ok(None)
        }
    }

    async fn put(&self, namespace: &[&str], key: &str, value: serde_json::Value) -> Result<()> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp();

        // INSERT OR REPLACE implements last-write-wins
        conn.execute(
            "INSERT OR REPLACE INTO kv_records (namespace, key, value, updated_at)
             VALUES (?, ?, ?, ?)",
            (namespace_key(namespace), key, value.to_string(), now),
        )
        .await
        .map_err(|e| AppError::Store(format!("Failed to write record: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl ThreadStore for SqliteBackend {
    async fn append_message(&self, thread_id: &str, message: &Message) -> Result<()> {
        let conn = self.connection()?;
        let id = Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO thread_messages (id, thread_id, role, content, created_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                id,
                thread_id,
                message.role.as_str(),
                message.content.as_str(),
                message.timestamp.timestamp(),
            ),
        )
        .await
        .map_err(|e| AppError::Store(format!("Failed to append message: {}", e)))?;

        Ok(())
    }

    async fn history(&self, thread_id: &str) -> Result<Vec<Message>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT role, content, created_at FROM thread_messages
                 WHERE thread_id = ?
                 ORDER BY created_at, rowid",
                [thread_id],
            )
            .await
            .map_err(|e| AppError::Store(format!("Failed to query messages: {}", e)))?;

        let mut messages = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?
        {
            let role_str: String = row.get(0).map_err(|e| AppError::Store(e.to_string()))?;
            let role = match role_str.as_str() {
                "system" => MessageRole::System,
                "assistant" => MessageRole::Assistant,
                _ => MessageRole::User,
            };

            messages.push(Message {
                role,
                content: row.get(1).map_err(|e| AppError::Store(e.to_string()))?,
                timestamp: DateTime::from_timestamp(
                    row.get::<i64>(2).map_err(|e| AppError::Store(e.to_string()))?,
                    0,
                )
                .unwrap_or_default(),
            });
        }

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn temp_backend() -> (tempfile::TempDir, SqliteBackend) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let backend = SqliteBackend::new_local(path.to_str().unwrap())
            .await
            .unwrap();
        (dir, backend)
    }

    #[tokio::test]
    async fn test_kv_roundtrip_and_replace() {
        let (_dir, backend) = temp_backend().await;

        assert!(backend
            .get(&["memory", "u1"], "user_memory")
            .await
            .unwrap()
            .is_none());

        backend
            .put(&["memory", "u1"], "user_memory", json!({"user_name": "Sam"}))
            .await
            .unwrap();
        backend
            .put(
                &["memory", "u1"],
                "user_memory",
                json!({"user_name": "Sam", "location": "Lima"}),
            )
            .await
            .unwrap();

        let value = backend
            .get(&["memory", "u1"], "user_memory")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value["location"], "Lima");
    }

    #[tokio::test]
    async fn test_thread_history_ordered() {
        let (_dir, backend) = temp_backend().await;

        backend
            .append_message("chat-u1", &Message::user("first"))
            .await
            .unwrap();
        backend
            .append_message("chat-u1", &Message::assistant("second"))
            .await
            .unwrap();

        let history = backend.history("chat-u1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "first");
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[1].content, "second");
        assert_eq!(history[1].role, MessageRole::Assistant);
    }
}
