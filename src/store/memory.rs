//! In-process store backend.
//!
//! Ephemeral HashMap-backed implementation of [`KvStore`] and
//! [`ThreadStore`], suitable for development and tests. All data is lost on
//! restart.

use crate::store::{namespace_key, KvStore, ThreadStore};
use crate::types::{Message, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// HashMap-backed store guarded by async RwLocks.
///
/// The locks are held only for the duration of the map operation, never
/// across an await into other collaborators.
#[derive(Default)]
pub struct MemoryBackend {
    records: RwLock<HashMap<(String, String), serde_json::Value>>,
    threads: RwLock<HashMap<String, Vec<Message>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryBackend {
    async fn get(&self, namespace: &[&str], key: &str) -> Result<Option<serde_json::Value>> {
        let records = self.records.read().await;
        Ok(records
            .get(&(namespace_key(namespace), key.to_string()))
            .cloned())
    }

    async fn put(&self, namespace: &[&str], key: &str, value: serde_json::Value) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert((namespace_key(namespace), key.to_string()), value);
        Ok(())
    }
}

#[async_trait]
impl ThreadStore for MemoryBackend {
    async fn append_message(&self, thread_id: &str, message: &Message) -> Result<()> {
        let mut threads = self.threads.write().await;
        threads
            .entry(thread_id.to_string())
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn history(&self, thread_id: &str) -> Result<Vec<Message>> {
        let threads = self.threads.read().await;
        Ok(threads.get(thread_id).cloned().unwrap_or_default())
    }
}
