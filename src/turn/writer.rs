//! Memory writer: post-reply profile distillation.

use crate::extract::ProfileExtractor;
use crate::memory::{load_profile, save_profile};
use crate::store::KvStore;
use crate::types::{Message, Result};
use std::sync::Arc;

/// Re-derives the user's profile from the conversation and persists it.
///
/// Read-extract-write, with no partial persistence: if extraction fails,
/// the prior record is left untouched. The existing profile (when present)
/// is handed to the extractor as a seed so the returned object is a merged
/// full replacement.
pub struct MemoryWriter {
    memory: Arc<dyn KvStore>,
    extractor: Arc<dyn ProfileExtractor>,
}

impl MemoryWriter {
    pub fn new(memory: Arc<dyn KvStore>, extractor: Arc<dyn ProfileExtractor>) -> Self {
        Self { memory, extractor }
    }

    pub async fn update(&self, user_id: &str, history: &[Message]) -> Result<()> {
        let seed = load_profile(self.memory.as_ref(), user_id).await?;

        let profile = self.extractor.extract(history, seed.as_ref()).await?;

        save_profile(self.memory.as_ref(), user_id, &profile).await?;
        tracing::debug!(user_id, "persisted updated user profile");

        Ok(())
    }
}
