//! Conversation branch: a memory-personalized reply over full history.

use crate::llm::LLMClient;
use crate::memory::{load_profile, render_memory};
use crate::store::KvStore;
use crate::types::{Message, Result};
use std::sync::Arc;

/// Builds the system instruction embedding the rendered memory block.
fn system_message(memory_block: &str) -> String {
    format!(
        "You are a helpful assistant with memory that provides information about the user.\n\
         If you have memory for this user, use it to personalize your responses.\n\
         Here is the memory (it may be empty): {}",
        memory_block
    )
}

/// Produces the personalized reply for a turn routed to conversation.
pub struct ConversationResponder {
    llm: Arc<dyn LLMClient>,
    memory: Arc<dyn KvStore>,
}

impl ConversationResponder {
    pub fn new(llm: Arc<dyn LLMClient>, memory: Arc<dyn KvStore>) -> Self {
        Self { llm, memory }
    }

    /// Loads the user's profile (absence is valid), renders it into the
    /// system instruction, and invokes the model over the full history.
    pub async fn respond(&self, user_id: &str, history: &[Message]) -> Result<String> {
        let profile = load_profile(self.memory.as_ref(), user_id).await?;
        let memory_block = render_memory(profile.as_ref());

        let mut messages = vec![("system".to_string(), system_message(&memory_block))];
        messages.extend(
            history
                .iter()
                .map(|m| (m.role.as_str().to_string(), m.content.clone())),
        );

        self.llm.generate_with_history(&messages).await
    }
}
