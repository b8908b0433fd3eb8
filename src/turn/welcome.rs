//! Welcome branch: a short greeting with no memory access.

use crate::llm::LLMClient;
use crate::types::Result;
use std::sync::Arc;

const WELCOME_SYSTEM_MESSAGE: &str = "\
You are a conversational assistant.
Generate a short, friendly welcome message.
Do not list memory.
Do not explain capabilities unless asked.
One or two sentences only.";

/// Produces the greeting for a turn routed to the welcome branch.
///
/// Never reads or writes the memory store. A model failure propagates; the
/// responder does not fabricate a greeting.
pub struct WelcomeResponder {
    llm: Arc<dyn LLMClient>,
}

impl WelcomeResponder {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    /// One model call with only the fixed system instruction.
    pub async fn respond(&self) -> Result<String> {
        self.llm
            .generate_with_history(&[(
                "system".to_string(),
                WELCOME_SYSTEM_MESSAGE.to_string(),
            )])
            .await
    }
}
