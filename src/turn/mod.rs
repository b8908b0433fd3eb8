//! Turn orchestration state machine.
//!
//! One turn flows `Route → {Welcome | Converse} → [Converse only]
//! WriteMemory → End`, driven by an explicit phase loop rather than
//! framework callbacks. [`TurnProcessor::process_turn`] is the single entry
//! point of the core: it appends the incoming message to the user's
//! persisted thread, executes the selected branch, and (on the conversation
//! branch) distills the accumulated history into the user's profile before
//! returning the reply.
//!
//! Collaborators are process-wide and read-only: the model client, stores,
//! and extractor are built once at startup and injected here as shared
//! handles. No lock is held across a model or store call; concurrent turns
//! for the same user race under the store's last-write-wins semantics.

pub mod conversation;
pub mod router;
pub mod welcome;
pub mod writer;

pub use router::{decide, Branch};

use crate::extract::ProfileExtractor;
use crate::llm::LLMClient;
use crate::store::{KvStore, ThreadStore};
use crate::types::{AppError, Message, Result};
use conversation::ConversationResponder;
use std::sync::Arc;
use welcome::WelcomeResponder;
use writer::MemoryWriter;

/// Prefix for thread identifiers: the same user always resumes the same
/// thread.
pub const THREAD_PREFIX: &str = "chat-";

/// Literal fallback returned when a branch produced no assistant message.
/// Deliberate sentinel, distinguishable from a real reply by callers.
pub const NO_RESPONSE: &str = "No response";

/// Phases of one turn. `Route` is entered once; both branches converge on
/// `End`. Welcome has no edge to `WriteMemory`.
enum TurnPhase {
    Route,
    Welcome,
    Converse,
    WriteMemory,
    End,
}

/// Orchestrates one conversational turn end to end.
pub struct TurnProcessor {
    welcome: WelcomeResponder,
    conversation: ConversationResponder,
    writer: MemoryWriter,
    threads: Arc<dyn ThreadStore>,
}

impl TurnProcessor {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        memory: Arc<dyn KvStore>,
        threads: Arc<dyn ThreadStore>,
        extractor: Arc<dyn ProfileExtractor>,
    ) -> Self {
        Self {
            welcome: WelcomeResponder::new(llm.clone()),
            conversation: ConversationResponder::new(llm, memory.clone()),
            writer: MemoryWriter::new(memory, extractor),
            threads,
        }
    }

    /// Deterministic thread identifier for a user.
    pub fn thread_id(user_id: &str) -> String {
        format!("{}{}", THREAD_PREFIX, user_id)
    }

    /// Processes one turn and returns the reply text.
    ///
    /// Steps run in strict sequence within the turn: append the user
    /// message, route, respond, persist memory (conversation branch only).
    /// The memory write always observes the reply already appended to
    /// history. An extraction contract violation is logged and absorbed so
    /// the computed reply still reaches the caller; store and model
    /// failures fail the whole turn.
    pub async fn process_turn(
        &self,
        user_id: &str,
        text: &str,
        intent: Option<&str>,
    ) -> Result<String> {
        let thread_id = Self::thread_id(user_id);

        self.threads
            .append_message(&thread_id, &Message::user(text))
            .await?;
        let mut history = self.threads.history(&thread_id).await?;

        let mut reply: Option<String> = None;
        let mut phase = TurnPhase::Route;

        loop {
            phase = match phase {
                TurnPhase::Route => match router::decide(intent) {
                    Branch::Welcome => TurnPhase::Welcome,
                    Branch::Conversation => TurnPhase::Converse,
                },

                TurnPhase::Welcome => {
                    let text = self.welcome.respond().await?;
                    self.append_reply(&thread_id, &mut history, &mut reply, text)
                        .await?;
                    TurnPhase::End
                }

                TurnPhase::Converse => {
                    let text = self.conversation.respond(user_id, &history).await?;
                    self.append_reply(&thread_id, &mut history, &mut reply, text)
                        .await?;
                    TurnPhase::WriteMemory
                }

                TurnPhase::WriteMemory => {
                    match self.writer.update(user_id, &history).await {
                        Ok(()) => {}
                        Err(AppError::Extraction(msg)) => {
                            // The reply is already computed; losing one
                            // distillation pass must not fail the turn. The
                            // prior profile snapshot remains authoritative.
                            tracing::error!(
                                user_id,
                                error = %msg,
                                "profile extraction failed; keeping prior memory record"
                            );
                        }
                        Err(e) => return Err(e),
                    }
                    TurnPhase::End
                }

                TurnPhase::End => break,
            };
        }

        Ok(reply.unwrap_or_else(|| NO_RESPONSE.to_string()))
    }

    /// Appends an assistant reply to the thread and the in-flight history.
    /// Empty model output appends nothing, which leaves the turn on the
    /// degenerate sentinel path.
    async fn append_reply(
        &self,
        thread_id: &str,
        history: &mut Vec<Message>,
        reply: &mut Option<String>,
        text: String,
    ) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let message = Message::assistant(text.clone());
        self.threads.append_message(thread_id, &message).await?;
        history.push(message);
        *reply = Some(text);
        Ok(())
    }
}
