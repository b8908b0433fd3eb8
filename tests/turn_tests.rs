//! End-to-end tests for the turn orchestration pipeline.
//!
//! These drive `TurnProcessor` against the in-process store with mock model
//! collaborators, covering both branches, memory persistence ordering, and
//! the failure asymmetry of the memory-write step.

mod common;

use common::mocks::{CountingKvStore, MockExtractor, MockLLMClient};
use mnemo::memory::{save_profile, PROFILE_KEY};
use mnemo::store::{KvStore, MemoryBackend, ThreadStore};
use mnemo::turn::TurnProcessor;
use mnemo::types::{AppError, MessageRole, UserProfile};
use std::sync::Arc;

struct Harness {
    processor: TurnProcessor,
    llm: MockLLMClient,
    memory: Arc<CountingKvStore>,
    threads: Arc<MemoryBackend>,
    extractor: Arc<MockExtractor>,
}

fn harness(llm: MockLLMClient, extractor: MockExtractor) -> Harness {
    let backend = Arc::new(MemoryBackend::new());
    let memory = Arc::new(CountingKvStore::new(backend.clone()));
    let extractor = Arc::new(extractor);

    let processor = TurnProcessor::new(
        Arc::new(llm.clone()),
        memory.clone(),
        backend.clone(),
        extractor.clone(),
    );

    Harness {
        processor,
        llm,
        memory,
        threads: backend,
        extractor,
    }
}

fn sam_profile() -> UserProfile {
    UserProfile {
        user_name: "Sam".to_string(),
        location: Some("Lima".to_string()),
        interests: vec!["chess".to_string()],
        ..Default::default()
    }
}

async fn stored_profile(store: &dyn KvStore, user_id: &str) -> Option<UserProfile> {
    store
        .get(&["memory", user_id], PROFILE_KEY)
        .await
        .unwrap()
        .map(|value| serde_json::from_value(value).unwrap())
}

// ===== Welcome branch =====

#[tokio::test]
async fn test_welcome_turn_never_touches_memory() {
    let h = harness(
        MockLLMClient::new("Hi there, good to see you!"),
        MockExtractor::returning(sam_profile()),
    );

    let reply = h
        .processor
        .process_turn("u1", "hi", Some("start"))
        .await
        .unwrap();

    assert_eq!(reply, "Hi there, good to see you!");
    assert_eq!(h.memory.gets(), 0);
    assert_eq!(h.memory.puts(), 0);
    assert_eq!(h.extractor.calls(), 0);
}

#[tokio::test]
async fn test_welcome_reply_is_appended_to_thread() {
    let h = harness(
        MockLLMClient::new("Welcome!"),
        MockExtractor::returning(sam_profile()),
    );

    h.processor
        .process_turn("u1", "hi", Some("start"))
        .await
        .unwrap();

    let history = h.threads.history("chat-u1").await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, MessageRole::User);
    assert_eq!(history[1].role, MessageRole::Assistant);
    assert_eq!(history[1].content, "Welcome!");
}

// ===== Conversation branch =====

#[tokio::test]
async fn test_conversation_without_memory_renders_sentinel() {
    let h = harness(
        MockLLMClient::new("Nice to meet you, Sam!"),
        MockExtractor::returning(sam_profile()),
    );

    let reply = h
        .processor
        .process_turn("u1", "I'm Sam, I live in Lima and love chess", None)
        .await
        .unwrap();

    assert_eq!(reply, "Nice to meet you, Sam!");

    let calls = h.llm.history_calls();
    assert_eq!(calls.len(), 1);
    let (role, system) = &calls[0][0];
    assert_eq!(role, "system");
    assert!(system.ends_with("Here is the memory (it may be empty): None"));
}

#[tokio::test]
async fn test_first_conversational_turn_persists_extracted_profile() {
    let h = harness(
        MockLLMClient::new("Nice to meet you, Sam!"),
        MockExtractor::returning(sam_profile()),
    );

    h.processor
        .process_turn("u1", "I'm Sam, I live in Lima and love chess", None)
        .await
        .unwrap();

    let profile = stored_profile(h.memory.as_ref(), "u1").await.unwrap();
    assert_eq!(profile.user_name, "Sam");
    assert_eq!(profile.location.as_deref(), Some("Lima"));
    assert_eq!(profile.interests, vec!["chess"]);
}

#[tokio::test]
async fn test_memory_write_runs_once_and_sees_the_reply() {
    let h = harness(
        MockLLMClient::new("Chess is a great game."),
        MockExtractor::returning(sam_profile()),
    );

    h.processor
        .process_turn("u1", "I love chess", None)
        .await
        .unwrap();

    assert_eq!(h.extractor.calls(), 1);
    let (history, seed) = h.extractor.invocations().pop().unwrap();

    // Extraction observes the assistant's latest turn, not just the user's
    let last = history.last().unwrap();
    assert_eq!(last.role, MessageRole::Assistant);
    assert_eq!(last.content, "Chess is a great game.");
    assert!(seed.is_none());
}

#[tokio::test]
async fn test_second_turn_renders_stored_profile_and_seeds_extraction() {
    let h = harness(
        MockLLMClient::new("Welcome back!"),
        MockExtractor::returning(sam_profile()),
    );
    save_profile(h.memory.as_ref(), "u1", &sam_profile())
        .await
        .unwrap();

    h.processor
        .process_turn("u1", "What should I do this weekend?", None)
        .await
        .unwrap();

    let calls = h.llm.history_calls();
    let (_, system) = &calls[0][0];
    assert!(system.contains("Name: Sam"));
    assert!(system.contains("Location: Lima"));
    assert!(system.contains("Interests: chess"));

    let (_, seed) = h.extractor.invocations().pop().unwrap();
    assert_eq!(seed, Some(sam_profile()));
}

#[tokio::test]
async fn test_sparse_profile_renders_exact_placeholders() {
    let h = harness(
        MockLLMClient::new("Hello again, Sam."),
        MockExtractor::returning(sam_profile()),
    );
    let sparse = UserProfile {
        user_name: "Sam".to_string(),
        ..Default::default()
    };
    save_profile(h.memory.as_ref(), "u1", &sparse).await.unwrap();

    h.processor.process_turn("u1", "hello", None).await.unwrap();

    let calls = h.llm.history_calls();
    let (_, system) = &calls[0][0];
    assert!(system.contains("Name: Sam\n"));
    assert!(system.contains("Age: Not provided\n"));
    assert!(system.contains("Location: Not provided\n"));
    assert!(system.contains("Interests: \n"));
    assert!(system.contains("Dislikes: \n"));
    assert!(system.contains("Notes: None"));
}

#[tokio::test]
async fn test_history_accumulates_across_turns() {
    let h = harness(
        MockLLMClient::new("Understood."),
        MockExtractor::returning(sam_profile()),
    );

    h.processor.process_turn("u1", "first", None).await.unwrap();
    h.processor.process_turn("u1", "second", None).await.unwrap();

    let calls = h.llm.history_calls();
    // Second turn: system + (user, assistant, user) from the resumed thread
    assert_eq!(calls[1].len(), 4);
    assert_eq!(calls[1][1].1, "first");
    assert_eq!(calls[1][2].1, "Understood.");
    assert_eq!(calls[1][3].1, "second");
}

// ===== Replacement and failure semantics =====

#[tokio::test]
async fn test_persisted_record_is_exact_extractor_output() {
    let p2 = UserProfile {
        user_name: "Sam".to_string(),
        age: Some("34".to_string()),
        location: Some("Lima".to_string()),
        interests: vec!["chess".to_string(), "hiking".to_string()],
        dislikes: vec!["hates mornings".to_string()],
        additional_notes: None,
    };
    let h = harness(MockLLMClient::new("Noted."), MockExtractor::returning(p2.clone()));
    save_profile(h.memory.as_ref(), "u1", &sam_profile())
        .await
        .unwrap();

    h.processor
        .process_turn("u1", "I'm 34 and also enjoy hiking. I hate mornings.", None)
        .await
        .unwrap();

    // No field-level merging outside the extractor: the record becomes
    // exactly what the extractor returned
    let stored = stored_profile(h.memory.as_ref(), "u1").await.unwrap();
    assert_eq!(stored, p2);
}

#[tokio::test]
async fn test_extraction_failure_keeps_reply_and_prior_record() {
    let h = harness(MockLLMClient::new("Happy to help."), MockExtractor::failing());
    save_profile(h.memory.as_ref(), "u1", &sam_profile())
        .await
        .unwrap();

    let reply = h.processor.process_turn("u1", "thanks!", None).await.unwrap();

    // The user still receives their answer even though distillation failed
    assert_eq!(reply, "Happy to help.");
    let stored = stored_profile(h.memory.as_ref(), "u1").await.unwrap();
    assert_eq!(stored, sam_profile());
}

#[tokio::test]
async fn test_model_failure_fails_the_turn() {
    let h = harness(MockLLMClient::failing(), MockExtractor::returning(sam_profile()));

    let err = h
        .processor
        .process_turn("u1", "hello", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::LLM(_)));

    // Nothing was persisted for the failed turn
    assert!(stored_profile(h.memory.as_ref(), "u1").await.is_none());
}

#[tokio::test]
async fn test_empty_model_output_returns_sentinel() {
    let h = harness(MockLLMClient::new(""), MockExtractor::returning(sam_profile()));

    let reply = h.processor.process_turn("u1", "hello", None).await.unwrap();
    assert_eq!(reply, "No response");

    // The degenerate reply is not appended to the thread
    let history = h.threads.history("chat-u1").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].role, MessageRole::User);
}

#[tokio::test]
async fn test_empty_welcome_output_returns_sentinel() {
    let h = harness(MockLLMClient::new(""), MockExtractor::returning(sam_profile()));

    let reply = h
        .processor
        .process_turn("u1", "hi", Some("start"))
        .await
        .unwrap();
    assert_eq!(reply, "No response");
}
