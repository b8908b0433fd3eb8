//! Mock implementations for testing.
//!
//! This module provides mock LLM clients, extractors, and store wrappers
//! that can be used across different test files without duplication.

use async_trait::async_trait;
use mnemo::extract::ProfileExtractor;
use mnemo::llm::{LLMClient, StructuredResponse};
use mnemo::store::KvStore;
use mnemo::types::{AppError, Message, Result, ToolDefinition, UserProfile};
use std::sync::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Mock LLM client for testing with a configurable response.
///
/// # Examples
///
/// ```ignore
/// // A client that always replies with the same text
/// let client = MockLLMClient::new("Hello, world!");
///
/// // A client that simulates provider failure
/// let client = MockLLMClient::failing();
/// ```
#[derive(Clone)]
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
    history_calls: Arc<Mutex<Vec<Vec<(String, String)>>>>,
}

impl MockLLMClient {
    /// Create a new mock client that returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
            history_calls: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            response: String::new(),
            should_fail: true,
            history_calls: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Message lists from every `generate_with_history` invocation.
    pub fn history_calls(&self) -> Vec<Vec<(String, String)>> {
        self.history_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate_with_system(&self, _system: &str, _prompt: &str) -> Result<String> {
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }

    async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String> {
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        self.history_calls.lock().unwrap().push(messages.to_vec());
        Ok(self.response.clone())
    }

    async fn generate_structured(
        &self,
        _messages: &[(String, String)],
        _schema: &ToolDefinition,
    ) -> Result<StructuredResponse> {
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(StructuredResponse {
            content: self.response.clone(),
            tool_calls: vec![],
            finish_reason: "stop".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Mock extractor returning a scripted profile.
///
/// Records every history it is given so tests can assert what the
/// extraction step observed, and counts invocations.
pub struct MockExtractor {
    profile: Option<UserProfile>,
    seen: Mutex<Vec<(Vec<Message>, Option<UserProfile>)>>,
}

impl MockExtractor {
    /// Extractor that always returns the given profile.
    pub fn returning(profile: UserProfile) -> Self {
        Self {
            profile: Some(profile),
            seen: Mutex::new(vec![]),
        }
    }

    /// Extractor that always reports a contract violation.
    pub fn failing() -> Self {
        Self {
            profile: None,
            seen: Mutex::new(vec![]),
        }
    }

    /// Number of extraction invocations so far.
    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// History and seed from each invocation.
    pub fn invocations(&self) -> Vec<(Vec<Message>, Option<UserProfile>)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileExtractor for MockExtractor {
    async fn extract(
        &self,
        history: &[Message],
        seed: Option<&UserProfile>,
    ) -> Result<UserProfile> {
        self.seen
            .lock()
            .unwrap()
            .push((history.to_vec(), seed.cloned()));
        match &self.profile {
            Some(profile) => Ok(profile.clone()),
            None => Err(AppError::Extraction(
                "Mock extraction contract violation".to_string(),
            )),
        }
    }
}

/// KvStore wrapper that counts reads and writes.
///
/// Used to assert that the welcome branch never touches the memory store.
pub struct CountingKvStore {
    inner: Arc<dyn KvStore>,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl CountingKvStore {
    pub fn new(inner: Arc<dyn KvStore>) -> Self {
        Self {
            inner,
            gets: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
        }
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KvStore for CountingKvStore {
    async fn get(&self, namespace: &[&str], key: &str) -> Result<Option<serde_json::Value>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(namespace, key).await
    }

    async fn put(&self, namespace: &[&str], key: &str, value: serde_json::Value) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(namespace, key, value).await
    }
}
