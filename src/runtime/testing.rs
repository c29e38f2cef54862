//! Mock implementations for testing
//!
//! These mocks enable controller testing without real I/O.

use super::traits::SessionStore;
use crate::service::{AnswerService, ChatReply, ServiceError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::{watch, Notify};

// ============================================================================
// Mock Answer Client
// ============================================================================

/// Mock answering service with per-query and queued replies
#[allow(dead_code)]
pub struct MockAnswerClient {
    by_query: Mutex<HashMap<String, Result<ChatReply, ServiceError>>>,
    queued: Mutex<VecDeque<Result<ChatReply, ServiceError>>>,
    /// Record of every query asked
    pub queries: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockAnswerClient {
    pub fn new() -> Self {
        Self {
            by_query: Mutex::new(HashMap::new()),
            queued: Mutex::new(VecDeque::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Always answer `query` with `reply`
    #[must_use]
    pub fn with_reply(self, query: impl Into<String>, reply: Result<ChatReply, ServiceError>) -> Self {
        self.by_query.lock().unwrap().insert(query.into(), reply);
        self
    }

    /// Queue a reply for the next query without a fixed answer
    pub fn queue_reply(&self, reply: Result<ChatReply, ServiceError>) {
        self.queued.lock().unwrap().push_back(reply);
    }

    pub fn recorded_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Default for MockAnswerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnswerService for MockAnswerClient {
    async fn ask(&self, query: &str) -> Result<ChatReply, ServiceError> {
        self.queries.lock().unwrap().push(query.to_string());
        if let Some(reply) = self.by_query.lock().unwrap().get(query) {
            return reply.clone();
        }
        self.queued
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::network("No mock reply queued")))
    }

    fn endpoint(&self) -> &str {
        "mock://chat/"
    }
}

// ============================================================================
// Delayed Mock Answer Client (for in-flight testing)
// ============================================================================

/// Opens a [`DelayedMockAnswerClient`] so held requests complete
#[derive(Clone)]
pub struct ReplyGate {
    tx: Arc<watch::Sender<bool>>,
}

impl ReplyGate {
    pub fn release(&self) {
        self.tx.send_replace(true);
    }
}

/// Answering service that holds every request until its gate is released
pub struct DelayedMockAnswerClient {
    default_reply: ChatReply,
    by_query: HashMap<String, ChatReply>,
    gate_tx: Arc<watch::Sender<bool>>,
    gate_rx: watch::Receiver<bool>,
    /// Notified when a request reaches the service
    pub request_started: Arc<Notify>,
}

impl DelayedMockAnswerClient {
    pub fn new(default_reply: ChatReply) -> Self {
        let (gate_tx, gate_rx) = watch::channel(false);
        Self {
            default_reply,
            by_query: HashMap::new(),
            gate_tx: Arc::new(gate_tx),
            gate_rx,
            request_started: Arc::new(Notify::new()),
        }
    }

    #[must_use]
    pub fn with_reply(mut self, query: impl Into<String>, reply: ChatReply) -> Self {
        self.by_query.insert(query.into(), reply);
        self
    }

    pub fn gate(&self) -> ReplyGate {
        ReplyGate {
            tx: self.gate_tx.clone(),
        }
    }
}

#[async_trait]
impl AnswerService for DelayedMockAnswerClient {
    async fn ask(&self, query: &str) -> Result<ChatReply, ServiceError> {
        self.request_started.notify_one();

        let mut gate = self.gate_rx.clone();
        gate.wait_for(|open| *open)
            .await
            .map_err(|_| ServiceError::network("Gate dropped"))?;

        Ok(self
            .by_query
            .get(query)
            .cloned()
            .unwrap_or_else(|| self.default_reply.clone()))
    }

    fn endpoint(&self) -> &str {
        "mock://delayed/chat/"
    }
}

// ============================================================================
// Failing Store
// ============================================================================

/// Store whose every read and write fails
pub struct FailingStore;

#[async_trait]
impl SessionStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, String> {
        Err("storage unavailable".to_string())
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), String> {
        Err("storage unavailable".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_mock_client_prefers_fixed_replies() {
        let client = MockAnswerClient::new().with_reply("fixed", Ok(ChatReply::text("always")));
        client.queue_reply(Ok(ChatReply::text("queued")));

        assert_eq!(client.ask("fixed").await.unwrap(), ChatReply::text("always"));
        assert_eq!(client.ask("other").await.unwrap(), ChatReply::text("queued"));
        assert!(client.ask("other").await.is_err());
        assert_eq!(client.recorded_queries(), vec!["fixed", "other", "other"]);
    }

    #[tokio::test]
    async fn test_delayed_client_waits_for_gate() {
        let client = Arc::new(DelayedMockAnswerClient::new(ChatReply::text("late")));
        let gate = client.gate();

        let pending = tokio::spawn({
            let client = client.clone();
            async move { client.ask("q").await }
        });
        client.request_started.notified().await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!pending.is_finished());

        gate.release();
        let reply = tokio::time::timeout(Duration::from_secs(5), pending)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(reply, ChatReply::text("late"));
    }

    #[tokio::test]
    async fn test_failing_store() {
        assert!(FailingStore.get("k").await.is_err());
        assert!(FailingStore.set("k", "v").await.is_err());
    }
}
