//! Answering service abstraction
//!
//! The remote service answers one query per call. Everything the session
//! controller needs from it is captured by [`AnswerService`].

mod error;
mod http;
mod types;

pub use error::{ServiceError, ServiceErrorKind};
pub use http::HttpAnswerService;
pub use types::ChatReply;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for answering service backends
#[async_trait]
pub trait AnswerService: Send + Sync {
    /// Ask the service a single question
    async fn ask(&self, query: &str) -> Result<ChatReply, ServiceError>;

    /// Where queries are sent (for logging)
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: AnswerService + ?Sized> AnswerService for Arc<T> {
    async fn ask(&self, query: &str) -> Result<ChatReply, ServiceError> {
        (**self).ask(query).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Logging wrapper for answering services
pub struct LoggingService {
    inner: Arc<dyn AnswerService>,
    endpoint: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn AnswerService>) -> Self {
        let endpoint = inner.endpoint().to_string();
        Self { inner, endpoint }
    }
}

#[async_trait]
impl AnswerService for LoggingService {
    async fn ask(&self, query: &str) -> Result<ChatReply, ServiceError> {
        let start = std::time::Instant::now();
        let result = self.inner.ask(query).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    has_response = reply.reply_text().is_some(),
                    dynamic_questions = reply.dynamic_questions.as_ref().map_or(0, Vec::len),
                    "Chat request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    error = %e.message,
                    "Chat request failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
