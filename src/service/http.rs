//! HTTP answering service implementation

use super::types::{ChatQuery, ChatReply};
use super::{AnswerService, ServiceError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Client for the `GET /chat/?query=...` endpoint
pub struct HttpAnswerService {
    client: Client,
    endpoint: String,
}

impl HttpAnswerService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/", base_url.trim_end_matches('/')),
        })
    }

    fn classify_error(status: StatusCode, body: &str) -> ServiceError {
        ServiceError::status(status.as_u16(), format!("HTTP {status}: {body}"))
    }

    fn parse_reply(body: &str) -> Result<ChatReply, ServiceError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| ServiceError::decode(format!("Failed to parse response: {e} - body: {body}")))?;

        if !value.is_object() {
            return Err(ServiceError::decode(format!(
                "Expected a JSON object - body: {body}"
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| ServiceError::decode(format!("Unexpected response shape: {e}")))
    }
}

#[async_trait]
impl AnswerService for HttpAnswerService {
    async fn ask(&self, query: &str) -> Result<ChatReply, ServiceError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&ChatQuery { query })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::timeout(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    ServiceError::network(format!("Connection failed: {e}"))
                } else {
                    ServiceError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::classify_error(status, &body));
        }

        Self::parse_reply(&body)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
