//! Answering service error types

use thiserror::Error;

/// Service error with classification
///
/// The session shows the same placeholder for every kind; the kind only
/// feeds logging.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Timeout, message)
    }

    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Status(code), message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Decode, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Unknown, message)
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// Connection refused, reset, DNS failure
    Network,
    /// Transport timeout elapsed
    Timeout,
    /// Non-success HTTP status
    Status(u16),
    /// Body was not the expected JSON object
    Decode,
    Unknown,
}
