//! Wire types for the answering service

use serde::{Deserialize, Serialize};

/// Query string of a chat request
#[derive(Debug, Serialize)]
pub(crate) struct ChatQuery<'a> {
    pub query: &'a str,
}

/// Body of a successful chat response
///
/// Both fields are optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub dynamic_questions: Option<Vec<String>>,
}

impl ChatReply {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            dynamic_questions: None,
        }
    }

    #[must_use]
    pub fn with_questions<I, S>(mut self, questions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dynamic_questions = Some(questions.into_iter().map(Into::into).collect());
        self
    }

    /// The answer, if the service actually gave one
    pub fn reply_text(&self) -> Option<&str> {
        self.response.as_deref().filter(|text| !text.trim().is_empty())
    }
}
