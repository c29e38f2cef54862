//! Effects produced by state transitions

use crate::state_machine::state::RequestToken;
use std::time::Duration;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write the transcript to session storage
    PersistTranscript,

    /// Ask the answering service; the outcome comes back as an event carrying `token`
    RequestAnswer { token: RequestToken, query: String },

    /// Scroll the view to the latest turn
    ScrollToBottom,

    /// Flash the turn at `index` for `duration`
    Highlight { index: usize, duration: Duration },

    // Notifications carrying a snapshot of the named part of the state
    NotifyTranscript,
    NotifyTyping,
    NotifyScrollIndicator,
    NotifySuggestions,
    NotifyInput,
    NotifyEdit,
}

impl Effect {
    pub fn request_answer(token: RequestToken, query: impl Into<String>) -> Self {
        Effect::RequestAnswer {
            token,
            query: query.into(),
        }
    }
}
