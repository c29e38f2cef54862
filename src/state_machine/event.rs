//! Events that can occur in a session

use crate::scroll::Viewport;
use crate::service::ChatReply;
use crate::state_machine::state::{PoolKind, RequestToken};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // Input events
    InputChanged {
        text: String,
    },
    /// Send the current contents of the input field
    SubmitInput,
    UserSend {
        text: String,
    },

    // Edit events
    BeginEdit {
        index: usize,
    },
    EditDraftChanged {
        text: String,
    },
    CancelEdit,
    CommitEdit {
        text: String,
    },

    // Suggestion events
    SuggestionSelected {
        pool: PoolKind,
        question: String,
    },

    // Service events
    ServiceReplied {
        token: RequestToken,
        reply: ChatReply,
    },
    ServiceFailed {
        token: RequestToken,
        message: String,
    },

    // View events
    UserScrolled {
        viewport: Viewport,
    },
    ViewportMeasured {
        viewport: Viewport,
    },
    ScrollIndicatorClicked,

    // Session events
    ResetSession,
}

impl Event {
    /// Token of the request this event resolves, if any
    pub fn resolved_token(&self) -> Option<RequestToken> {
        match self {
            Event::ServiceReplied { token, .. } | Event::ServiceFailed { token, .. } => {
                Some(*token)
            }
            _ => None,
        }
    }
}
