//! Runtime for executing a chat session
//!
//! Drives the pure state machine: applies transitions, performs their
//! effects, and streams UI events to whoever renders the session.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::SessionController;
pub use traits::*;

use crate::service::LoggingService;
use crate::state_machine::{Event, PendingEdit, Turn};
use crate::suggestions::SuggestionPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

/// Controller with the production store and service wiring
pub type ProductionController = SessionController<Arc<dyn SessionStore>, LoggingService>;

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub event_tx: mpsc::Sender<Event>,
    pub broadcast_tx: broadcast::Sender<UiEvent>,
}

impl SessionHandle {
    /// Queue an event for the controller; false once the controller is dropped
    /// (its `run` task aborted)
    pub async fn send(&self, event: Event) -> bool {
        self.event_tx.send(event).await.is_ok()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.broadcast_tx.subscribe()
    }
}

/// Events sent to the rendering layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    TranscriptChanged {
        turns: Vec<Turn>,
    },
    TypingChanged {
        typing: bool,
    },
    ScrollToBottom,
    ScrollIndicatorChanged {
        visible: bool,
    },
    /// Flash the turn at `index`; the renderer clears it after `duration`
    Highlight {
        index: usize,
        duration: Duration,
    },
    SuggestionsChanged {
        static_pool: SuggestionPool,
        dynamic_pool: SuggestionPool,
    },
    InputChanged {
        text: String,
    },
    EditChanged {
        edit: Option<PendingEdit>,
    },
}
