//! Core session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{
    PendingEdit, PendingRequest, PoolKind, RequestSlot, RequestToken, Role, SessionContext,
    SessionState, Turn, DEFAULT_GREETING, FALLBACK_REPLY, SERVICE_ERROR_PLACEHOLDER,
};
pub use transition::{transition, TransitionError, TransitionResult};
