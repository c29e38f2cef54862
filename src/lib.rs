//! Ferry Chat - session controller for a ferry-booking assistant
//!
//! Keeps the chat transcript, dispatches queries to the answering service,
//! and derives the scroll/typing state a rendering layer needs.

pub mod config;
pub mod runtime;
pub mod scroll;
pub mod service;
pub mod state_machine;
pub mod storage;
pub mod suggestions;
