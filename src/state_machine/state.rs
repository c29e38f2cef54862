//! Session state types

use crate::scroll::ScrollState;
use crate::suggestions::SuggestionPool;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Greeting used to seed a fresh transcript
pub const DEFAULT_GREETING: &str = "Hello! How can I assist you with ferry bookings?";

/// Written in place of a reply when the service answers without one
pub const FALLBACK_REPLY: &str = "I couldn't fetch a response.";

/// Written in place of a reply when the service call fails
pub const SERVICE_ERROR_PLACEHOLDER: &str = "Error connecting to AI chat service.";

/// Session-storage key holding the serialized transcript
pub const DEFAULT_STORAGE_KEY: &str = "chatMessages";

/// How long the rendering layer should keep an edited reply highlighted
pub const HIGHLIGHT_DURATION: Duration = Duration::from_secs(2);

/// Number of seed questions offered at session start
pub const STATIC_SAMPLE_SIZE: usize = 3;

/// Candidate questions the static suggestion pool is sampled from
pub const DEFAULT_SEED_QUESTIONS: [&str; 5] = [
    "How long does it take to travel from Kimolos to Sifnos?",
    "What is the price for a ferry from Athens to Santorini?",
    "Are there any ferries available on July 15th?",
    "Can you provide the schedule for ferries from Mykonos?",
    "What is the cheapest route from Naxos to Paros?",
];

// ============================================================================
// Transcript
// ============================================================================

/// Author of a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// In-progress edit of an earlier user turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingEdit {
    /// Position of the user turn being edited
    pub index: usize,
    pub draft: String,
}

// ============================================================================
// Request Tracking
// ============================================================================

/// Where the reply to a request will be written
///
/// Both variants remember the user turn being answered, so a later edit of
/// that turn can retire the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestSlot {
    /// Reply is appended at the end of the transcript
    Append { user_index: usize },
    /// Reply overwrites the turn following `user_index`
    Overwrite { user_index: usize },
}

impl RequestSlot {
    /// Position the reply is written to, when it is fixed in advance
    pub fn reply_index(&self) -> Option<usize> {
        match self {
            RequestSlot::Append { .. } => None,
            RequestSlot::Overwrite { user_index } => Some(user_index + 1),
        }
    }

    /// The user turn this request answers
    pub fn user_index(&self) -> usize {
        match self {
            RequestSlot::Append { user_index } | RequestSlot::Overwrite { user_index } => {
                *user_index
            }
        }
    }

    pub(crate) fn user_index_mut(&mut self) -> &mut usize {
        match self {
            RequestSlot::Append { user_index } | RequestSlot::Overwrite { user_index } => {
                user_index
            }
        }
    }
}

/// Identifies one outstanding service request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// A request that has been issued and not yet resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub slot: RequestSlot,
    /// False once a newer request claimed the slot or the session was reset;
    /// the resolution is then dropped
    pub live: bool,
}

/// Which suggestion pool a question belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    Static,
    Dynamic,
}

// ============================================================================
// Session State
// ============================================================================

/// Complete mutable state of one chat session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub transcript: Vec<Turn>,
    pub pending_edit: Option<PendingEdit>,
    /// Current contents of the main input field
    pub input: String,
    pub static_pool: SuggestionPool,
    pub dynamic_pool: SuggestionPool,
    pub scroll: ScrollState,
    /// Every request still in flight, live or not
    pub requests: BTreeMap<RequestToken, PendingRequest>,
    pub next_token: u64,
}

impl SessionState {
    pub fn new(transcript: Vec<Turn>, static_pool: SuggestionPool) -> Self {
        Self {
            transcript,
            pending_edit: None,
            input: String::new(),
            static_pool,
            dynamic_pool: SuggestionPool::default(),
            scroll: ScrollState::default(),
            requests: BTreeMap::new(),
            next_token: 1,
        }
    }

    /// True while any service call is outstanding
    pub fn is_typing(&self) -> bool {
        !self.requests.is_empty()
    }

    pub fn is_user_turn(&self, index: usize) -> bool {
        self.transcript.get(index).is_some_and(Turn::is_user)
    }

    pub fn pool_mut(&mut self, kind: PoolKind) -> &mut SuggestionPool {
        match kind {
            PoolKind::Static => &mut self.static_pool,
            PoolKind::Dynamic => &mut self.dynamic_pool,
        }
    }

    pub(crate) fn issue_token(&mut self) -> RequestToken {
        let token = RequestToken(self.next_token);
        self.next_token += 1;
        token
    }
}

/// Context for a session (immutable configuration)
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    pub storage_key: String,
    pub greeting: String,
    pub seed_questions: Vec<String>,
    pub static_sample_size: usize,
    pub fallback_reply: String,
    pub error_placeholder: String,
    pub highlight_duration: Duration,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
            seed_questions: DEFAULT_SEED_QUESTIONS.iter().map(ToString::to_string).collect(),
            static_sample_size: STATIC_SAMPLE_SIZE,
            fallback_reply: FALLBACK_REPLY.to_string(),
            error_placeholder: SERVICE_ERROR_PLACEHOLDER.to_string(),
            highlight_duration: HIGHLIGHT_DURATION,
        }
    }

    #[must_use]
    pub fn with_seed_questions(mut self, questions: Vec<String>) -> Self {
        self.seed_questions = questions;
        self
    }

    /// Transcript used when nothing usable was persisted
    pub fn seed_transcript(&self) -> Vec<Turn> {
        vec![Turn::assistant(self.greeting.clone())]
    }
}
