//! Pure state transition function
//!
//! Every user action and service outcome passes through [`transition`], which
//! returns the next state and the effects the runtime must carry out. The
//! user's text always lands in the transcript before the request effect, so
//! the echo never waits on the network.

use super::state::{PendingRequest, RequestSlot, SessionContext, SessionState, Turn};
use super::{Effect, Event};
use crate::service::ChatReply;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Reasons an event leaves the session untouched
///
/// None of these reach the user; the runtime logs and drops them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyInput,
    #[error("Turn {0} is not a user turn")]
    InvalidEditTarget(usize),
    #[error("No edit in progress")]
    NoPendingEdit,
    #[error("Suggestion not offered: {0}")]
    UnknownSuggestion(String),
    #[error("No request in flight with token {0}")]
    UnknownRequest(super::RequestToken),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(
    state: &SessionState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match event {
        // ============================================================
        // Input Field
        // ============================================================
        Event::InputChanged { text } => {
            next.input = text;
            effects.push(Effect::NotifyInput);
        }

        Event::SubmitInput => {
            let text = next.input.clone();
            send_new(&mut next, &mut effects, text)?;
        }

        Event::UserSend { text } => {
            send_new(&mut next, &mut effects, text)?;
        }

        // ============================================================
        // Edit + Resend
        // ============================================================
        Event::BeginEdit { index } => {
            let Some(turn) = next.transcript.get(index).filter(|t| t.is_user()) else {
                return Err(TransitionError::InvalidEditTarget(index));
            };
            next.pending_edit = Some(super::PendingEdit {
                index,
                draft: turn.content.clone(),
            });
            effects.push(Effect::NotifyEdit);
        }

        Event::EditDraftChanged { text } => {
            let edit = next
                .pending_edit
                .as_mut()
                .ok_or(TransitionError::NoPendingEdit)?;
            edit.draft = text;
            effects.push(Effect::NotifyEdit);
        }

        Event::CancelEdit => {
            next.pending_edit
                .take()
                .ok_or(TransitionError::NoPendingEdit)?;
            effects.push(Effect::NotifyEdit);
        }

        Event::CommitEdit { text } => {
            // The edit closes whether or not the resend goes out
            let edit = next
                .pending_edit
                .take()
                .ok_or(TransitionError::NoPendingEdit)?;
            effects.push(Effect::NotifyEdit);

            if !text.trim().is_empty() && next.is_user_turn(edit.index) {
                resend_edit(&mut next, &mut effects, edit.index, text);
            }
        }

        // ============================================================
        // Suggestions
        // ============================================================
        Event::SuggestionSelected { pool, question } => {
            if !next.pool_mut(pool).take(&question) {
                return Err(TransitionError::UnknownSuggestion(question));
            }
            next.input = question;
            effects.push(Effect::NotifySuggestions);
            effects.push(Effect::NotifyInput);
        }

        // ============================================================
        // Service Outcomes
        // ============================================================
        Event::ServiceReplied { token, reply } => {
            let request = next
                .requests
                .remove(&token)
                .ok_or(TransitionError::UnknownRequest(token))?;
            effects.push(Effect::NotifyTyping);

            if request.live {
                let text = reply
                    .reply_text()
                    .map_or_else(|| context.fallback_reply.clone(), ToString::to_string);
                resolve(&mut next, &mut effects, context, request.slot, text);
                apply_dynamic_questions(&mut next, &mut effects, reply);
            }
        }

        Event::ServiceFailed { token, .. } => {
            let request = next
                .requests
                .remove(&token)
                .ok_or(TransitionError::UnknownRequest(token))?;
            effects.push(Effect::NotifyTyping);

            if request.live {
                let text = context.error_placeholder.clone();
                resolve(&mut next, &mut effects, context, request.slot, text);
            }
        }

        // ============================================================
        // Scrolling
        // ============================================================
        Event::UserScrolled { viewport } => {
            if next.scroll.on_user_scroll(viewport) {
                effects.push(Effect::NotifyScrollIndicator);
            }
        }

        Event::ViewportMeasured { viewport } => {
            if next.scroll.on_measured(viewport) {
                effects.push(Effect::NotifyScrollIndicator);
            }
        }

        Event::ScrollIndicatorClicked => {
            effects.push(Effect::ScrollToBottom);
            if next.scroll.indicator_clicked() {
                effects.push(Effect::NotifyScrollIndicator);
            }
        }

        // ============================================================
        // Reset
        // ============================================================
        Event::ResetSession => {
            next.transcript = context.seed_transcript();
            next.pending_edit = None;
            next.input.clear();
            next.dynamic_pool.clear();
            for request in next.requests.values_mut() {
                request.live = false;
            }
            if next.scroll.reset() {
                effects.push(Effect::NotifyScrollIndicator);
            }
            effects.extend([Effect::NotifyEdit, Effect::NotifyInput, Effect::NotifySuggestions]);
            transcript_changed(&mut next, &mut effects);
        }
    }

    Ok(TransitionResult::new(next).with_effects(effects))
}

/// Append a user turn and ask the service for the reply that follows it
fn send_new(
    state: &mut SessionState,
    effects: &mut Vec<Effect>,
    text: String,
) -> Result<(), TransitionError> {
    if text.trim().is_empty() {
        return Err(TransitionError::EmptyInput);
    }

    state.transcript.push(Turn::user(text.clone()));
    let user_index = state.transcript.len() - 1;
    state.input.clear();
    effects.push(Effect::NotifyInput);
    transcript_changed(state, effects);

    issue_request(state, effects, RequestSlot::Append { user_index }, text);
    Ok(())
}

/// Overwrite the user turn at `index` and re-ask; the reply replaces the turn after it
fn resend_edit(state: &mut SessionState, effects: &mut Vec<Effect>, index: usize, text: String) {
    state.transcript[index].content.clone_from(&text);
    state.input.clear();
    effects.push(Effect::NotifyInput);
    transcript_changed(state, effects);

    // Whatever was still answering the old text is now stale
    for request in state.requests.values_mut() {
        if request.slot.user_index() == index {
            request.live = false;
        }
    }
    issue_request(state, effects, RequestSlot::Overwrite { user_index: index }, text);
}

fn issue_request(state: &mut SessionState, effects: &mut Vec<Effect>, slot: RequestSlot, query: String) {
    let token = state.issue_token();
    state
        .requests
        .insert(token, PendingRequest { slot, live: true });
    effects.push(Effect::NotifyTyping);
    effects.push(Effect::request_answer(token, query));
}

/// Write a reply (or placeholder) into its slot
fn resolve(
    state: &mut SessionState,
    effects: &mut Vec<Effect>,
    context: &SessionContext,
    slot: RequestSlot,
    text: String,
) {
    let index = write_reply(state, slot, text);
    transcript_changed(state, effects);

    if let RequestSlot::Overwrite { .. } = slot {
        effects.push(Effect::Highlight {
            index,
            duration: context.highlight_duration,
        });
    }
}

/// Place an assistant turn for `slot`, returning where it landed
fn write_reply(state: &mut SessionState, slot: RequestSlot, text: String) -> usize {
    let reply = Turn::assistant(text);
    let Some(position) = slot.reply_index() else {
        state.transcript.push(reply);
        return state.transcript.len() - 1;
    };

    match state.transcript.get(position) {
        None => {
            state.transcript.push(reply);
            state.transcript.len() - 1
        }
        Some(turn) if turn.is_user() => {
            // Never overwrite what the user typed; slide later turns down instead
            state.transcript.insert(position, reply);
            shift_indices_from(state, position);
            position
        }
        Some(_) => {
            state.transcript[position] = reply;
            position
        }
    }
}

/// Keep slot and edit indices pointing at the same turns after an insert at `position`
fn shift_indices_from(state: &mut SessionState, position: usize) {
    for request in state.requests.values_mut() {
        let user_index = request.slot.user_index_mut();
        if *user_index >= position {
            *user_index += 1;
        }
    }
    if let Some(edit) = state.pending_edit.as_mut() {
        if edit.index >= position {
            edit.index += 1;
        }
    }
}

fn apply_dynamic_questions(state: &mut SessionState, effects: &mut Vec<Effect>, reply: ChatReply) {
    if let Some(questions) = reply.dynamic_questions {
        state.dynamic_pool.replace(questions);
        effects.push(Effect::NotifySuggestions);
    }
}

/// Persist, notify, then either follow the new content or refresh the indicator
fn transcript_changed(state: &mut SessionState, effects: &mut Vec<Effect>) {
    effects.push(Effect::PersistTranscript);
    effects.push(Effect::NotifyTranscript);
    if state.scroll.auto_scroll() {
        effects.push(Effect::ScrollToBottom);
    } else if state.scroll.recompute_indicator() {
        effects.push(Effect::NotifyScrollIndicator);
    }
}
