//! Session controller executor

use super::traits::SessionStore;
use super::{SessionHandle, UiEvent};

use crate::service::AnswerService;
use crate::state_machine::{transition, Effect, Event, SessionContext, SessionState, Turn};
use crate::storage::{decode_transcript, encode_transcript};
use crate::suggestions::sample_pool;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

const EVENT_CHANNEL_CAPACITY: usize = 64;
const BROADCAST_CAPACITY: usize = 128;

/// Owns one chat session and carries out the effects of its transitions
pub struct SessionController<S, C>
where
    S: SessionStore + 'static,
    C: AnswerService + 'static,
{
    context: SessionContext,
    state: SessionState,
    store: S,
    client: Arc<C>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<UiEvent>,
}

impl<S, C> SessionController<S, C>
where
    S: SessionStore + 'static,
    C: AnswerService + 'static,
{
    /// Restore the session from `store` (or seed it) and sample the static pool
    pub async fn open(context: SessionContext, store: S, client: C) -> Self {
        let transcript = load_transcript(&context, &store).await;
        let static_pool = sample_pool(
            &context.seed_questions,
            context.static_sample_size,
            &mut rand::thread_rng(),
        );
        tracing::info!(
            session_id = %context.session_id,
            turns = transcript.len(),
            "Opened chat session"
        );

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);

        let mut controller = Self {
            context,
            state: SessionState::new(transcript, static_pool),
            store,
            client: Arc::new(client),
            event_rx,
            event_tx,
            broadcast_tx,
        };
        // A recovered or seeded transcript is written back straight away
        controller.persist_transcript().await;
        controller
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            event_tx: self.event_tx.clone(),
            broadcast_tx: self.broadcast_tx.clone(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.broadcast_tx.subscribe()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Process events until the task running this is aborted
    ///
    /// The controller holds a sender for its own request tasks, so the event
    /// channel stays open for as long as the controller exists.
    pub async fn run(mut self) {
        tracing::info!(session_id = %self.context.session_id, "Starting session controller");

        loop {
            self.process_next().await;
        }
    }

    /// Wait for the next queued event and apply it
    pub async fn process_next(&mut self) {
        if let Some(event) = self.event_rx.recv().await {
            self.process_event(event).await;
        }
    }

    /// Apply one event to completion
    pub async fn process_event(&mut self, event: Event) {
        if let Some(token) = event.resolved_token() {
            tracing::debug!(session_id = %self.context.session_id, token = %token, "Service outcome received");
        }

        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(session_id = %self.context.session_id, error = %e, "Event ignored");
                return;
            }
        };

        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect).await;
        }
    }

    async fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::PersistTranscript => self.persist_transcript().await,

            Effect::RequestAnswer { token, query } => {
                let client = self.client.clone();
                let event_tx = self.event_tx.clone();

                tokio::spawn(async move {
                    tracing::debug!(token = %token, "Sending chat request (background)");
                    let event = match client.ask(&query).await {
                        Ok(reply) => Event::ServiceReplied { token, reply },
                        Err(e) => Event::ServiceFailed {
                            token,
                            message: e.to_string(),
                        },
                    };
                    if event_tx.send(event).await.is_err() {
                        tracing::debug!(token = %token, "Session closed before reply arrived");
                    }
                });
            }

            Effect::ScrollToBottom => self.notify(UiEvent::ScrollToBottom),

            Effect::Highlight { index, duration } => {
                self.notify(UiEvent::Highlight { index, duration });
            }

            Effect::NotifyTranscript => self.notify(UiEvent::TranscriptChanged {
                turns: self.state.transcript.clone(),
            }),

            Effect::NotifyTyping => self.notify(UiEvent::TypingChanged {
                typing: self.state.is_typing(),
            }),

            Effect::NotifyScrollIndicator => self.notify(UiEvent::ScrollIndicatorChanged {
                visible: self.state.scroll.show_indicator(),
            }),

            Effect::NotifySuggestions => self.notify(UiEvent::SuggestionsChanged {
                static_pool: self.state.static_pool.clone(),
                dynamic_pool: self.state.dynamic_pool.clone(),
            }),

            Effect::NotifyInput => self.notify(UiEvent::InputChanged {
                text: self.state.input.clone(),
            }),

            Effect::NotifyEdit => self.notify(UiEvent::EditChanged {
                edit: self.state.pending_edit.clone(),
            }),
        }
    }

    fn notify(&self, event: UiEvent) {
        // No subscribers is fine
        let _ = self.broadcast_tx.send(event);
    }

    async fn persist_transcript(&mut self) {
        let encoded = match encode_transcript(&self.state.transcript) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(session_id = %self.context.session_id, error = %e, "Failed to encode transcript");
                return;
            }
        };
        if let Err(e) = self.store.set(&self.context.storage_key, &encoded).await {
            tracing::warn!(session_id = %self.context.session_id, error = %e, "Failed to persist transcript");
        }
    }
}

/// Read the persisted transcript, falling back to the greeting on any problem
async fn load_transcript<S: SessionStore>(context: &SessionContext, store: &S) -> Vec<Turn> {
    match store.get(&context.storage_key).await {
        Ok(Some(raw)) => match decode_transcript(&raw) {
            Ok(turns) => turns,
            Err(e) => {
                tracing::warn!(session_id = %context.session_id, error = %e, "Discarding malformed transcript");
                context.seed_transcript()
            }
        },
        Ok(None) => context.seed_transcript(),
        Err(e) => {
            tracing::warn!(session_id = %context.session_id, error = %e, "Failed to load transcript");
            context.seed_transcript()
        }
    }
}
