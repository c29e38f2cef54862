//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across arbitrary event sequences.

use super::state::*;
use super::transition::*;
use super::*;
use crate::scroll::Viewport;
use crate::service::ChatReply;
use crate::suggestions::SuggestionPool;
use proptest::prelude::*;
use std::collections::HashSet;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> SessionContext {
    SessionContext::new("prop-session")
}

fn initial_state() -> SessionState {
    SessionState::new(
        test_context().seed_transcript(),
        SuggestionPool::from_questions(["s1", "s2", "s3"]),
    )
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-zA-Z ]{1,20}",
        1 => Just(String::new()),
        1 => Just("   ".to_string()),
    ]
}

fn arb_token() -> impl Strategy<Value = RequestToken> {
    (1u64..8).prop_map(RequestToken)
}

fn arb_reply() -> impl Strategy<Value = ChatReply> {
    (
        proptest::option::of("[a-z ]{0,15}"),
        proptest::option::of(proptest::collection::vec("[a-z]{0,4}", 0..4)),
    )
        .prop_map(|(response, dynamic_questions)| ChatReply {
            response,
            dynamic_questions,
        })
}

fn arb_viewport() -> impl Strategy<Value = Viewport> {
    (0u32..1200, 100u32..600, 0u32..1500).prop_map(|(top, client, height)| {
        Viewport::new(top, client, height)
    })
}

fn arb_pool_kind() -> impl Strategy<Value = PoolKind> {
    prop_oneof![Just(PoolKind::Static), Just(PoolKind::Dynamic)]
}

fn arb_input_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_text().prop_map(|text| Event::UserSend { text }),
        arb_text().prop_map(|text| Event::InputChanged { text }),
        Just(Event::SubmitInput),
        (0usize..8).prop_map(|index| Event::BeginEdit { index }),
        arb_text().prop_map(|text| Event::EditDraftChanged { text }),
        Just(Event::CancelEdit),
        arb_text().prop_map(|text| Event::CommitEdit { text }),
        (arb_pool_kind(), "s[1-3]|[a-z]{1,4}")
            .prop_map(|(pool, question)| Event::SuggestionSelected { pool, question }),
    ]
}

fn arb_external_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        (arb_token(), arb_reply()).prop_map(|(token, reply)| Event::ServiceReplied { token, reply }),
        arb_token().prop_map(|token| Event::ServiceFailed {
            token,
            message: "boom".to_string(),
        }),
        arb_viewport().prop_map(|viewport| Event::UserScrolled { viewport }),
        arb_viewport().prop_map(|viewport| Event::ViewportMeasured { viewport }),
        Just(Event::ScrollIndicatorClicked),
        Just(Event::ResetSession),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![arb_input_event(), arb_external_event()]
}

// ============================================================================
// State Validity Checkers
// ============================================================================

fn pool_is_valid(pool: &SuggestionPool) -> bool {
    let unique: HashSet<_> = pool.questions().iter().collect();
    unique.len() == pool.len() && pool.questions().iter().all(|q| !q.trim().is_empty())
}

fn is_valid_state(state: &SessionState) -> bool {
    let edit_ok = state
        .pending_edit
        .as_ref()
        .map_or(true, |edit| state.is_user_turn(edit.index));
    let slots_ok = state
        .requests
        .values()
        .filter(|r| r.live)
        .all(|request| state.is_user_turn(request.slot.user_index()));

    !state.transcript.is_empty()
        && edit_ok
        && slots_ok
        && pool_is_valid(&state.static_pool)
        && pool_is_valid(&state.dynamic_pool)
        && state.static_pool.len() <= 3
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: Valid state after any transition
    #[test]
    fn prop_transitions_preserve_validity(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = initial_state();
        let ctx = test_context();

        for event in events {
            if let Ok(result) = transition(&state, &ctx, event) {
                state = result.new_state;
                prop_assert!(is_valid_state(&state), "Invalid state: {:?}", state);
            }
        }
    }

    // Invariant 2: Only a reset shrinks the transcript
    #[test]
    fn prop_transcript_never_shrinks(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = initial_state();
        let ctx = test_context();

        for event in events {
            let is_reset = matches!(event, Event::ResetSession);
            if let Ok(result) = transition(&state, &ctx, event) {
                if !is_reset {
                    prop_assert!(result.new_state.transcript.len() >= state.transcript.len());
                }
                state = result.new_state;
            }
        }
    }

    // Invariant 3: Each request effect is tracked, and typing mirrors outstanding requests
    #[test]
    fn prop_requests_are_tracked(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = initial_state();
        let ctx = test_context();

        for event in events {
            if let Ok(result) = transition(&state, &ctx, event) {
                let issued: Vec<_> = result
                    .effects
                    .iter()
                    .filter_map(|e| match e {
                        Effect::RequestAnswer { token, .. } => Some(*token),
                        _ => None,
                    })
                    .collect();
                prop_assert!(issued.len() <= 1);
                for token in issued {
                    prop_assert!(result.new_state.requests.get(&token).is_some_and(|r| r.live));
                }
                prop_assert_eq!(result.new_state.is_typing(), !result.new_state.requests.is_empty());
                state = result.new_state;
            }
        }
    }

    // Invariant 4: Whitespace-only text never reaches the transcript or the network
    #[test]
    fn prop_blank_send_is_rejected(
        setup in proptest::collection::vec(arb_event(), 0..10),
        blank in "[ \t\n]{0,5}",
    ) {
        let mut state = initial_state();
        let ctx = test_context();
        for event in setup {
            if let Ok(result) = transition(&state, &ctx, event) {
                state = result.new_state;
            }
        }

        let result = transition(&state, &ctx, Event::UserSend { text: blank });
        prop_assert!(matches!(result, Err(TransitionError::EmptyInput)));
    }

    // Invariant 5: A failed resolution keeps the dynamic pool
    #[test]
    fn prop_failure_keeps_dynamic_pool(
        questions in proptest::collection::vec("[a-z]{1,4}", 0..4),
        text in "[a-z]{1,10}",
    ) {
        let mut state = initial_state();
        state.dynamic_pool = SuggestionPool::from_questions(questions);
        let ctx = test_context();

        let sent = transition(&state, &ctx, Event::UserSend { text }).unwrap();
        let token = RequestToken(state.next_token);
        let failed = transition(
            &sent.new_state,
            &ctx,
            Event::ServiceFailed { token, message: "down".to_string() },
        )
        .unwrap();

        prop_assert_eq!(&failed.new_state.dynamic_pool, &state.dynamic_pool);
        prop_assert_eq!(
            failed.new_state.transcript.last().map(|t| t.content.as_str()),
            Some(SERVICE_ERROR_PLACEHOLDER)
        );
    }
}
