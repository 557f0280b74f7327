//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::backend::{BackendError, ChatReply, HistoryMessage, SessionSummary, ToolInvocation};
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_session_id() -> impl Strategy<Value = String> {
    prop_oneof![Just("s1"), Just("s2"), Just("s3")].prop_map(String::from)
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-zA-Z ]{1,30}",
        1 => "[ \t\n]{0,5}",
    ]
}

fn arb_tool_invocation() -> impl Strategy<Value = ToolInvocation> {
    ("[a-z_]{3,12}", "[a-zA-Z ]{0,10}")
        .prop_map(|(name, q)| ToolInvocation::new(name, json!({ "q": q })))
}

fn arb_reply() -> impl Strategy<Value = ChatReply> {
    (
        arb_session_id(),
        proptest::option::of("[a-zA-Z ]{0,20}"),
        proptest::collection::vec(arb_tool_invocation(), 0..3),
    )
        .prop_map(|(session_id, response, tool_calls)| ChatReply {
            session_id,
            response,
            tool_calls,
        })
}

fn arb_error() -> impl Strategy<Value = BackendError> {
    prop_oneof![
        "[a-z ]{1,20}".prop_map(|d| BackendError::status(500, Some(d))),
        Just(BackendError::status(404, None)),
        Just(BackendError::transport("connection refused")),
    ]
}

fn arb_history() -> impl Strategy<Value = Vec<HistoryMessage>> {
    proptest::collection::vec(
        (
            prop_oneof![Just("user"), Just("assistant"), Just("tool"), Just("system")],
            "[a-z ]{0,20}",
        )
            .prop_map(|(role, content)| HistoryMessage::new(role, content)),
        0..6,
    )
}

fn arb_sessions() -> impl Strategy<Value = Vec<SessionSummary>> {
    proptest::collection::vec(
        (arb_session_id(), 0u64..20)
            .prop_map(|(id, count)| SessionSummary::new(id, "2024-05-01 10:00:00", count)),
        0..4,
    )
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_text().prop_map(|text| Event::UserSubmit { text }),
        Just(Event::NewConversation),
        arb_session_id().prop_map(|session_id| Event::SelectSession { session_id }),
        Just(Event::RefreshSessions),
        arb_reply().prop_map(|reply| Event::SendSucceeded { reply }),
        arb_error().prop_map(|error| Event::SendFailed { error }),
        (arb_session_id(), 0u64..8, arb_history()).prop_map(|(session_id, epoch, messages)| {
            Event::HistoryLoaded {
                session_id,
                epoch,
                messages,
            }
        }),
        (arb_session_id(), 0u64..8, arb_error()).prop_map(|(session_id, epoch, error)| {
            Event::HistoryFailed {
                session_id,
                epoch,
                error,
            }
        }),
        (0u64..8, arb_sessions()).prop_map(|(seq, sessions)| Event::SessionsLoaded { seq, sessions }),
        (0u64..8, arb_error()).prop_map(|(seq, error)| Event::SessionsFailed { seq, error }),
    ]
}

/// A state reached by applying events from a fresh conversation
fn arb_state() -> impl Strategy<Value = ConversationState> {
    proptest::collection::vec(arb_event(), 0..15).prop_map(|events| {
        let mut state = ConversationState::new();
        for event in events {
            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
            }
        }
        state
    })
}

// ============================================================================
// Invariant Checkers
// ============================================================================

fn position(effects: &[Effect], pred: impl Fn(&Effect) -> bool) -> Option<usize> {
    effects.iter().position(pred)
}

fn input_toggles(effects: &[Effect]) -> Vec<bool> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::SetInputEnabled { enabled } => Some(*enabled),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: input surface is disabled exactly while a send is pending
    #[test]
    fn prop_input_disabled_iff_pending(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = ConversationState::new();
        let mut input_enabled = true;

        for event in events {
            if let Ok(result) = transition(&state, event) {
                if let Some(last) = input_toggles(&result.effects).last() {
                    input_enabled = *last;
                }
                state = result.new_state;
                prop_assert_eq!(input_enabled, !state.is_pending(), "state: {:?}", state);
            }
        }
    }

    // Invariant 2: at most one send outstanding
    #[test]
    fn prop_single_flight(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = ConversationState::new();
        let mut outstanding = 0u32;

        for event in events {
            let settles = matches!(event, Event::SendSucceeded { .. } | Event::SendFailed { .. });
            if let Ok(result) = transition(&state, event) {
                if settles {
                    outstanding = outstanding.saturating_sub(1);
                }
                outstanding += u32::try_from(
                    result.effects.iter().filter(|e| matches!(e, Effect::SendTurn { .. })).count()
                ).unwrap();
                prop_assert!(outstanding <= 1, "{} sends in flight", outstanding);
                state = result.new_state;
            }
        }
    }

    // Invariant 3: optimistic render precedes the request, never reverted
    #[test]
    fn prop_user_turn_rendered_before_send(state in arb_state(), text in "[a-zA-Z]{1,10}[a-zA-Z ]{0,20}") {
        prop_assume!(!state.is_pending());
        let result = transition(&state, Event::submit(text.clone())).unwrap();

        let render = position(&result.effects, |e| *e == Effect::render_user(text.trim()));
        let send = position(&result.effects, |e| matches!(e, Effect::SendTurn { .. }));
        prop_assert!(render.is_some() && send.is_some());
        prop_assert!(render < send);
        let user_turns = result.effects.iter().filter(|e| matches!(e, Effect::RenderTurn { role: Role::User, .. })).count();
        prop_assert_eq!(user_turns, 1);
    }

    // Invariant 4: blank input produces nothing
    #[test]
    fn prop_blank_input_is_noop(state in arb_state(), text in "[ \t\n]{0,8}") {
        let result = transition(&state, Event::submit(text)).unwrap();
        prop_assert!(result.effects.is_empty());
        prop_assert_eq!(result.new_state, state);
    }

    // Invariant 5: the session id is adopted once and only reset by NewConversation
    #[test]
    fn prop_session_id_adopted_once(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = ConversationState::new();

        for event in events {
            let is_reset = matches!(event, Event::NewConversation);
            let is_history = matches!(event, Event::HistoryLoaded { .. });
            let is_reply = matches!(event, Event::SendSucceeded { .. });
            let before = state.active_session_id.clone();

            if let Ok(result) = transition(&state, event) {
                let after = &result.new_state.active_session_id;
                if before.is_some() && after.is_none() {
                    prop_assert!(is_reset, "session cleared without reset");
                }
                if is_reply && before.is_some() {
                    prop_assert_eq!(&before, after);
                }
                if before != *after && !is_reset {
                    prop_assert!(is_history || (is_reply && before.is_none()));
                }
                state = result.new_state;
            }
        }
    }

    // Invariant 6: directory highlight comes from the state at apply time
    #[test]
    fn prop_sessions_render_with_current_active(state in arb_state(), sessions in arb_sessions()) {
        let seq = state.refresh_applied + 1;
        let result = transition(&state, Event::SessionsLoaded { seq, sessions }).unwrap();
        match &result.effects[..] {
            [Effect::RenderSessions { active, .. }] => {
                prop_assert_eq!(active, &state.active_session_id);
            }
            other => prop_assert!(false, "unexpected effects {:?}", other),
        }
    }

    // Invariant 7: stale answers never touch the transcript
    #[test]
    fn prop_stale_history_discarded(state in arb_state(), session_id in arb_session_id(), messages in arb_history()) {
        let stale_epoch = state.view_epoch + 1;
        let result = transition(&state, Event::HistoryLoaded { session_id, epoch: stale_epoch, messages }).unwrap();
        prop_assert_eq!(&result.new_state, &state);
        prop_assert!(
            !result.effects.iter().any(|e| matches!(e, Effect::ReplaceTranscript { .. })),
            "stale history replaced the transcript"
        );
    }

    // Invariant 8: loaded history renders only user/assistant turns, in order
    #[test]
    fn prop_history_filters_roles(messages in arb_history()) {
        let state = ConversationState {
            known_sessions: vec!["s1".to_string()],
            ..ConversationState::new()
        };
        let selected = transition(&state, Event::select("s1")).unwrap();
        let epoch = selected.new_state.view_epoch;
        let loaded = transition(
            &selected.new_state,
            Event::HistoryLoaded { session_id: "s1".to_string(), epoch, messages: messages.clone() },
        ).unwrap();

        let expected: Vec<Turn> = messages.iter().filter_map(Turn::from_history).collect();
        prop_assert_eq!(&loaded.effects[0], &Effect::ReplaceTranscript { turns: expected });
        let expected_highlight = Effect::HighlightSession { session_id: Some("s1".to_string()) };
        let highlights: Vec<_> = loaded.effects.iter().filter(|e| matches!(e, Effect::HighlightSession { .. })).collect();
        prop_assert_eq!(highlights, vec![&expected_highlight]);
    }

    // Invariant 9: failures never leave the controller stuck
    #[test]
    fn prop_failed_send_returns_to_idle(state in arb_state(), text in "[a-z]{1,10}", error in arb_error()) {
        prop_assume!(!state.is_pending());
        let sent = transition(&state, Event::submit(text)).unwrap();
        let failed = transition(&sent.new_state, Event::SendFailed { error: error.clone() }).unwrap();

        prop_assert!(!failed.new_state.is_pending());
        let expected = Effect::render_send_error(&error.message);
        prop_assert!(failed.effects.contains(&expected));
        prop_assert_eq!(failed.new_state.active_session_id, state.active_session_id);
    }

    // Invariant 10: reset then send matches a first send from a fresh start
    #[test]
    fn prop_reset_is_idempotent(state in arb_state(), text in "[a-z]{1,10}") {
        prop_assume!(!state.is_pending());
        let reset = transition(&state, Event::NewConversation).unwrap();
        let after_reset = transition(&reset.new_state, Event::submit(text.clone())).unwrap();
        let fresh = transition(&ConversationState::new(), Event::submit(text)).unwrap();

        prop_assert_eq!(after_reset.effects, fresh.effects);
        prop_assert_eq!(after_reset.new_state.active_session_id, None);
    }
}
