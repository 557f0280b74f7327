//! Pure state transition function
//!
//! Send lifecycle: `Idle -> Sending -> Idle`, single-flight. The user turn is
//! rendered before the request goes out and is never taken back; a failed
//! send is annotated with a synthetic assistant turn instead.

use super::state::{ConvState, ConversationState, PendingSelection, Turn};
use super::{Effect, Event};
use crate::backend::{ChatReply, ChatRequest, HistoryMessage, SessionSummary};
use crate::title::{session_label, title_from_history, title_from_message, NEW_CONVERSATION_TITLE};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConversationState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConversationState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A message is already being sent")]
    SendInFlight,
    #[error("Session is not listed: {0}")]
    UnknownSession(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same state and event it always produces the same result; all
/// I/O is described by the returned effects.
pub fn transition(
    state: &ConversationState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (&state.phase, event) {
        // ============================================================
        // Sending
        // ============================================================

        // Empty input is skipped silently, whatever the phase
        (_, Event::UserSubmit { text }) if text.trim().is_empty() => {
            Ok(TransitionResult::new(state.clone()))
        }

        (ConvState::Idle, Event::UserSubmit { text }) => {
            let message = text.trim().to_string();
            let request = ChatRequest {
                session_id: state.active_session_id.clone(),
                message: message.clone(),
            };
            let new_state = ConversationState {
                phase: ConvState::Sending {
                    message: message.clone(),
                },
                view_epoch: state.view_epoch + 1,
                pending_selection: None,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::ClearInput)
                .with_effect(Effect::render_user(message))
                .with_effect(Effect::ShowPending)
                .with_effect(Effect::set_input_enabled(false))
                .with_effect(Effect::SendTurn { request }))
        }

        (ConvState::Sending { message }, Event::SendSucceeded { reply }) => {
            Ok(apply_reply(state, message, reply))
        }

        (ConvState::Sending { .. }, Event::SendFailed { error }) => {
            let new_state = ConversationState {
                phase: ConvState::Idle,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::DismissPending)
                .with_effect(Effect::render_send_error(&error.message))
                .with_effects(settle_input()))
        }

        // Busy: the input surface is disabled, so these are invariant breaks
        (ConvState::Sending { .. }, Event::UserSubmit { .. })
        | (ConvState::Sending { .. }, Event::NewConversation)
        | (ConvState::Sending { .. }, Event::SelectSession { .. }) => {
            Err(TransitionError::SendInFlight)
        }

        // ============================================================
        // New conversation
        // ============================================================
        (ConvState::Idle, Event::NewConversation) => {
            let new_state = ConversationState {
                active_session_id: None,
                view_epoch: state.view_epoch + 1,
                pending_selection: None,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::ClearTranscript)
                .with_effect(Effect::title(NEW_CONVERSATION_TITLE))
                .with_effect(Effect::SetSessionLabel { label: None })
                .with_effect(Effect::HighlightSession { session_id: None })
                .with_effect(Effect::FocusInput))
        }

        // ============================================================
        // Session selection
        // ============================================================
        (ConvState::Idle, Event::SelectSession { session_id }) => {
            if !state.is_listed(&session_id) {
                return Err(TransitionError::UnknownSession(session_id));
            }
            let epoch = state.view_epoch + 1;
            let new_state = ConversationState {
                view_epoch: epoch,
                pending_selection: Some(PendingSelection {
                    session_id: session_id.clone(),
                    epoch,
                }),
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::FetchHistory { session_id, epoch }))
        }

        (
            _,
            Event::HistoryLoaded {
                session_id,
                epoch,
                messages,
            },
        ) => Ok(apply_history(state, session_id, epoch, &messages)),

        (
            _,
            Event::HistoryFailed {
                session_id,
                epoch,
                error,
            },
        ) => {
            let mut new_state = state.clone();
            if is_current_selection(state, &session_id, epoch) {
                new_state.pending_selection = None;
            }
            let message = if error.is_not_found() {
                format!("Session {session_id} no longer exists")
            } else {
                format!("Failed to load session {session_id}: {}", error.message)
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::report_background_failure("load_session", message)))
        }

        // ============================================================
        // Session directory refresh
        // ============================================================
        (_, Event::RefreshSessions) => Ok(request_refresh(state.clone())),

        (_, Event::SessionsLoaded { seq, sessions }) => Ok(apply_sessions(state, seq, sessions)),

        (_, Event::SessionsFailed { seq, error }) => Ok(TransitionResult::new(state.clone())
            .with_effect(Effect::report_background_failure(
                "refresh_sessions",
                format!("Failed to load sessions (request {seq}): {}", error.message),
            ))),

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (phase, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {phase:?} with event {}",
            event.name()
        ))),
    }
}

// Helper functions

/// Effects that end every send, successful or not
fn settle_input() -> [Effect; 2] {
    [Effect::set_input_enabled(true), Effect::FocusInput]
}

fn apply_reply(state: &ConversationState, message: &str, reply: ChatReply) -> TransitionResult {
    let mut new_state = ConversationState {
        phase: ConvState::Idle,
        ..state.clone()
    };
    let mut effects = vec![Effect::DismissPending];

    // The id is adopted once; later replies never move the conversation
    if new_state.active_session_id.is_none() {
        effects.push(Effect::SetSessionLabel {
            label: Some(session_label(&reply.session_id)),
        });
        effects.push(Effect::title(title_from_message(message)));
        new_state.active_session_id = Some(reply.session_id.clone());
    }

    let text = reply.reply_text().map(str::to_string);
    effects.extend(
        reply
            .tool_calls
            .into_iter()
            .map(|invocation| Effect::RenderTool { invocation }),
    );
    if let Some(text) = text {
        effects.push(Effect::render_assistant(text));
    }

    let refreshed = request_refresh(new_state);
    TransitionResult::new(refreshed.new_state)
        .with_effects(effects)
        .with_effects(refreshed.effects)
        .with_effects(settle_input())
}

fn request_refresh(state: ConversationState) -> TransitionResult {
    let seq = state.refresh_issued + 1;
    let new_state = ConversationState {
        refresh_issued: seq,
        ..state
    };
    TransitionResult::new(new_state).with_effect(Effect::FetchSessions { seq })
}

fn apply_sessions(
    state: &ConversationState,
    seq: u64,
    sessions: Vec<SessionSummary>,
) -> TransitionResult {
    if seq <= state.refresh_applied {
        return TransitionResult::new(state.clone()).with_effect(Effect::discard_stale(
            "refresh_sessions",
            format!(
                "request {seq} answered after request {}",
                state.refresh_applied
            ),
        ));
    }

    let new_state = ConversationState {
        refresh_applied: seq,
        known_sessions: sessions.iter().map(|s| s.session_id.clone()).collect(),
        ..state.clone()
    };
    // Highlight from the state at apply time, not at issue time
    let active = new_state.active_session_id.clone();
    TransitionResult::new(new_state).with_effect(Effect::RenderSessions { sessions, active })
}

fn is_current_selection(state: &ConversationState, session_id: &str, epoch: u64) -> bool {
    state
        .pending_selection
        .as_ref()
        .is_some_and(|p| p.session_id == session_id && p.epoch == epoch)
        && state.view_epoch == epoch
}

fn apply_history(
    state: &ConversationState,
    session_id: String,
    epoch: u64,
    messages: &[HistoryMessage],
) -> TransitionResult {
    if !is_current_selection(state, &session_id, epoch) {
        return TransitionResult::new(state.clone()).with_effect(Effect::discard_stale(
            "load_session",
            format!(
                "history for {session_id} (epoch {epoch}) superseded by epoch {}",
                state.view_epoch
            ),
        ));
    }

    let turns: Vec<Turn> = messages.iter().filter_map(Turn::from_history).collect();
    let new_state = ConversationState {
        active_session_id: Some(session_id.clone()),
        pending_selection: None,
        ..state.clone()
    };
    TransitionResult::new(new_state)
        .with_effect(Effect::ReplaceTranscript { turns })
        .with_effect(Effect::title(title_from_history(messages)))
        .with_effect(Effect::SetSessionLabel {
            label: Some(session_label(&session_id)),
        })
        .with_effect(Effect::HighlightSession {
            session_id: Some(session_id),
        })
}
