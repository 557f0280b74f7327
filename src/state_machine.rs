//! Core conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
#[cfg(test)]
pub use effect::ERROR_MARKER;
pub use event::Event;
pub use state::{ConversationState, Role, Turn};
pub use transition::transition;
