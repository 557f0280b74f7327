//! Runtime for driving a conversation
//!
//! The controller feeds user actions and backend completions through the
//! state machine and applies the effects to the views. Backend calls run as
//! tokio tasks that report back over a channel.

mod executor;


pub use executor::ConversationController;
