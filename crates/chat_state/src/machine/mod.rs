//! State machine module
//!
//! Contains the FSM for a chat session's submission lifecycle.

mod events;
mod states;
mod transitions;

pub use events::SessionEvent;
pub use states::SessionPhase;
pub use transitions::{StateMachine, StateTransition, TransitionError};
