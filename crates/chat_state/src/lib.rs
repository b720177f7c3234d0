//! chat_state - Session state and submission control for router chat
//!
//! This crate provides the phase machine for a chat session and the
//! `ChatSession` controller that owns the conversation log.

pub mod machine;
pub mod session;

// Re-export commonly used types
pub use machine::{SessionEvent, SessionPhase, StateMachine, StateTransition, TransitionError};
pub use session::{
    ChatSession, PendingSubmission, SubmitOutcome, SubmitRejected, BACKEND_ERROR_MESSAGE,
};
