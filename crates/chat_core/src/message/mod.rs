//! Message module - Conversation turn types
//!
//! Shared turn and provenance types used across the system.

mod source;
mod turn;

pub use source::Source;
pub use turn::{Role, Turn, TurnMetadata, NO_SOURCES_LABEL};
