//! Session phases - Defines the lifecycle of one submission

use serde::{Deserialize, Serialize};

/// Phase of a chat session.
///
/// A session is busy exactly while it is `AwaitingResponse`. There is no
/// retry or cancellation phase: every request ends back in `Idle`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Awaiting user input.
    #[default]
    Idle,

    /// A request is outstanding.
    AwaitingResponse,
}

impl SessionPhase {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::AwaitingResponse)
    }

    pub fn accepts_submission(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Human-readable status for a working indicator.
    pub fn description(&self) -> &str {
        match self {
            Self::Idle => "Ready for input",
            Self::AwaitingResponse => "Thinking...",
        }
    }
}
