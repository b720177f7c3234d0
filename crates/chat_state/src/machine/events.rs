//! Session events - Defines events that trigger phase transitions

use serde::{Deserialize, Serialize};

/// Defines the events that can trigger phase transitions in the FSM.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    /// User submitted a non-empty draft and a request went out.
    UserMessageSent,

    /// The router answered and the assistant turn was appended.
    ResponseReceived { route: String },

    /// The request failed and the error turn was appended.
    GatewayFailed { error: String },
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserMessageSent => "user_message_sent",
            Self::ResponseReceived { .. } => "response_received",
            Self::GatewayFailed { .. } => "gateway_failed",
        }
    }
}
