//! chat_gateway - Remote gateway to the router chat backend
//!
//! One `POST /chat` per call, strict reply validation, no retries.

pub mod api;
pub mod client_trait;
pub mod error;
pub mod utils;

pub use api::client::HttpChatGateway;
pub use api::models::{ChatReply, ClearHistoryResponse, HealthStatus, HistoryEntry, HistoryPage};
pub use client_trait::ChatGateway;
pub use error::GatewayError;
