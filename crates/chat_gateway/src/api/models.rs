//! Wire types for the router API and the strict decode of chat replies.

use chat_core::{Source, Turn, TurnMetadata};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GatewayError, Result};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest<'a> {
    pub user_id: &'a str,
    pub message: &'a str,
}

/// A validated reply from `POST /chat`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub answer: String,
    pub route: String,
    pub sources: Vec<Source>,
}

impl ChatReply {
    pub fn new(answer: impl Into<String>, route: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            answer: answer.into(),
            route: route.into(),
            sources,
        }
    }

    /// Assistant turn carrying this reply's answer and provenance.
    pub fn into_turn(self) -> Turn {
        Turn::assistant(self.answer, TurnMetadata::new(self.route, self.sources))
    }

    /// Decode a response body, rejecting anything that is not a usable reply.
    ///
    /// `answer` must be a string and `route` a non-empty string. `sources` may
    /// be absent or `null` (the backend sends `null` when nothing was
    /// consulted); otherwise every entry needs a string `type`.
    pub fn from_body(body: &str) -> Result<Self> {
        let wire: WireReply = serde_json::from_str(body)?;

        if let Some(debug) = &wire.debug {
            log::debug!("Router debug payload: {}", debug);
        }

        let answer = wire
            .answer
            .ok_or_else(|| GatewayError::MalformedReply("missing `answer`".to_string()))?;
        let route = match wire.route {
            Some(route) if !route.trim().is_empty() => route,
            Some(_) => {
                return Err(GatewayError::MalformedReply("empty `route`".to_string()));
            }
            None => {
                return Err(GatewayError::MalformedReply("missing `route`".to_string()));
            }
        };

        Ok(Self {
            answer,
            route,
            sources: wire.sources.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct WireReply {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    route: Option<String>,
    #[serde(default)]
    sources: Option<Vec<Source>>,
    #[serde(default)]
    debug: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// One stored exchange as the backend remembers it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HistoryPage {
    pub user_id: String,
    pub history: Vec<HistoryEntry>,
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClearHistoryResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}
