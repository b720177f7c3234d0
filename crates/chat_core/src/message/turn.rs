//! Turn - One message unit in a conversation
//!
//! Turns are immutable once created. Assistant turns produced from a
//! successful backend reply carry `TurnMetadata`; every other turn has none.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::source::Source;

/// Label shown in place of the source list when a reply cited no sources.
pub const NO_SOURCES_LABEL: &str = "none";

/// Who produced a turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Provenance attached to an assistant turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TurnMetadata {
    /// Specialist that produced the answer. Never empty.
    pub route: String,
    /// Where the answer came from, in backend order. May be empty.
    pub sources: Vec<Source>,
}

impl TurnMetadata {
    pub fn new(route: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            route: route.into(),
            sources,
        }
    }

    /// Comma-joined source types, or `none` when no source was cited.
    pub fn sources_label(&self) -> String {
        if self.sources.is_empty() {
            return NO_SOURCES_LABEL.to_string();
        }
        self.sources
            .iter()
            .map(|s| s.kind.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// One-line provenance summary, e.g. `route: db | sources: sql, web`.
    pub fn provenance_label(&self) -> String {
        format!("route: {} | sources: {}", self.route, self.sources_label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TurnMetadata>,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self::build(Role::User, content.into(), None)
    }

    pub fn assistant(content: impl Into<String>, metadata: TurnMetadata) -> Self {
        Self::build(Role::Assistant, content.into(), Some(metadata))
    }

    /// Assistant turn with no provenance, used when the backend could not be reached.
    pub fn assistant_error(content: impl Into<String>) -> Self {
        Self::build(Role::Assistant, content.into(), None)
    }

    fn build(role: Role, content: String, metadata: Option<TurnMetadata>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            metadata,
            created_at: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }

    /// Provenance line for display. `None` for turns without metadata.
    pub fn provenance_label(&self) -> Option<String> {
        self.metadata.as_ref().map(TurnMetadata::provenance_label)
    }
}
