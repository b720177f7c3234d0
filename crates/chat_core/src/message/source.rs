//! Source - provenance entry returned by the router

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A provenance entry: `{ "type": ..., ...extra }`.
///
/// Only `type` is interpreted. Everything else the backend sends alongside it
/// (for example a `meta` object) is kept untouched in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Source {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Source {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            extra: Map::new(),
        }
    }
}
