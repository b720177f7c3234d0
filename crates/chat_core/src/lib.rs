//! chat_core - Core types for the router chat client
//!
//! This crate provides the foundational types used across all chat-related crates:
//! - `message` - Turn, TurnMetadata and Source provenance types
//! - `config` - Client configuration (file + environment)

pub mod config;
pub mod message;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use message::{Role, Source, Turn, TurnMetadata, NO_SOURCES_LABEL};
