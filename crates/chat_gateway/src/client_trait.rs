use async_trait::async_trait;

use crate::api::models::ChatReply;
use crate::error::Result;

#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Send one user message and wait for the router's reply.
    ///
    /// Exactly one backend request per call; no retries.
    async fn chat(&self, user_id: &str, message: &str) -> Result<ChatReply>;
}
