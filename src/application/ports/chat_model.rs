use async_trait::async_trait;

use crate::{app_error::AppResult, domain::entities::chat_message::ChatMessage};

/// Completion backend for chat and summarize.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// `messages` is the full prompt in order: system first, newest user turn last.
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> AppResult<String>;
}
