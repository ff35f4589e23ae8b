use async_trait::async_trait;

use crate::{
    app_error::AppResult,
    application::ports::chat_model::ChatModel,
    domain::entities::chat_message::{ChatMessage, ChatRole},
};

/// Offline stand-in for a hosted completion API. Echoes the latest user turn.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubChatModel;

#[async_trait]
impl ChatModel for StubChatModel {
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> AppResult<String> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        tracing::debug!(model, messages = messages.len(), "Stub completion");
        Ok(format!("(stubbed {model}) I heard you say: {last_user}"))
    }
}
