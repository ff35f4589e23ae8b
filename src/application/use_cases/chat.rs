use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    app_error::AppResult,
    application::{
        cache::SessionMemory, ports::chat_model::ChatModel, use_cases::content::ContentRepo,
    },
    domain::entities::{
        chat_message::ChatMessage,
        content::{ContentItem, truncate_chars},
    },
};

/// Body characters per content item in the prompt context.
const CONTEXT_SNIPPET_CHARS: usize = 200;
const EMPTY_CONTEXT: &str = "No content available yet.";

#[async_trait]
pub trait ChatLogRepo: Send + Sync {
    async fn append(&self, session_id: &str, message: &ChatMessage) -> AppResult<()>;
    /// The `limit` newest messages of a session, oldest first.
    async fn recent(&self, session_id: &str, limit: i64) -> AppResult<Vec<ChatMessage>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub summary: String,
    pub session_id: String,
}

#[derive(Clone)]
pub struct ChatUseCases {
    logs: Arc<dyn ChatLogRepo>,
    content: Arc<dyn ContentRepo>,
    model: Arc<dyn ChatModel>,
    memory: Arc<SessionMemory>,
    history_limit: i64,
    context_limit: i64,
}

impl ChatUseCases {
    pub fn new(
        logs: Arc<dyn ChatLogRepo>,
        content: Arc<dyn ContentRepo>,
        model: Arc<dyn ChatModel>,
        memory: Arc<SessionMemory>,
        history_limit: i64,
        context_limit: i64,
    ) -> Self {
        Self {
            logs,
            content,
            model,
            memory,
            history_limit,
            context_limit,
        }
    }

    #[instrument(skip(self, message))]
    pub async fn chat(
        &self,
        username: &str,
        message: &str,
        model: &str,
        session_id: Option<String>,
    ) -> AppResult<ChatReply> {
        let session_id = session_id.unwrap_or_else(|| format!("{username}-{}", now_unix()));

        let history = self.load_history(&session_id).await?;
        let context = self.content_context().await?;
        let system_prompt = format!(
            "You are an AI assistant for the AISE program.\n\
             Use the following content context when helpful:\n\
             {context}"
        );

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend(history);
        messages.push(ChatMessage::user(message));

        let reply = self.model.complete(model, &messages).await?;

        // A message reaches the session memory only after the store accepted it.
        for entry in [ChatMessage::user(message), ChatMessage::assistant(&reply)] {
            self.logs.append(&session_id, &entry).await?;
            self.memory.append(&session_id, std::slice::from_ref(&entry));
        }

        Ok(ChatReply { reply, session_id })
    }

    #[instrument(skip(self, text), fields(text_len = text.chars().count()))]
    pub async fn summarize(
        &self,
        username: &str,
        text: &str,
        model: &str,
        session_id: Option<String>,
    ) -> AppResult<Summary> {
        let session_id = session_id.unwrap_or_else(|| format!("{username}-sum-{}", now_unix()));

        let prompt = format!("Summarize in 2-3 sentences:\n\n{text}");
        let context = self.content_context().await?;
        let system_prompt = format!(
            "You summarize for AISE program notes.\n\
             Consider this content context:\n\
             {context}"
        );
        let messages = [ChatMessage::system(system_prompt), ChatMessage::user(&prompt)];

        let summary = self.model.complete(model, &messages).await?;

        // Summaries are logged but not added to session memory.
        self.logs
            .append(&session_id, &ChatMessage::user(prompt))
            .await?;
        self.logs
            .append(&session_id, &ChatMessage::assistant(&summary))
            .await?;

        Ok(Summary {
            summary,
            session_id,
        })
    }

    pub fn active_sessions(&self) -> usize {
        self.memory.len()
    }

    async fn load_history(&self, session_id: &str) -> AppResult<Vec<ChatMessage>> {
        if let Some(history) = self.memory.get(session_id) {
            return Ok(history);
        }
        let history = self.logs.recent(session_id, self.history_limit).await?;
        self.memory.seed(session_id, history.clone());
        Ok(history)
    }

    async fn content_context(&self) -> AppResult<String> {
        let items = self.content.recent(self.context_limit).await?;
        Ok(format_context(&items))
    }
}

fn format_context(items: &[ContentItem]) -> String {
    if items.is_empty() {
        return EMPTY_CONTEXT.to_string();
    }
    items
        .iter()
        .map(|item| {
            format!(
                "- {}: {}",
                item.title,
                truncate_chars(&item.body, CONTEXT_SNIPPET_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn now_unix() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}
