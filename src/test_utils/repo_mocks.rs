//! In-memory implementations of the repository and model ports.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::chat_model::ChatModel,
    domain::entities::{
        chat_message::ChatMessage,
        content::{ContentItem, ContentSummary},
        user::User,
    },
    infra::RateLimiterTrait,
    use_cases::{chat::ChatLogRepo, content::ContentRepo, user::UserRepo},
};

// ============================================================================
// InMemoryUserRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserRepo {
    pub users: Mutex<HashMap<String, User>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn create(&self, username: &str, password_hash: &str) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(username) {
            return Err(AppError::Conflict("Username already exists".into()));
        }
        let user = User {
            id: users.len() as i64 + 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: 1_700_000_000,
        };
        users.insert(username.to_string(), user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(username).cloned())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.users.lock().unwrap().len() as i64)
    }
}

// ============================================================================
// InMemoryContentRepo
// ============================================================================

/// Items are kept in insertion order; ids are sequential from 1.
#[derive(Default)]
pub struct InMemoryContentRepo {
    pub items: Mutex<Vec<ContentItem>>,
}

impl InMemoryContentRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentRepo for InMemoryContentRepo {
    async fn insert(&self, title: &str, body: &str) -> AppResult<ContentItem> {
        let mut items = self.items.lock().unwrap();
        let item = ContentItem {
            id: items.len() as i64 + 1,
            title: title.to_string(),
            body: body.to_string(),
            created_at: 1_700_000_000,
        };
        items.push(item.clone());
        Ok(item)
    }

    async fn list(&self) -> AppResult<Vec<ContentSummary>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .rev()
            .map(|i| ContentSummary {
                id: i.id,
                title: i.title.clone(),
                created_at: i.created_at,
            })
            .collect())
    }

    async fn search(&self, query: &str) -> AppResult<Vec<ContentItem>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|i| i.matches(query))
            .cloned()
            .collect())
    }

    async fn recent(&self, limit: i64) -> AppResult<Vec<ContentItem>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.items.lock().unwrap().len() as i64)
    }
}

// ============================================================================
// InMemoryChatLogRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryChatLogRepo {
    pub entries: Mutex<Vec<(String, ChatMessage)>>,
}

impl InMemoryChatLogRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message logged for a session, oldest first.
    pub fn messages(&self, session_id: &str) -> Vec<ChatMessage> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s == session_id)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

#[async_trait]
impl ChatLogRepo for InMemoryChatLogRepo {
    async fn append(&self, session_id: &str, message: &ChatMessage) -> AppResult<()> {
        self.entries
            .lock()
            .unwrap()
            .push((session_id.to_string(), message.clone()));
        Ok(())
    }

    async fn recent(&self, session_id: &str, limit: i64) -> AppResult<Vec<ChatMessage>> {
        let all = self.messages(session_id);
        let skip = all.len().saturating_sub(limit.max(0) as usize);
        Ok(all.into_iter().skip(skip).collect())
    }
}

// ============================================================================
// RecordingChatModel
// ============================================================================

/// Replies with a fixed string and keeps every prompt it was given.
pub struct RecordingChatModel {
    reply: String,
    pub prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl RecordingChatModel {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_prompt(&self) -> Vec<ChatMessage> {
        self.prompts
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("model was never called")
    }
}

#[async_trait]
impl ChatModel for RecordingChatModel {
    async fn complete(&self, _model: &str, messages: &[ChatMessage]) -> AppResult<String> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        Ok(self.reply.clone())
    }
}

// ============================================================================
// AllowAllRateLimiter
// ============================================================================

#[derive(Default)]
pub struct AllowAllRateLimiter;

#[async_trait]
impl RateLimiterTrait for AllowAllRateLimiter {
    async fn check(&self, _ip: &str) -> AppResult<()> {
        Ok(())
    }
}
