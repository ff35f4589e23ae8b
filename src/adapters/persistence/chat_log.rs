use std::str::FromStr;

use async_trait::async_trait;

use crate::{
    adapters::persistence::{SqlitePersistence, now_unix},
    app_error::{AppError, AppResult},
    domain::entities::chat_message::{ChatMessage, ChatRole},
    use_cases::chat::ChatLogRepo,
};

#[derive(sqlx::FromRow, Debug)]
struct ChatLogDb {
    role: String,
    content: String,
}

impl TryFrom<ChatLogDb> for ChatMessage {
    type Error = AppError;

    fn try_from(row: ChatLogDb) -> Result<Self, Self::Error> {
        let role = ChatRole::from_str(&row.role)
            .map_err(|_| AppError::Internal(format!("unknown chat role: {}", row.role)))?;
        Ok(ChatMessage {
            role,
            content: row.content,
        })
    }
}

#[async_trait]
impl ChatLogRepo for SqlitePersistence {
    async fn append(&self, session_id: &str, message: &ChatMessage) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO chat_logs (session_id, role, content, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(session_id)
        .bind(message.role.as_ref())
        .bind(&message.content)
        .bind(now_unix())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent(&self, session_id: &str, limit: i64) -> AppResult<Vec<ChatMessage>> {
        let mut rows = sqlx::query_as::<_, ChatLogDb>(
            "SELECT role, content FROM chat_logs WHERE session_id = ?1 ORDER BY id DESC LIMIT ?2",
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        // Restore chronological order.
        rows.reverse();
        rows.into_iter().map(ChatMessage::try_from).collect()
    }
}
