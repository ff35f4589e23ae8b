use async_trait::async_trait;

use crate::{
    adapters::persistence::{SqlitePersistence, now_unix},
    app_error::AppResult,
    domain::entities::content::{ContentItem, ContentSummary},
    use_cases::content::ContentRepo,
};

#[derive(sqlx::FromRow, Debug)]
struct ContentDb {
    id: i64,
    title: String,
    body: String,
    created_at: i64,
}

impl From<ContentDb> for ContentItem {
    fn from(row: ContentDb) -> Self {
        ContentItem {
            id: row.id,
            title: row.title,
            body: row.body,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow, Debug)]
struct ContentSummaryDb {
    id: i64,
    title: String,
    created_at: i64,
}

#[async_trait]
impl ContentRepo for SqlitePersistence {
    async fn insert(&self, title: &str, body: &str) -> AppResult<ContentItem> {
        let row = sqlx::query_as::<_, ContentDb>(
            r#"
                INSERT INTO content (title, body, created_at)
                VALUES (?1, ?2, ?3)
                RETURNING id, title, body, created_at
            "#,
        )
        .bind(title)
        .bind(body)
        .bind(now_unix())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn list(&self) -> AppResult<Vec<ContentSummary>> {
        let rows = sqlx::query_as::<_, ContentSummaryDb>(
            "SELECT id, title, created_at FROM content ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| ContentSummary {
                id: r.id,
                title: r.title,
                created_at: r.created_at,
            })
            .collect())
    }

    async fn search(&self, query: &str) -> AppResult<Vec<ContentItem>> {
        // SQLite's lower() only folds ASCII, so matching is done on our side.
        let rows = sqlx::query_as::<_, ContentDb>(
            "SELECT id, title, body, created_at FROM content ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(ContentItem::from)
            .filter(|item| item.matches(query))
            .collect())
    }

    async fn recent(&self, limit: i64) -> AppResult<Vec<ContentItem>> {
        let rows = sqlx::query_as::<_, ContentDb>(
            "SELECT id, title, body, created_at FROM content ORDER BY id DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ContentItem::from).collect())
    }

    async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM content")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
