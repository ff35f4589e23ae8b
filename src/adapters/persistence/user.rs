use async_trait::async_trait;

use crate::{
    adapters::persistence::{SqlitePersistence, now_unix},
    app_error::{AppError, AppResult},
    domain::entities::user::User,
    use_cases::user::UserRepo,
};

// User row as stored in the db.
#[derive(sqlx::FromRow, Debug)]
struct UserDb {
    id: i64,
    username: String,
    password_hash: String,
    created_at: i64,
}

impl From<UserDb> for User {
    fn from(row: UserDb) -> Self {
        User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UserRepo for SqlitePersistence {
    async fn create(&self, username: &str, password_hash: &str) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserDb>(
            r#"
                INSERT INTO users (username, password_hash, created_at)
                VALUES (?1, ?2, ?3)
                RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(now_unix())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict("Username already exists".into()),
            other => other,
        })?;
        Ok(row.into())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserDb>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
