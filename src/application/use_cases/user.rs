use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        password::{hash_password, verify_password},
        token::{TokenCodec, TokenError},
        validators::{is_valid_password, is_valid_username, normalize_username},
    },
    domain::entities::user::User,
};

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Fails with `AppError::Conflict` when the username is taken.
    async fn create(&self, username: &str, password_hash: &str) -> AppResult<User>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn count(&self) -> AppResult<i64>;
}

#[derive(Clone)]
pub struct AuthUseCases {
    repo: Arc<dyn UserRepo>,
    tokens: Arc<TokenCodec>,
}

impl AuthUseCases {
    pub fn new(repo: Arc<dyn UserRepo>, tokens: Arc<TokenCodec>) -> Self {
        Self { repo, tokens }
    }

    /// Returns the normalized username that was stored.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> AppResult<String> {
        let username = normalize_username(username);
        if username.is_empty() || password.is_empty() {
            return Err(AppError::InvalidInput(
                "Username and password required".into(),
            ));
        }
        if !is_valid_username(&username) || !is_valid_password(password) {
            return Err(AppError::InvalidInput(
                "Username or password too long".into(),
            ));
        }

        let password = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))??;

        self.repo.create(&username, &password_hash).await?;
        tracing::info!(%username, "User registered");
        Ok(username)
    }

    /// Returns a bearer token for the normalized username.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> AppResult<String> {
        let username = normalize_username(username);
        let Some(user) = self.repo.find_by_username(&username).await? else {
            return Err(AppError::InvalidCredentials);
        };

        let password = password.to_owned();
        let stored = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        if !matches {
            return Err(AppError::InvalidCredentials);
        }

        self.tokens.issue(&user.username)
    }

    /// Resolve a bearer token to its subject.
    pub fn authenticate(&self, token: &str) -> Result<String, TokenError> {
        self.tokens.verify(token)
    }

    pub async fn user_count(&self) -> AppResult<i64> {
        self.repo.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{InMemoryUserRepo, test_token_codec};

    fn use_cases() -> (AuthUseCases, Arc<InMemoryUserRepo>) {
        let repo = Arc::new(InMemoryUserRepo::new());
        let auth = AuthUseCases::new(repo.clone(), Arc::new(test_token_codec()));
        (auth, repo)
    }

    #[tokio::test]
    async fn register_normalizes_and_hashes() {
        let (auth, repo) = use_cases();

        let username = auth.register("  Andrea ", "hunter2").await.unwrap();
        assert_eq!(username, "andrea");

        let stored = repo.find_by_username("andrea").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "hunter2");
        assert!(verify_password("hunter2", &stored.password_hash));
    }

    #[tokio::test]
    async fn register_rejects_blank_fields() {
        let (auth, _) = use_cases();
        assert!(matches!(
            auth.register("   ", "pw").await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            auth.register("andrea", "").await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn register_twice_conflicts() {
        let (auth, _) = use_cases();
        auth.register("andrea", "pw").await.unwrap();
        assert!(matches!(
            auth.register("ANDREA", "other").await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn login_issues_token_for_normalized_name() {
        let (auth, _) = use_cases();
        auth.register("andrea", "pw").await.unwrap();

        let token = auth.login(" Andrea", "pw").await.unwrap();
        assert_eq!(auth.authenticate(&token).unwrap(), "andrea");
    }

    #[tokio::test]
    async fn login_with_bad_credentials_fails_uniformly() {
        let (auth, _) = use_cases();
        auth.register("andrea", "pw").await.unwrap();

        assert!(matches!(
            auth.login("andrea", "wrong").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody", "pw").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn user_count_tracks_registrations() {
        let (auth, _) = use_cases();
        assert_eq!(auth.user_count().await.unwrap(), 0);
        auth.register("a", "pw").await.unwrap();
        auth.register("b", "pw").await.unwrap();
        assert_eq!(auth.user_count().await.unwrap(), 2);
    }
}
