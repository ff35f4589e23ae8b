//! Test app state builder for HTTP-level testing.
//!
//! `TestAppStateBuilder` creates an `AppState` wired to in-memory repositories
//! and the stub chat model.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

use crate::{
    adapters::{http::app_state::AppState, llm::StubChatModel},
    application::{
        cache::{SearchCache, SessionMemory},
        token::TokenCodec,
    },
    infra::{config::AppConfig, rate_limit::RateLimiterTrait},
    test_utils::{AllowAllRateLimiter, InMemoryChatLogRepo, InMemoryContentRepo, InMemoryUserRepo},
    use_cases::{chat::ChatUseCases, content::ContentUseCases, user::AuthUseCases},
};

pub const TEST_TOKEN_SECRET: &str = "test-secret";
pub const TEST_DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

pub fn test_token_codec() -> TokenCodec {
    TokenCodec::new(SecretString::new(TEST_TOKEN_SECRET.into()))
}

/// `Authorization` header value for `username`, signed with the state's secret.
pub fn bearer_for(app_state: &AppState, username: &str) -> String {
    assert_eq!(app_state.config.token_secret.expose_secret(), TEST_TOKEN_SECRET);
    format!("Bearer {}", test_token_codec().issue(username).unwrap())
}

pub fn test_config() -> AppConfig {
    AppConfig {
        token_secret: SecretString::new(TEST_TOKEN_SECRET.into()),
        database_url: "sqlite::memory:".to_string(),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        app_env: "dev".to_string(),
        cors_origin: None,
        default_model: TEST_DEFAULT_MODEL.to_string(),
        chat_history_limit: 20,
        content_context_limit: 3,
        redis_url: None,
        rate_limit_window_secs: 60,
        rate_limit_per_ip: 1_000,
        trust_proxy: false,
    }
}

/// # Example
///
/// ```ignore
/// let app_state = TestAppStateBuilder::new().with_env("test").build();
/// let server = TestServer::new(routes::router(app_state.clone()).with_state(app_state)).unwrap();
/// ```
pub struct TestAppStateBuilder {
    config: AppConfig,
    rate_limiter: Arc<dyn RateLimiterTrait>,
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            config: test_config(),
            rate_limiter: Arc::new(AllowAllRateLimiter),
        }
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimiterTrait>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn with_cors_origin(mut self, origin: &'static str) -> Self {
        self.config.cors_origin = Some(HeaderValue::from_static(origin));
        self
    }

    pub fn with_trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.config.trust_proxy = trust_proxy;
        self
    }

    pub fn with_env(mut self, env: &str) -> Self {
        self.config.app_env = env.to_string();
        self
    }

    pub fn build(self) -> AppState {
        let tokens = Arc::new(test_token_codec());
        let content_repo = Arc::new(InMemoryContentRepo::new());

        let auth_use_cases = AuthUseCases::new(Arc::new(InMemoryUserRepo::new()), tokens);
        let content_use_cases =
            ContentUseCases::new(content_repo.clone(), Arc::new(SearchCache::new()));
        let chat_use_cases = ChatUseCases::new(
            Arc::new(InMemoryChatLogRepo::new()),
            content_repo,
            Arc::new(StubChatModel),
            Arc::new(SessionMemory::new(
                usize::try_from(self.config.chat_history_limit).unwrap_or(0),
            )),
            self.config.chat_history_limit,
            self.config.content_context_limit,
        );

        AppState {
            config: Arc::new(self.config),
            auth_use_cases: Arc::new(auth_use_cases),
            chat_use_cases: Arc::new(chat_use_cases),
            content_use_cases: Arc::new(content_use_cases),
            rate_limiter: self.rate_limiter,
        }
    }
}
