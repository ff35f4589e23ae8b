use std::sync::Arc;

use crate::{
    infra::{config::AppConfig, rate_limit::RateLimiterTrait},
    use_cases::{chat::ChatUseCases, content::ContentUseCases, user::AuthUseCases},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth_use_cases: Arc<AuthUseCases>,
    pub chat_use_cases: Arc<ChatUseCases>,
    pub content_use_cases: Arc<ContentUseCases>,
    pub rate_limiter: Arc<dyn RateLimiterTrait>,
}
