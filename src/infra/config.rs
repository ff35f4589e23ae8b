use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;

pub const APP_NAME: &str = "AISE Monolith Practice";

pub struct AppConfig {
    /// HMAC key for bearer tokens. Must come from the environment.
    pub token_secret: SecretString,
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub app_env: String,
    /// `None` means any origin (the request origin is mirrored).
    pub cors_origin: Option<HeaderValue>,
    pub default_model: String,
    pub chat_history_limit: i64,
    pub content_context_limit: i64,
    /// When unset, rate limiting is process-local.
    pub redis_url: Option<String>,
    pub rate_limit_window_secs: u64,
    pub rate_limit_per_ip: u64,
    /// Whether to trust X-Forwarded-For headers. Only enable behind a reverse proxy.
    pub trust_proxy: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let token_secret = SecretString::new(get_env::<String>("TOKEN_SECRET").into());

        let database_url: String =
            get_env_default("DATABASE_URL", "sqlite://app.db?mode=rwc".to_string());
        let bind_addr: SocketAddr =
            get_env_default("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 8000)));
        let app_env: String = get_env_default("APP_ENV", "dev".to_string());

        let cors_origin: String = get_env_default("CORS_ORIGIN", "*".to_string());
        let cors_origin: Option<HeaderValue> = (cors_origin != "*").then(|| {
            cors_origin
                .parse()
                .expect("CORS_ORIGIN must be a valid header value")
        });

        let default_model: String =
            get_env_default("DEFAULT_MODEL", "llama-3.3-70b-versatile".to_string());
        let chat_history_limit: i64 = get_env_default("CHAT_HISTORY_LIMIT", 20);
        let content_context_limit: i64 = get_env_default("CONTENT_CONTEXT_LIMIT", 3);

        let redis_url: Option<String> = std::env::var("REDIS_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let rate_limit_window_secs: u64 = get_env_default("RATE_LIMIT_WINDOW_SECS", 60);
        let rate_limit_per_ip: u64 = get_env_default("RATE_LIMIT_PER_IP", 120);
        // Default to false - must explicitly enable when behind a trusted proxy
        let trust_proxy: bool = get_env_default("TRUST_PROXY", false);

        Self {
            token_secret,
            database_url,
            bind_addr,
            app_env,
            cors_origin,
            default_model,
            chat_history_limit,
            content_context_limit,
            redis_url,
            rate_limit_window_secs,
            rate_limit_per_ip,
            trust_proxy,
        }
    }
}
