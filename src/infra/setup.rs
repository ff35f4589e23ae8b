use crate::{
    adapters::{http::app_state::AppState, llm::StubChatModel},
    application::{
        cache::{SearchCache, SessionMemory},
        token::TokenCodec,
    },
    infra::{
        config::AppConfig,
        rate_limit::{LocalRateLimiter, RateLimiterTrait, RedisRateLimiter},
        sqlite_persistence,
    },
    use_cases::{
        chat::{ChatLogRepo, ChatUseCases},
        content::{ContentRepo, ContentUseCases},
        user::{AuthUseCases, UserRepo},
    },
};
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let sqlite_arc = Arc::new(sqlite_persistence(&config.database_url).await?);

    let rate_limiter: Arc<dyn RateLimiterTrait> = match &config.redis_url {
        Some(redis_url) => Arc::new(
            RedisRateLimiter::new(
                redis_url,
                config.rate_limit_window_secs,
                config.rate_limit_per_ip,
            )
            .await?,
        ),
        None => {
            tracing::info!("REDIS_URL not set, using in-process rate limiting");
            Arc::new(LocalRateLimiter::new(
                config.rate_limit_window_secs,
                config.rate_limit_per_ip,
            ))
        }
    };

    let tokens = Arc::new(TokenCodec::new(config.token_secret.clone()));
    let user_repo_arc = sqlite_arc.clone() as Arc<dyn UserRepo>;
    let content_repo_arc = sqlite_arc.clone() as Arc<dyn ContentRepo>;
    let chat_log_repo_arc = sqlite_arc.clone() as Arc<dyn ChatLogRepo>;

    let auth_use_cases = AuthUseCases::new(user_repo_arc, tokens);

    let content_use_cases =
        ContentUseCases::new(content_repo_arc.clone(), Arc::new(SearchCache::new()));

    let chat_use_cases = ChatUseCases::new(
        chat_log_repo_arc,
        content_repo_arc,
        Arc::new(StubChatModel),
        Arc::new(SessionMemory::new(
            usize::try_from(config.chat_history_limit).unwrap_or(0),
        )),
        config.chat_history_limit,
        config.content_context_limit,
    );

    Ok(AppState {
        config: Arc::new(config),
        auth_use_cases: Arc::new(auth_use_cases),
        chat_use_cases: Arc::new(chat_use_cases),
        content_use_cases: Arc::new(content_use_cases),
        rate_limiter,
    })
}

pub fn init_tracing(log_file: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "aise_api=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    // File (structured JSON logs), skipped if the file cannot be created
    let json_layer = match File::create(log_file) {
        Ok(file) => Some(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(true)
                .with_span_list(true),
        ),
        Err(err) => {
            eprintln!("cannot create log file {log_file}: {err}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
