use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use serde_json::json;

use crate::{adapters::http::app_state::AppState, app_error::AppResult, infra::config::APP_NAME};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/system/profile", get(profile))
        .route("/analytics/users", get(user_count))
        .route("/analytics/content", get(content_count))
}

async fn health(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "status": "ok", "env": app_state.config.app_env }))
}

async fn profile(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "app": APP_NAME,
        "env": app_state.config.app_env,
        "has_cache_entries": app_state.content_use_cases.cached_queries(),
        "active_sessions": app_state.chat_use_cases.active_sessions(),
    }))
}

async fn user_count(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let count = app_state.auth_use_cases.user_count().await?;
    Ok(Json(json!({ "user_count": count })))
}

async fn content_count(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let count = app_state.content_use_cases.count().await?;
    Ok(Json(json!({ "content_count": count })))
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use serde_json::json;

    use crate::adapters::http::routes;
    use crate::test_utils::{TestAppStateBuilder, bearer_for};

    #[tokio::test]
    async fn health_reports_env() {
        let app_state = TestAppStateBuilder::new().with_env("test").build();
        let server = TestServer::new(routes::router(app_state.clone()).with_state(app_state))
            .unwrap();

        let response = server.get("/health").await;
        response.assert_status_ok();
        response.assert_json(&json!({ "status": "ok", "env": "test" }));
    }

    #[tokio::test]
    async fn profile_counts_caches() {
        let app_state = TestAppStateBuilder::new().with_env("test").build();
        let auth = bearer_for(&app_state, "andrea");
        let server = TestServer::new(routes::router(app_state.clone()).with_state(app_state))
            .unwrap();

        server
            .post("/content/search")
            .json(&json!({ "query": "anything" }))
            .await
            .assert_status_ok();
        server
            .post("/chat")
            .add_header("Authorization", auth)
            .json(&json!({ "message": "hi", "session_id": "s1" }))
            .await
            .assert_status_ok();

        let response = server.get("/system/profile").await;
        response.assert_json(&json!({
            "app": "AISE Monolith Practice",
            "env": "test",
            "has_cache_entries": 1,
            "active_sessions": 1,
        }));
    }

    #[tokio::test]
    async fn analytics_counts() {
        let app_state = TestAppStateBuilder::new().build();
        let auth = bearer_for(&app_state, "andrea");
        let server = TestServer::new(routes::router(app_state.clone()).with_state(app_state))
            .unwrap();

        server
            .post("/register")
            .json(&json!({ "username": "andrea", "password": "pw" }))
            .await
            .assert_status_ok();
        server
            .post("/content/create")
            .add_header("Authorization", auth)
            .json(&json!({ "title": "t", "body": "b" }))
            .await
            .assert_status_ok();

        server
            .get("/analytics/users")
            .await
            .assert_json(&json!({ "user_count": 1 }));
        server
            .get("/analytics/content")
            .await
            .assert_json(&json!({ "content_count": 1 }));
    }
}
