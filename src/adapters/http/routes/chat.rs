use axum::{Extension, Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::{app_state::AppState, middleware::CurrentUser},
    app_error::AppResult,
};

#[derive(Deserialize)]
struct ChatPayload {
    message: String,
    model: Option<String>,
    session_id: Option<String>,
}

#[derive(Deserialize)]
struct SummarizePayload {
    text: String,
    model: Option<String>,
    session_id: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
    model: String,
    session_id: String,
}

#[derive(Serialize)]
struct SummarizeResponse {
    summary: String,
    model: String,
    session_id: String,
    original_length: usize,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/summarize", post(summarize))
}

async fn chat(
    State(app_state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ChatPayload>,
) -> AppResult<impl IntoResponse> {
    let model = payload
        .model
        .unwrap_or_else(|| app_state.config.default_model.clone());
    let out = app_state
        .chat_use_cases
        .chat(&user.username, &payload.message, &model, payload.session_id)
        .await?;
    Ok(Json(ChatResponse {
        reply: out.reply,
        model,
        session_id: out.session_id,
    }))
}

async fn summarize(
    State(app_state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<SummarizePayload>,
) -> AppResult<impl IntoResponse> {
    let model = payload
        .model
        .unwrap_or_else(|| app_state.config.default_model.clone());
    let out = app_state
        .chat_use_cases
        .summarize(&user.username, &payload.text, &model, payload.session_id)
        .await?;
    Ok(Json(SummarizeResponse {
        summary: out.summary,
        model,
        session_id: out.session_id,
        original_length: payload.text.chars().count(),
    }))
}
