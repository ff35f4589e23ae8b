use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::{Deserialize, Serialize};

use crate::{adapters::http::app_state::AppState, app_error::AppResult};

#[derive(Deserialize)]
struct CredentialsPayload {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct RegisterResponse {
    message: &'static str,
    username: String,
}

#[derive(Serialize)]
struct LoginResponse {
    access_token: String,
    token_type: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<CredentialsPayload>,
) -> AppResult<impl IntoResponse> {
    let username = app_state
        .auth_use_cases
        .register(&payload.username, &payload.password)
        .await?;
    Ok(Json(RegisterResponse {
        message: "registered",
        username,
    }))
}

async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<CredentialsPayload>,
) -> AppResult<impl IntoResponse> {
    let access_token = app_state
        .auth_use_cases
        .login(&payload.username, &payload.password)
        .await?;
    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer",
    }))
}
