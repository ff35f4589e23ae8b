use axum::{
    Extension, Json, Router,
    extract::{Multipart, State},
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::{app_state::AppState, middleware::CurrentUser},
    app_error::{AppError, AppResult},
    domain::entities::content::{ContentSummary, SearchHit},
};

#[derive(Deserialize)]
struct CreatePayload {
    title: String,
    body: String,
}

#[derive(Deserialize)]
struct SearchPayload {
    query: String,
}

#[derive(Serialize)]
struct StoredResponse {
    message: String,
    id: i64,
}

#[derive(Serialize)]
struct ListResponse {
    items: Vec<ContentSummary>,
}

#[derive(Serialize)]
struct SearchResponse {
    cached: bool,
    results: Vec<SearchHit>,
}

/// Routes that need a bearer token; mounted behind `require_bearer`.
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/content/create", post(create))
        .route("/content/upload", post(upload))
}

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/content/list", get(list))
        .route("/content/search", post(search))
}

async fn create(
    State(app_state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreatePayload>,
) -> AppResult<impl IntoResponse> {
    let item = app_state
        .content_use_cases
        .create(&payload.title, &payload.body)
        .await?;
    tracing::debug!(username = %user.username, content_id = item.id, "Content created");
    Ok(Json(StoredResponse {
        message: "content created".to_string(),
        id: item.id,
    }))
}

async fn upload(
    State(app_state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(e.body_text()))?;

        let item = app_state
            .content_use_cases
            .upload(filename.as_deref(), &bytes)
            .await?;
        tracing::debug!(username = %user.username, content_id = item.id, "Content uploaded");
        return Ok(Json(StoredResponse {
            message: format!("uploaded {}", item.title),
            id: item.id,
        }));
    }
    Err(AppError::InvalidInput("file field required".into()))
}

async fn list(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let items = app_state.content_use_cases.list().await?;
    Ok(Json(ListResponse { items }))
}

async fn search(
    State(app_state): State<AppState>,
    Json(payload): Json<SearchPayload>,
) -> AppResult<impl IntoResponse> {
    let outcome = app_state.content_use_cases.search(&payload.query).await?;
    Ok(Json(SearchResponse {
        cached: outcome.cached,
        results: outcome.results,
    }))
}
