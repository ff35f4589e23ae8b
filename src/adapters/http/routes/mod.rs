pub mod auth;
pub mod chat;
pub mod content;
pub mod system;

use axum::{Router, middleware};

use crate::adapters::http::{app_state::AppState, middleware::require_bearer};

pub fn router(app_state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(chat::router())
        .merge(content::protected_router())
        .route_layer(middleware::from_fn_with_state(app_state, require_bearer));

    Router::new()
        .merge(system::router())
        .merge(auth::router())
        .merge(content::public_router())
        .merge(protected)
}
