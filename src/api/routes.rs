use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

/// Room for a 10 MB résumé plus a 5 MB photo and form overhead.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/check", post(crate::api::handlers::check::create_check))
        .route("/health", get(crate::api::handlers::check::health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
