mod api;
mod pages;

pub use api::*;
pub use pages::*;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/dashboard/:address", get(dashboard))
        .route("/health", get(health))
        .route(
            "/api/submit-challenge",
            post(submit_challenge).get(list_submissions),
        )
        .route("/api/user-status", get(user_status))
        .route("/api/review", post(review_submission))
        .route("/api/chapters", get(list_chapters))
        .route("/api/chapters/:id", get(get_chapter))
        .route("/api/chapters/:id/answer", get(chapter_answer))
        .route("/api/chapters/:id/check", post(check_chapter))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
