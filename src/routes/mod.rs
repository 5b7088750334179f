pub mod api;
pub mod files;
pub mod health;
pub mod pages;

use axum::Router;
use axum::routing::{get, post};

use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::collect_page))
        .route("/collect", post(pages::collect))
        .route("/design", get(pages::design_page).post(pages::design))
        .route("/battlecards/{file}", get(files::download))
        .route("/api/health", get(health::health))
        .route("/api/pipeline", post(api::run_pipeline))
        .route("/api/design", post(api::design))
        .route("/api/templates", get(api::list_templates))
        .route("/api/battlecards", get(api::list_battlecards))
        .with_state(state)
}
