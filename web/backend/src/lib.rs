pub mod cache;
pub mod call;
pub mod catalog;
pub mod charts;
pub mod config;
pub mod error;
pub mod handlers;
pub mod itunes;
pub mod models;
pub mod news;
pub mod resolver;
pub mod scheduler;
pub mod state;
pub mod video;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/artists-data", get(handlers::artists_data))
        .route("/api/youtube", get(handlers::find_video))
        .route("/api/itunes-lookup", get(handlers::itunes_lookup))
        .route("/api/top100", get(handlers::top_chart))
        .route("/api/news", get(handlers::news))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
