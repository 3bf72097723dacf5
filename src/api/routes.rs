use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::analyze::analyze;
use super::health::health_check;
use crate::services::AnalysisService;

pub fn create_routes(service: AnalysisService) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/analyze", post(analyze))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}
