use std::sync::Arc;

use gymform::api::routes::create_routes;
use gymform::config::{AnalysisSettings, AppConfig, RuleTable};
use gymform::services::AnalysisService;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;
    let settings = AnalysisSettings::from_env()?;

    // Rule table is built once and shared read-only across requests
    let rules = Arc::new(RuleTable::standard());
    let service = AnalysisService::new(rules, settings.normalizer);

    let app = create_routes(service);

    let listener = TcpListener::bind(config.server_address()).await?;
    info!("GymForm analysis server starting on http://{}", config.server_address());
    info!("Health check available at http://{}/health", config.server_address());

    axum::serve(listener, app).await?;

    Ok(())
}
