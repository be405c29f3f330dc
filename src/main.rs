// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{routing::{get, post}, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::report_service::ReportService;
use crate::infrastructure::config::load_config;
use crate::infrastructure::console_client::ConsoleClient;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{alarm_rules, generate_report, health_check, list_dashboards};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_config()?;

    // Create console client (infrastructure layer)
    let console = Arc::new(ConsoleClient::new(&config.console)?);

    // Create services (application layer)
    let report_service = ReportService::new(
        console.clone(),
        config.report.clone(),
        config.labels.clone(),
        config.console.page_size,
    );

    let state = Arc::new(AppState {
        console,
        report_service,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboards", get(list_dashboards))
        .route("/reports", post(generate_report))
        .route("/alarm/rules", get(alarm_rules))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting telemetry-report service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
