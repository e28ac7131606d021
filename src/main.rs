// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::application::city_state::CityStateController;
use crate::infrastructure::config::load_settings;
use crate::infrastructure::http_api::HttpCityApi;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    agriculture_metrics, auth_login, auth_logout, auth_register, auth_user, change_city,
    correlation_analyze, correlation_impact, correlation_insights, correlation_matrix,
    get_dashboard, get_state, health_check, health_metrics, refresh, run_scenario, simulate,
    stream_state, traffic_metrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let settings = load_settings()?;

    // Create the backend adapter (infrastructure layer)
    let api = Arc::new(HttpCityApi::new(
        settings.api.base_url.clone(),
        settings.api.bearer_token.clone(),
    ));

    // Create the controller (application layer) and start polling
    let controller = CityStateController::new(
        api.clone(),
        settings.poll.initial_city.clone(),
        Duration::from_secs(settings.poll.interval_secs),
    );
    controller.initialize().await;

    // Create application state
    let state = Arc::new(AppState { controller, api });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/state", get(get_state))
        .route("/state/stream", get(stream_state))
        .route("/dashboard", get(get_dashboard))
        .route("/city", post(change_city))
        .route("/refresh", post(refresh))
        .route("/simulate", post(simulate))
        .route("/traffic", get(traffic_metrics))
        .route("/health", get(health_metrics))
        .route("/agriculture", get(agriculture_metrics))
        .route("/correlations/matrix", get(correlation_matrix))
        .route("/correlations/insights", get(correlation_insights))
        .route("/correlations/impact", get(correlation_impact))
        .route("/correlations/analyze", post(correlation_analyze))
        .route("/scenarios/run", post(run_scenario))
        .route("/auth/login", post(auth_login))
        .route("/auth/register", post(auth_register))
        .route("/auth/logout", post(auth_logout))
        .route("/auth/user", get(auth_user))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = settings.server.bind_addr.parse()?;
    tracing::info!("starting smartcity-dashboard service on {addr}");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
