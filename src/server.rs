use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    config::Config,
    handlers::{self, AppState},
    metrics,
    pricing::PricingService,
    signals::setup_signal_handlers,
};

/// Start the estimator HTTP server
///
/// This function:
/// 1. Initializes metrics (if enabled)
/// 2. Loads the district price table
/// 3. Sets up signal handlers for graceful shutdown and table reload
/// 4. Binds to the configured address and serves until shutdown
pub async fn start_server(config: Config) -> Result<()> {
    let metrics_handle = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        Some(Arc::new(metrics::init_metrics()?))
    } else {
        None
    };

    let pricing = PricingService::from_path(&config.data.districts_csv)
        .with_context(|| {
            format!(
                "Cannot start without a district price table ({})",
                config.data.districts_csv.display()
            )
        })?
        .with_current_year(config.pricing.current_year);
    let pricing = Arc::new(pricing);

    // SIGTERM, SIGINT for shutdown; SIGHUP for table reload
    let (shutdown_tx, signal_handle) = setup_signal_handlers(pricing.clone());
    let mut shutdown_rx = shutdown_tx.subscribe();

    let app_state = AppState {
        pricing: pricing.clone(),
    };
    let metrics_route = metrics_handle.map(|handle| (config.metrics.endpoint.clone(), handle));
    let app = create_router(app_state, metrics_route);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting estimator on {}", addr);
    info!(
        "Price table: {} districts, reference year {}",
        pricing.table().len(),
        pricing.current_year()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    signal_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

/// Create the Axum router with all routes and middleware
///
/// `metrics` is the endpoint path and exporter handle, when metrics are enabled.
pub fn create_router(
    app_state: AppState,
    metrics: Option<(String, Arc<PrometheusHandle>)>,
) -> Router {
    let api_routes = Router::new()
        .route("/v1/estimate", post(handlers::estimate::handle_estimate))
        .route("/v1/districts", get(handlers::districts::list_districts))
        .route("/ready", get(handlers::health::readiness_check))
        .with_state(app_state);

    let mut app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(api_routes);

    if let Some((endpoint, handle)) = metrics {
        let metrics_routes = Router::new()
            .route(&endpoint, get(handlers::metrics_handler::metrics))
            .with_state(handle);
        app = app.merge(metrics_routes);
    }

    app
        // Property submissions are small
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
