use axum::{middleware, routing::get};
use axum_helpers::{
    cors_layer,
    server::{create_production_app, health_router},
};
use core_config::tracing::{init_tracing, install_color_eyre};
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    if config.run_migrations {
        database::postgres::run_migrations::<migration::Migrator>(&db, config.app.name)
            .await
            .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;
    }

    observability::init_metrics().map_err(|e| eyre::eyre!("Metrics recorder failed: {}", e))?;

    let cors = cors_layer(&config.environment, config.cors_origins.as_deref())?;
    let state = AppState { config, db };

    let api_routes = api::routes(&state);
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes, cors);

    // - /health: liveness with app name/version
    // - /ready: database ping
    // - /metrics: Prometheus exposition
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()))
        .route("/metrics", get(observability::metrics_handler))
        .layer(middleware::from_fn(observability::metrics_middleware));

    info!(
        environment = ?state.config.environment,
        "Starting catalog API"
    );

    let server = state.config.server.clone();
    create_production_app(app, &server, server.shutdown_timeout, async move {
        info!("Shutting down: closing database connections");
        match state.db.close().await {
            Ok(_) => info!("PostgreSQL connection closed successfully"),
            Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Catalog API shutdown complete");
    Ok(())
}
