use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_emails::FileTemplateRenderer;
use eyre::WrapErr;
use migration::Migrator;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod db;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    let db = match &config.database {
        Some(database) => {
            let db = db::connect_with_retry(&database.url, &db::RetryConfig::default())
                .await
                .wrap_err("PostgreSQL connection failed")?;
            db::run_migrations::<Migrator>(&db, config.app.name)
                .await
                .wrap_err("Database migrations failed")?;
            Some(db)
        }
        None => None,
    };

    let sender = state::sender_for(&config.environment)?;
    info!(sender = sender.name(), "Delivery backend selected");

    let templates = FileTemplateRenderer::new(&config.templates_dir).wrap_err_with(|| {
        format!(
            "Cannot use templates directory {}",
            config.templates_dir.display()
        )
    })?;

    let state = AppState {
        config,
        db,
        sender,
        templates: Arc::new(templates),
    };

    let api_routes = api::routes(&state);

    // create_router adds docs/middleware to our composed routes
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    // - /: welcome message
    // - /health: liveness check with app name/version
    // - /ready: readiness check with a database ping
    let mut app = router
        .merge(api::root_router(state.config.app))
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()));

    if let Some(public) = api::static_router(&state.config.static_dir) {
        app = app.merge(public);
    }

    info!("Starting mailer API with graceful shutdown (30s timeout)");

    let server = state.config.server.clone();
    let db = state.db.clone();

    create_production_app(
        app,
        &server,
        Duration::from_secs(30),
        async move {
            if let Some(db) = db {
                info!("Shutting down: closing database connections");
                match db.close().await {
                    Ok(_) => info!("PostgreSQL connection closed successfully"),
                    Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
                }
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Mailer API shutdown complete");
    Ok(())
}
