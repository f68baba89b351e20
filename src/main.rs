use actix_web::{middleware, web, App, HttpServer};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod actors;
mod api;
mod config;
mod domain;
mod metrics;

use api::AppState;
use config::Config;

#[actix::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // RUST_LOG wins over --log-level
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    tracing::info!(
        validation = ?config.validation,
        form_validation = ?config.form_validation,
        item_transitions = ?config.item_transitions,
        seed = !config.no_seed,
        dev_routes = config.dev_routes,
        "Starting restaurant order service"
    );

    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!("Metrics registry created with {} metrics", metrics.registry().gather().len());

    let state = AppState::start(
        config.store(),
        config.api_validator(),
        config.form_validator(),
        config.dev_routes,
        metrics.clone(),
    );

    if config.dev_routes {
        tracing::warn!("Debug routes enabled: DELETE and PUT /api/orders");
    }

    tracing::info!(host = %config.host, port = config.port, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::from(metrics.clone()))
            .configure(api::configure)
            .configure(metrics::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}
