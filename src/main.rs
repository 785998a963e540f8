//! Server entry point: configuration, tracing, wiring, serve.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use delivery_hub::adapters::auth::JwtSessionValidator;
use delivery_hub::adapters::http::{app, AppState};
use delivery_hub::adapters::persistence::PostgresMessageLog;
use delivery_hub::application::hub::Hub;
use delivery_hub::config::AppConfig;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("delivery-hub failed to start: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Lazy pool: the hub serves traffic even while the database is down;
    // history writes fail soft until it comes back.
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_lazy(&config.database.url)?;
    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::warn!(error = %e, "migrations not applied; continuing without database");
    }

    let hub = Hub::spawn();
    let state = AppState {
        hub,
        validator: Arc::new(JwtSessionValidator::from_config(&config.auth)),
        message_log: Arc::new(PostgresMessageLog::new(pool)),
        hub_config: config.hub.clone(),
    };

    let addr = config.server.socket_addr()?;
    let router = app(state, &config.server.cors_origins_list());

    tracing::info!(%addr, environment = ?config.server.environment, "delivery-hub listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
