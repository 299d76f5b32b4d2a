//! merkibocou server entry point.
//!
//! Loads configuration, opens the store, and serves the REST API until
//! Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use merkibocou::api;
use merkibocou::app_state::AppState;
use merkibocou::config::{LogFormat, ServerConfig};
use merkibocou::persistence::{DigestSource, InMemoryStore, PostgresStore, Store};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Plain => builder.init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::from_env().context("loading configuration")?;
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting merkibocou");

    // Build persistence layer
    let (store, source): (Arc<dyn Store>, Arc<dyn DigestSource>) = if config.persistence_enabled {
        let postgres = Arc::new(
            PostgresStore::connect(&config)
                .await
                .context("connecting to PostgreSQL")?,
        );
        (
            Arc::clone(&postgres) as Arc<dyn Store>,
            postgres as Arc<dyn DigestSource>,
        )
    } else {
        tracing::warn!("persistence disabled, data lives in memory only");
        let memory = Arc::new(InMemoryStore::new());
        (
            Arc::clone(&memory) as Arc<dyn Store>,
            memory as Arc<dyn DigestSource>,
        )
    };

    // Build application state
    let app_state =
        AppState::from_config(&config, store, source).context("building application state")?;
    if config.mail.api_url.is_none() {
        tracing::warn!("MAIL_API_URL not set, emails are logged only");
    }

    let app = api::build_app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
