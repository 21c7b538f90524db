pub mod analysis; // Keyword rule engine for case narratives
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod knowledge; // Vomiting decision tree + prompt catalog
pub mod models;
pub mod triage;

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// built-in filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Run the API server until ctrl-c.
pub async fn run(config: AppConfig) -> Result<(), String> {
    tracing::info!(
        "{} starting v{} on {}",
        config::APP_NAME,
        config::APP_VERSION,
        config.bind_addr
    );

    // Runs migrations before the first request.
    db::open_database(&config.database_path).map_err(|e| {
        format!(
            "Cannot open database at {}: {e}",
            config.database_path.display()
        )
    })?;

    let mut server = api::start_server(config).await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {e}");
    }
    server.shutdown();
    server.wait().await;
    Ok(())
}
