// Seocho-gu Voucher Map - Web Server

use anyhow::{Context, Result};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use voucher_map::api::{router, AppState};
use voucher_map::{load_report, logging, Config};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init(LevelFilter::INFO);

    match serve().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn serve() -> Result<()> {
    let config = Config::from_env();
    config.log_summary();

    // Fatal: no partial dataset
    let report = load_report(&config.data_path).context("Failed to load merchant data")?;
    if !report.malformed.is_empty() {
        info!("{} malformed rows left out of the map", report.malformed.len());
    }

    let app = router(AppState::new(report.dataset, config.basemap.clone()));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("Server running on http://{}", config.bind_addr);
    info!("API: http://{}/api/view/all", config.bind_addr);

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
