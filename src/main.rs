mod ui;

use anyhow::{Context, Result};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use voucher_map::{load_report, logging, Config};

fn main() -> ExitCode {
    logging::init(LevelFilter::INFO);

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = Config::from_env();
    config.log_summary();

    // Fatal: no partial dataset
    let report = load_report(&config.data_path).context("Failed to load merchant data")?;

    info!("Starting UI... (press 'q' to quit)");
    let mut app = ui::App::new(report.dataset, config.basemap.notice(), report.malformed.len());
    ui::run_ui(&mut app)?;

    info!("UI closed");
    Ok(())
}
