pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::providers::yahoo_finance::YahooFinanceProvider;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Analyze { export_dir: Option<String> },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Portfolio risk analysis starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let source = YahooFinanceProvider::from(&config.yahoo());
    let today = chrono::Local::now().date_naive();

    match command {
        AppCommand::Analyze { export_dir } => {
            cli::analyze::run(&config, &source, export_dir.as_deref(), today).await?;
        }
    }
    Ok(())
}
