use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use portrisk::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Compute expected return and risk of the configured portfolio
    Analyze {
        /// Write prices.csv and daily_returns.csv to this directory
        #[arg(short, long)]
        export_dir: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => portrisk::cli::setup::setup(),
        Some(Commands::Analyze { export_dir }) => {
            portrisk::run_command(
                portrisk::AppCommand::Analyze { export_dir },
                cli.config_path.as_deref(),
            )
            .await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
