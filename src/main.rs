use clap::Parser;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;
use xdpstat::cli::{commands, Cli};
use xdpstat::config::ControllerConfig;

#[tokio::main]
async fn main() {
    // usage errors exit with status 2 from here
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting xdpstat v{}", xdpstat::VERSION);

    let result = match ControllerConfig::try_from(&cli) {
        Ok(config) => commands::run(config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
