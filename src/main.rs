use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use person_registry::cli::{registry::handle_command, Cli};
use person_registry::config::RegistryConfig;

fn main() {
    let cli = Cli::parse();

    // Logging is not initialised yet, so config errors go straight to stderr.
    let config = match RegistryConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading '{}': {}", cli.config, e);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.node.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    info!("Config loaded from {}", cli.config);

    if let Err(e) = handle_command(cli.command, &config) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
