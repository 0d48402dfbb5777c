use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use livereload_config::LiveReloadConfig;

mod cli;
mod listen;
mod serve;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(?cli, "parsed cli");

    let config = match &cli.config {
        Some(path) => LiveReloadConfig::from_file(path)?,
        None => LiveReloadConfig::default(),
    };

    match cli.command {
        Command::Serve(args) => serve::run(args, config.server).await?,
        Command::Listen(args) => listen::run(args, config.client).await?,
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}
