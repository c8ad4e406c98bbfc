mod cli;
mod commands;
mod config;
mod http_backend;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::CliConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,ledgerdrive=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    let mut cfg = CliConfig::load(args.config.as_deref())?;
    if let Some(url) = args.backend_url {
        cfg.backend_url = url;
    }

    commands::run(args.command, &cfg, args.config.as_deref()).await
}
