use anyhow::Result;
use clap::Parser;
use workbridge_cli::{app, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut settings = workbridge_core::Settings::load();
    if let Some(base_url) = cli.base_url {
        settings.server.base_url = base_url;
    }

    app::run(cli.command, settings).await
}
