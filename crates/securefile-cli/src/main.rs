//! securefile - Cerberus secure file command-line client

use clap::Parser;
use securefile_cli::{run, Args};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Parse arguments
    let args = Args::parse();

    // Setup logging; stdout is reserved for command output
    let log_level = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!(
                "securefile_cli={},securefile_client={}",
                log_level, log_level
            )
            .into()
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Using Cerberus at {}", args.url);
    if args.token.is_none() {
        tracing::warn!("No Cerberus token configured - requests will be unauthenticated");
    }

    run(args, &mut std::io::stdout()).await
}
