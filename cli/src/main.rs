//! r8s-dev - disposable multi-node r8s topologies for local development

use clap::Parser;
use tracing_subscriber::EnvFilter;

use r8s_dev::cli::{self, Cli};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Cli::parse();
    if let Err(e) = args.run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(cli::exit_code(&e));
    }
}
