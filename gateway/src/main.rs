//! Supply-chain ledger gateway daemon.
//!
//! Opens the ledger (a snapshot file, or memory with `--in-memory`),
//! optionally seeds the sample products, and serves the REST API until
//! Ctrl-C.

use anyhow::Context;
use clap::Parser;
use supplychain_common::seed;
use supplychain_gateway::config::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let ledger = cli.open_ledger().context("failed to open ledger")?;

    if cli.seed {
        let mut session = ledger.connect().await;
        let ids = seed::initialize_ledger(&mut *session).context("failed to seed ledger")?;
        tracing::info!(?ids, "seeded sample products");
    }

    let listener = tokio::net::TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen))?;
    tracing::info!("gateway listening on {}", cli.listen);

    supplychain_gateway::serve(listener, ledger, async {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("shutting down");
    })
    .await
    .context("server error")?;
    Ok(())
}
