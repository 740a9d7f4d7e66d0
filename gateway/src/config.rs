//! Command-line configuration of the gateway daemon.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::store::{FileStore, Ledger};

#[derive(Debug, Parser)]
#[command(
    name = "supplychain-gateway",
    about = "HTTP gateway to the product lifecycle ledger"
)]
pub struct Cli {
    /// Address to listen on.
    #[arg(long, env = "SUPPLYCHAIN_LISTEN", default_value = "127.0.0.1:3000")]
    pub listen: SocketAddr,

    /// Ledger snapshot file
    /// (default: <data dir>/supplychain/ledger.bin).
    #[arg(long, env = "SUPPLYCHAIN_DATA_FILE", conflicts_with = "in_memory")]
    pub data_file: Option<PathBuf>,

    /// Keep the ledger in memory only; everything is lost on exit.
    #[arg(long)]
    pub in_memory: bool,

    /// Write the sample products at startup, overwriting P001 and P002.
    #[arg(long)]
    pub seed: bool,
}

impl Cli {
    pub fn data_file(&self) -> PathBuf {
        self.data_file.clone().unwrap_or_else(default_data_file)
    }

    pub fn open_ledger(&self) -> anyhow::Result<Ledger> {
        if self.in_memory {
            tracing::warn!("running with an in-memory ledger");
            return Ok(Ledger::in_memory());
        }
        let store = FileStore::open(self.data_file())?;
        Ok(Ledger::new(store))
    }
}

fn default_data_file() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    base.join("supplychain").join("ledger.bin")
}
