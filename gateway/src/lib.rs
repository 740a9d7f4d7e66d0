//! HTTP gateway adapter for the product lifecycle ledger.
//!
//! Maps REST calls onto contract invocations and contract errors onto HTTP
//! status codes. The ledger itself lives in [`store`].

pub mod config;
pub mod error;
pub mod routes;
pub mod store;

use std::future::Future;

pub use routes::router;
pub use store::{FileStore, Ledger};

/// Serve the gateway on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: tokio::net::TcpListener,
    ledger: Ledger,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, router(ledger))
        .with_graceful_shutdown(shutdown)
        .await
}
