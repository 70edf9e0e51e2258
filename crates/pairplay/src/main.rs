//! pairplay server binary.
//!
//! Reads its settings from the environment (see [`ServerConfig::from_env`])
//! and serves until killed. Log verbosity follows `RUST_LOG`, default
//! `info`.

use pairplay::{PairplayError, PairplayServer, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), PairplayError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let server = PairplayServer::builder().config(config).build().await?;
    server.run().await
}
