//! Runnable rendezvous server.
//!
//! Binds the classic port 1738 and runs until killed. Log verbosity is
//! controlled with `RUST_LOG`, e.g. `RUST_LOG=meetpoint=debug`.

use meetpoint::RendezvousServer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let server = RendezvousServer::builder()
        .bind("0.0.0.0:1738")
        .build()
        .await?;

    tracing::info!(addr = %server.local_addr()?, "rendezvous server up");
    server.run().await?;
    Ok(())
}
