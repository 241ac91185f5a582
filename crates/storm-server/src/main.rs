//! Storm Node binary
//!
//! Serves structured brainstorming sessions over HTTP.

use storm_server::{NodeConfig, StormNode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storm_node=info,storm_server=info,storm_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Storm Node");

    let config = NodeConfig::from_env()?;

    let node = StormNode::new(config);
    node.run().await?;

    Ok(())
}
