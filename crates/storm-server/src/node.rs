//! Storm Node - the main application entry point.
//!
//! Architecture:
//! - Single process holding every storm in memory
//! - HTTP API for clients (storms, ideas, votes, sessions)
//! - Background scheduler advancing phases whose time limit ran out

use crate::api;
use crate::error::{Error, Result};
use crate::scheduler::ExpiryScheduler;
use crate::service::StormService;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use storm_core::TokenBudget;

/// Configuration for a Storm node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// HTTP API listen address
    pub api_addr: SocketAddr,

    /// How often the expiry scheduler sweeps
    pub expiry_poll: Duration,

    /// Whether expired phases advance on their own
    pub auto_advance: bool,

    /// Budget for storms created without explicit token counts
    pub default_budget: TokenBudget,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            api_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            expiry_poll: Duration::from_secs(5),
            auto_advance: true,
            default_budget: TokenBudget::default(),
        }
    }
}

impl NodeConfig {
    /// Create config from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let api_addr = parse_var(&lookup, "STORM_API_ADDR")?.unwrap_or(defaults.api_addr);

        let poll_secs: u64 =
            parse_var(&lookup, "STORM_EXPIRY_POLL_SECS")?.unwrap_or(defaults.expiry_poll.as_secs());
        if poll_secs == 0 {
            return Err(Error::Config(
                "STORM_EXPIRY_POLL_SECS must be at least 1".into(),
            ));
        }

        let auto_advance = parse_var(&lookup, "STORM_AUTO_ADVANCE")?.unwrap_or(defaults.auto_advance);

        let default_budget = TokenBudget::new(
            parse_var(&lookup, "STORM_DEFAULT_BLUE_TOKENS")?
                .unwrap_or(defaults.default_budget.max_blue),
            parse_var(&lookup, "STORM_DEFAULT_RED_TOKENS")?
                .unwrap_or(defaults.default_budget.max_red),
        );

        Ok(Self {
            api_addr,
            expiry_poll: Duration::from_secs(poll_secs),
            auto_advance,
            default_budget,
        })
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("Invalid {key}: {raw:?}"))),
    }
}

/// A Storm node instance.
pub struct StormNode {
    service: Arc<StormService>,
    config: NodeConfig,
}

impl StormNode {
    /// Create a new Storm node.
    pub fn new(config: NodeConfig) -> Self {
        let service = Arc::new(StormService::new(config.default_budget));
        Self { service, config }
    }

    /// Get the shared service (for API handlers).
    pub fn service(&self) -> Arc<StormService> {
        Arc::clone(&self.service)
    }

    /// Run the node (starts the expiry scheduler and the HTTP server).
    pub async fn run(self) -> Result<()> {
        tracing::info!("Storm node starting");
        tracing::info!("  API: http://{}", self.config.api_addr);
        tracing::info!(
            "  Default budget: {} blue / {} red",
            self.config.default_budget.max_blue,
            self.config.default_budget.max_red
        );

        if self.config.auto_advance {
            let scheduler = ExpiryScheduler::new(self.service(), self.config.expiry_poll);
            tokio::spawn(scheduler.run());
        } else {
            tracing::info!("  Auto-advance disabled");
        }

        // Build HTTP API
        let app = api::build_router(self.service());

        // Start HTTP server
        let listener = tokio::net::TcpListener::bind(self.config.api_addr).await?;
        tracing::info!("HTTP server listening on {}", self.config.api_addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}
