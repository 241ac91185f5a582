//! Storm Server - brainstorming sessions over HTTP
//!
//! Hosts any number of storms in memory and exposes them through a JSON API.
//!
//! # Architecture
//!
//! - **Store**: every storm behind its own lock, plus the session index
//! - **Service**: async commands and queries, one storm lock per call
//! - **API**: HTTP endpoints for storms, ideas, votes and sessions
//! - **Scheduler**: advances phases whose time limit ran out
//!
//! # Example
//!
//! ```no_run
//! use storm_server::{NodeConfig, StormNode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = NodeConfig::from_env()?;
//!     let node = StormNode::new(config);
//!     node.run().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod error;
pub mod node;
pub mod scheduler;
pub mod service;
pub mod store;

pub use error::{Error, Result};
pub use node::{NodeConfig, StormNode};
pub use scheduler::ExpiryScheduler;
pub use service::{Joined, SessionView, StormService};
pub use store::{StormHandle, StormStore};
