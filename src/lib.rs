//! brewery-stream: live Server-Sent Events feed of random craft breweries.
//!
//! Each `/stream` client gets its own session that fetches one brewery from
//! Open Brewery DB immediately and then on a fixed interval, normalizes it and
//! writes it as a `data:` frame. Upstream failures skip a tick; they never end
//! the stream.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use brewery_stream::{Config, Server, upstream::OpenBreweryClient};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = Config::default();
//! let client = OpenBreweryClient::new(&config.upstream.base_url, config.upstream.timeout());
//! let server = Server::bind(&config, Arc::new(client), CancellationToken::new()).await?;
//! server.run().await?;
//! ```

pub mod brewery;
pub mod config;
pub mod error;
pub mod metrics;
pub mod server;
pub mod session;
pub mod signal;
pub mod upstream;

// Re-export main types
pub use config::Config;
pub use server::{AppState, Server, router};
pub use session::{SessionState, SessionStats, StreamSession};
pub use upstream::{BreweryFetcher, BreweryFetcherRef};
