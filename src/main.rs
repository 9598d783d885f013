//! brewery-stream: serves a live feed of random craft breweries over
//! Server-Sent Events.

use clap::Parser;
use snafu::prelude::*;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use brewery_stream::config::{CliArgs, Config};
use brewery_stream::error::{ConfigSnafu, MetricsSnafu, ServerError};
use brewery_stream::upstream::{BreweryFetcherRef, OpenBreweryClient};
use brewery_stream::{Server, metrics, signal};

#[snafu::report]
#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let args = CliArgs::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("brewery-stream starting");

    let config = Config::load(&args).context(ConfigSnafu)?;

    if config.metrics.enabled {
        metrics::init_global().context(MetricsSnafu)?;
        debug!("Metrics available at /metrics");
    }

    let client = OpenBreweryClient::new(&config.upstream.base_url, config.upstream.timeout());
    debug!(url = client.url(), "Upstream configured");
    let fetcher: BreweryFetcherRef = Arc::new(client);

    let shutdown = CancellationToken::new();
    signal::cancel_on_signal(shutdown.clone());

    let server = Server::bind(&config, fetcher, shutdown)
        .await
        .inspect_err(|e| error!(error = %e, "Cannot start listener"))?;
    server.run().await?;

    info!("brewery-stream stopped");
    Ok(())
}
