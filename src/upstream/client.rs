//! HTTP client for the Open Brewery DB random endpoint.

use async_trait::async_trait;
use snafu::prelude::*;
use std::time::{Duration, Instant};
use tracing::debug;

use super::BreweryFetcher;
use crate::brewery::{RawRecord, StreamRecord, normalize};
use crate::emit;
use crate::error::{
    DecodeSnafu, EmptyResultSnafu, FetchError, ReadBodySnafu, RequestSnafu, TaskJoinSnafu,
};
use crate::metrics::events::FetchDuration;

/// Provider API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openbrewerydb.org/v1";

/// Random-record endpoint, relative to the API root.
pub const RANDOM_PATH: &str = "/breweries/random";

/// Fetches one random brewery per call.
///
/// The underlying agent is blocking, so each request runs on the blocking
/// pool. The agent's global timeout bounds the whole request.
#[derive(Clone)]
pub struct OpenBreweryClient {
    agent: ureq::Agent,
    url: String,
}

impl OpenBreweryClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            agent,
            url: format!("{}{RANDOM_PATH}", base_url.trim_end_matches('/')),
        }
    }

    /// Full endpoint URL, without the query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn fetch_blocking(agent: &ureq::Agent, url: &str) -> Result<RawRecord, FetchError> {
        let response = agent
            .get(url)
            .query("size", "1")
            .call()
            .context(RequestSnafu { url })?;

        let body = response
            .into_body()
            .read_to_string()
            .context(ReadBodySnafu { url })?;

        parse_random_response(&body)
    }
}

/// Take the first brewery of a `random?size=1` response body.
pub(crate) fn parse_random_response(body: &str) -> Result<RawRecord, FetchError> {
    let records: Vec<RawRecord> = serde_json::from_str(body).context(DecodeSnafu)?;
    records.into_iter().next().context(EmptyResultSnafu)
}

#[async_trait]
impl BreweryFetcher for OpenBreweryClient {
    async fn fetch_one(&self) -> Result<StreamRecord, FetchError> {
        let agent = self.agent.clone();
        let url = self.url.clone();
        let started = Instant::now();

        let raw = tokio::task::spawn_blocking(move || Self::fetch_blocking(&agent, &url))
            .await
            .context(TaskJoinSnafu)??;

        emit!(FetchDuration {
            duration: started.elapsed(),
        });
        debug!(id = %raw.id, name = %raw.name, "Fetched brewery");

        Ok(normalize(&raw))
    }
}
