//! Upstream brewery provider.
//!
//! The session controller only sees the `BreweryFetcher` trait, so tests can
//! script successes and failures without a network.

mod client;

pub use client::{DEFAULT_BASE_URL, OpenBreweryClient, RANDOM_PATH};

use async_trait::async_trait;
use std::sync::Arc;

use crate::brewery::StreamRecord;
use crate::error::FetchError;

/// Source of one normalized brewery per call.
///
/// Implementations do not retry; a failed call is reported to the caller,
/// which decides what to do with it.
#[async_trait]
pub trait BreweryFetcher: Send + Sync {
    /// Fetch one random brewery and normalize it.
    async fn fetch_one(&self) -> Result<StreamRecord, FetchError>;
}

#[async_trait]
impl<T: BreweryFetcher + ?Sized> BreweryFetcher for Arc<T> {
    async fn fetch_one(&self) -> Result<StreamRecord, FetchError> {
        (**self).fetch_one().await
    }
}

/// Shared, type-erased fetcher handed to every session.
pub type BreweryFetcherRef = Arc<dyn BreweryFetcher>;
