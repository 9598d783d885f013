//! Error types for brewery-stream.
//!
//! Organized by component:
//! - `FetchError` / `CycleError` - upstream fetch and one stream tick
//! - `SessionError` / `SinkClosed` - per-connection session lifecycle
//! - `ConfigError` - configuration loading and validation
//! - `MetricsError` - Prometheus recorder setup
//! - `ServerError` - top-level errors that end the process

use snafu::prelude::*;
use std::net::SocketAddr;

// ============ Upstream Errors ============

/// Errors from a single request to the brewery provider.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum FetchError {
    /// Transport failure, timeout, or non-2xx status.
    #[snafu(display("Request to {url} failed: {source}"))]
    Request { url: String, source: ureq::Error },

    /// Failed to read the response body.
    #[snafu(display("Failed to read response body from {url}: {source}"))]
    ReadBody { url: String, source: ureq::Error },

    /// Response body was not a list of breweries.
    #[snafu(display("Malformed response body: {source}"))]
    Decode { source: serde_json::Error },

    /// The provider returned an empty list.
    #[snafu(display("No brewery returned"))]
    EmptyResult,

    /// The blocking request task panicked or was cancelled.
    #[snafu(display("Fetch task failed: {source}"))]
    TaskJoin { source: tokio::task::JoinError },
}

impl FetchError {
    /// Short label used for the `reason` metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Request { source, .. } => match source {
                ureq::Error::Timeout(_) => "timeout",
                ureq::Error::StatusCode(_) => "status",
                _ => "transport",
            },
            FetchError::ReadBody { .. } => "read_body",
            FetchError::Decode { .. } => "decode",
            FetchError::EmptyResult => "empty",
            FetchError::TaskJoin { .. } => "task",
        }
    }
}

/// Errors that cause one stream tick to be skipped.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CycleError {
    /// Fetching from upstream failed.
    #[snafu(display("Error fetching brewery: {source}"))]
    Fetch { source: FetchError },

    /// Serializing the record to JSON failed.
    #[snafu(display("Error marshaling brewery: {source}"))]
    Encode { source: serde_json::Error },
}

// ============ Session Errors ============

/// Errors that end a stream session before it becomes active.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SessionError {
    /// The transport cannot flush frames incrementally.
    #[snafu(display("SSE not supported"))]
    StreamingUnsupported,
}

/// The client side of the stream has gone away.
#[derive(Debug, Snafu)]
#[snafu(display("Client disconnected"))]
#[snafu(visibility(pub))]
pub struct SinkClosed;

// ============ Config Errors ============

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[snafu(display("Failed to read configuration file: {source}"))]
    ReadFile { source: std::io::Error },

    /// Failed to parse YAML configuration.
    #[snafu(display("Failed to parse YAML: {source}"))]
    YamlParse { source: serde_yaml::Error },

    /// Environment variable interpolation failed.
    #[snafu(display("Environment variable interpolation failed:\n{message}"))]
    EnvInterpolation { message: String },

    /// Port value is not a valid TCP port.
    #[snafu(display("Invalid port '{value}': {source}"))]
    InvalidPort {
        value: String,
        source: std::num::ParseIntError,
    },

    /// A numeric setting that must be non-zero is zero.
    #[snafu(display("{field} must be greater than zero"))]
    MustBePositive { field: &'static str },

    /// Upstream base URL is empty.
    #[snafu(display("Upstream base_url cannot be empty"))]
    EmptyUpstreamUrl,
}

// ============ Metrics Errors ============

/// Errors that can occur during metrics initialization.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum MetricsError {
    /// Failed to initialize Prometheus recorder.
    #[snafu(display("Failed to initialize Prometheus recorder"))]
    PrometheusInit {
        source: metrics_exporter_prometheus::BuildError,
    },

    /// Recorder already installed (double-init attempted).
    #[snafu(display("Metrics already initialized"))]
    AlreadyInitialized,

    /// Controller accessed before init.
    #[snafu(display("Metrics not initialized"))]
    NotInitialized,
}

// ============ Server Error (top-level) ============

/// Errors that terminate the process.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ServerError {
    /// Configuration error.
    #[snafu(display("Configuration error"))]
    Config { source: ConfigError },

    /// Metrics error.
    #[snafu(display("Metrics error"))]
    Metrics { source: MetricsError },

    /// The listening socket could not be bound.
    #[snafu(display("Failed to bind {addr}"))]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// The accept loop failed.
    #[snafu(display("Server error"))]
    Serve { source: std::io::Error },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_kinds() {
        assert_eq!(FetchError::EmptyResult.kind(), "empty");

        let decode = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        assert_eq!(FetchError::Decode { source: decode }.kind(), "decode");

        let status = FetchError::Request {
            url: "http://localhost".into(),
            source: ureq::Error::StatusCode(503),
        };
        assert_eq!(status.kind(), "status");
    }

    #[test]
    fn test_cycle_error_keeps_context() {
        let err = CycleError::Fetch {
            source: FetchError::EmptyResult,
        };

        assert_eq!(err.to_string(), "Error fetching brewery: No brewery returned");
    }
}
