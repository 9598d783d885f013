//! Configuration loading.
//!
//! Configuration comes from an optional YAML file (with environment variable
//! interpolation) and the `PORT` environment variable. Every section has
//! defaults, so running with no file at all is the common case.

mod vars;

pub use vars::{InterpolationResult, interpolate, interpolate_with};

use clap::Parser;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{
    ConfigError, EmptyUpstreamUrlSnafu, EnvInterpolationSnafu, InvalidPortSnafu,
    MustBePositiveSnafu, ReadFileSnafu, YamlParseSnafu,
};
use crate::upstream::DEFAULT_BASE_URL;

/// Environment variable that selects the listening port.
pub const PORT_ENV: &str = "PORT";

/// Port used when neither `PORT` nor the config file sets one.
pub const DEFAULT_PORT: u16 = 8080;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "brewery-stream")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to an optional YAML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Listening socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Brewery provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// API root; `/breweries/random` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bound on a single upstream request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Per-connection stream cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamConfig {
    /// Seconds between fetch cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Frames buffered between a session and its response body.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl StreamConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Prometheus metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Whether `/metrics` is served (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_interval_secs() -> u64 {
    3
}

fn default_channel_capacity() -> usize {
    1
}

fn default_metrics_enabled() -> bool {
    true
}

/// Resolve the listening port from the raw `PORT` value.
///
/// Unset or blank falls back to `fallback`.
pub fn resolve_port(env_value: Option<&str>, fallback: u16) -> Result<u16, ConfigError> {
    match env_value.map(str::trim) {
        None | Some("") => Ok(fallback),
        Some(value) => value.parse().context(InvalidPortSnafu { value }),
    }
}

impl Config {
    /// Build the runtime configuration from CLI arguments and the environment.
    pub fn load(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        let port = std::env::var(PORT_ENV).ok();
        config.server.port = resolve_port(port.as_deref(), config.server.port)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable interpolation.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).context(ReadFileSnafu)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text after interpolating the environment.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let result = interpolate(content);
        if !result.is_ok() {
            return EnvInterpolationSnafu {
                message: result.errors.join("\n"),
            }
            .fail();
        }

        let config: Config = serde_yaml::from_str(&result.text).context(YamlParseSnafu)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        ensure!(
            !self.upstream.base_url.trim().is_empty(),
            EmptyUpstreamUrlSnafu
        );
        ensure!(
            self.upstream.timeout_secs > 0,
            MustBePositiveSnafu {
                field: "upstream.timeout_secs"
            }
        );
        ensure!(
            self.stream.interval_secs > 0,
            MustBePositiveSnafu {
                field: "stream.interval_secs"
            }
        );
        ensure!(
            self.stream.channel_capacity > 0,
            MustBePositiveSnafu {
                field: "stream.channel_capacity"
            }
        );
        Ok(())
    }
}
