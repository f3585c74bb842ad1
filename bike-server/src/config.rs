//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::geo::BoundaryConfig;
use crate::seoul::SeoulBikeConfig;

/// Errors from reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

pub const ENV_API_KEY: &str = "SEOUL_API_KEY";
pub const ENV_BASE_URL: &str = "SEOUL_API_BASE_URL";
pub const ENV_MOCK_DATA: &str = "BIKE_MOCK_DATA";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_STATIC_DIR: &str = "STATIC_DIR";
pub const ENV_BOUNDARY_CACHE: &str = "BOUNDARY_CACHE_PATH";
pub const ENV_UTC_OFFSET_HOURS: &str = "DASHBOARD_UTC_OFFSET_HOURS";

/// Seoul is UTC+9 all year.
const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;

/// Top-level server configuration.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// API key for the bikeList endpoint. Requests fail without it.
    pub api_key: Option<String>,
    /// Overrides the API base URL
    pub base_url: Option<String>,
    /// Serve mock pages from this directory instead of calling the API
    pub mock_data: Option<PathBuf>,
    pub bind_addr: SocketAddr,
    pub static_dir: String,
    pub boundary_cache: Option<PathBuf>,
    /// Offset applied to displayed timestamps
    pub utc_offset_secs: i32,
}

impl DashboardConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through an arbitrary lookup (for testing).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let bind_addr = match get(ENV_BIND_ADDR) {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                var: ENV_BIND_ADDR,
                value: v,
            })?,
            None => SocketAddr::from(([127, 0, 0, 1], 3000)),
        };

        let utc_offset_hours = match get(ENV_UTC_OFFSET_HOURS) {
            Some(v) => v
                .trim()
                .parse::<i32>()
                .ok()
                .filter(|h| (-23..=23).contains(h))
                .ok_or(ConfigError::Invalid {
                    var: ENV_UTC_OFFSET_HOURS,
                    value: v,
                })?,
            None => DEFAULT_UTC_OFFSET_HOURS,
        };

        Ok(Self {
            api_key: get(ENV_API_KEY),
            base_url: get(ENV_BASE_URL),
            mock_data: get(ENV_MOCK_DATA).map(PathBuf::from),
            bind_addr,
            static_dir: get(ENV_STATIC_DIR).unwrap_or_else(|| "static".to_string()),
            boundary_cache: get(ENV_BOUNDARY_CACHE).map(PathBuf::from),
            utc_offset_secs: utc_offset_hours * 3600,
        })
    }

    /// Client configuration for the live bikeList API.
    pub fn bike_config(&self) -> SeoulBikeConfig {
        let config = SeoulBikeConfig::new(self.api_key.clone().unwrap_or_default());
        match &self.base_url {
            Some(url) => config.with_base_url(url),
            None => config,
        }
    }

    pub fn boundary_config(&self) -> BoundaryConfig {
        match &self.boundary_cache {
            Some(path) => BoundaryConfig::new(path),
            None => BoundaryConfig::default(),
        }
    }
}
