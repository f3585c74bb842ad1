//! Seoul district boundaries for the map.
//!
//! Boundaries come from, in order of preference: the on-disk cache, a
//! download from the public seoul-maps repository (which then fills the
//! cache), or a hardcoded rectangle roughly covering the city. Loading
//! never fails outright.

mod cache;
mod error;

use std::path::PathBuf;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use serde_json::{Value, json};
use tracing::{info, warn};

pub use cache::BoundaryCache;
pub use error::BoundaryError;

/// Default source for the municipality boundaries.
const DEFAULT_SOURCE_URL: &str = "https://raw.githubusercontent.com/southkorea/seoul-maps/master/kostat/2013/json/seoul_municipalities_geo_simple.json";

/// Default cache location, relative to the working directory.
const DEFAULT_CACHE_PATH: &str = "cache/seoul_municipalities.geojson";

/// How long to serve the fallback before trying the download again.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5 * 60;

/// Where a [`Boundary`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundarySource {
    Cache,
    Download,
    Fallback,
}

/// A GeoJSON document plus its provenance.
#[derive(Debug, Clone)]
pub struct Boundary {
    pub geojson: Value,
    pub source: BoundarySource,
}

/// Configuration for the boundary service.
#[derive(Debug, Clone)]
pub struct BoundaryConfig {
    /// Path to the cache file
    pub cache_path: PathBuf,
    /// URL to download from when the cache is empty
    pub source_url: String,
    /// Download timeout in seconds
    pub timeout_secs: u64,
    /// Seconds to keep serving the fallback after a failed download.
    /// Zero retries on every load.
    pub retry_after_secs: u64,
}

impl BoundaryConfig {
    pub fn new(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            cache_path: cache_path.into(),
            source_url: DEFAULT_SOURCE_URL.to_string(),
            timeout_secs: 10,
            retry_after_secs: DEFAULT_RETRY_AFTER_SECS,
        }
    }

    /// Set a custom source URL (for testing).
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    pub fn with_retry_after(mut self, secs: u64) -> Self {
        self.retry_after_secs = secs;
        self
    }
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_PATH)
    }
}

/// Loads district boundaries with cache and fallback.
#[derive(Debug, Clone)]
pub struct BoundaryService {
    cache: BoundaryCache,
    http: reqwest::Client,
    source_url: String,
    /// Holds the fallback after a failed download so page reloads don't
    /// each wait out another timeout.
    recent_fallback: MokaCache<(), Boundary>,
    hold_fallback: bool,
}

impl BoundaryService {
    pub fn new(config: BoundaryConfig) -> Result<Self, BoundaryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            cache: BoundaryCache::new(config.cache_path),
            http,
            source_url: config.source_url,
            recent_fallback: MokaCache::builder()
                .time_to_live(Duration::from_secs(config.retry_after_secs))
                .max_capacity(1)
                .build(),
            hold_fallback: config.retry_after_secs > 0,
        })
    }

    /// Load boundaries: cache, then download, then fallback.
    ///
    /// After a failed download the fallback is served without retrying
    /// until `retry_after_secs` have passed.
    pub async fn load(&self) -> Boundary {
        if let Some(geojson) = self.cache.load() {
            return Boundary {
                geojson,
                source: BoundarySource::Cache,
            };
        }

        if let Some(boundary) = self.recent_fallback.get(&()).await {
            return boundary;
        }

        match self.download().await {
            Ok(geojson) => {
                if let Err(e) = self.cache.save(&geojson) {
                    warn!(error = %e, path = ?self.cache.path(), "failed to cache boundaries");
                } else {
                    info!(path = ?self.cache.path(), "cached district boundaries");
                }
                Boundary {
                    geojson,
                    source: BoundarySource::Download,
                }
            }
            Err(e) => {
                warn!(error = %e, "using fallback district boundary");
                let boundary = Boundary {
                    geojson: fallback_geojson(),
                    source: BoundarySource::Fallback,
                };
                if self.hold_fallback {
                    self.recent_fallback.insert((), boundary.clone()).await;
                }
                boundary
            }
        }
    }

    /// Download the boundary document.
    async fn download(&self) -> Result<Value, BoundaryError> {
        let response = self.http.get(&self.source_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BoundaryError::Api {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let value: Value = serde_json::from_str(&body).map_err(|e| BoundaryError::Json {
            message: e.to_string(),
        })?;

        if !cache::is_geojson(&value) {
            return Err(BoundaryError::Json {
                message: "document has no GeoJSON type".to_string(),
            });
        }
        Ok(value)
    }
}

/// A single polygon roughly bounding Seoul.
pub fn fallback_geojson() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [126.734086, 37.413294],
                    [126.977041, 37.413294],
                    [127.183797, 37.715133],
                    [126.734086, 37.715133],
                    [126.734086, 37.413294]
                ]]
            },
            "properties": {"name": "Seoul"}
        }]
    })
}
