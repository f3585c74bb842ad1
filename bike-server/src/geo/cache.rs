//! Disk cache for boundary GeoJSON.
//!
//! District boundaries change on the scale of years, so the cache never
//! expires on its own. Delete the file to force a fresh download.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::error::BoundaryError;

/// Disk cache for a single GeoJSON document.
#[derive(Debug, Clone)]
pub struct BoundaryCache {
    path: PathBuf,
}

impl BoundaryCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Try to load the cached document.
    ///
    /// Returns `None` if the file doesn't exist or isn't a GeoJSON object.
    pub fn load(&self) -> Option<Value> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        let value: Value = serde_json::from_str(&contents).ok()?;
        is_geojson(&value).then_some(value)
    }

    /// Save the document, creating parent directories if they don't exist.
    pub fn save(&self, geojson: &Value) -> Result<(), BoundaryError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| BoundaryError::Cache {
                message: format!("failed to create cache directory: {}", e),
            })?;
        }

        let json = serde_json::to_string(geojson).map_err(|e| BoundaryError::Cache {
            message: format!("failed to serialize cache: {}", e),
        })?;

        std::fs::write(&self.path, json).map_err(|e| BoundaryError::Cache {
            message: format!("failed to write cache file: {}", e),
        })?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Loose GeoJSON check: an object with a string `type`.
pub(crate) fn is_geojson(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn sample() -> Value {
        json!({"type": "FeatureCollection", "features": []})
    }

    #[test]
    fn save_and_load_cache() {
        let dir = tempdir().unwrap();
        let cache = BoundaryCache::new(dir.path().join("seoul.geojson"));

        cache.save(&sample()).unwrap();
        assert_eq!(cache.load(), Some(sample()));
    }

    #[test]
    fn missing_cache_returns_none() {
        let cache = BoundaryCache::new("/nonexistent/path/seoul.geojson");
        assert!(cache.load().is_none());
    }

    #[test]
    fn corrupt_cache_returns_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seoul.geojson");
        std::fs::write(&path, "{\"type\": ").unwrap();
        assert!(BoundaryCache::new(&path).load().is_none());

        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(BoundaryCache::new(&path).load().is_none());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("cache").join("seoul.geojson");
        let cache = BoundaryCache::new(&path);

        cache.save(&sample()).unwrap();
        assert!(path.exists());
        assert_eq!(cache.path(), path.as_path());
    }
}
