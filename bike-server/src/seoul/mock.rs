//! Mock station feed for development without an API key.
//!
//! Loads bikeList page bodies from JSON files and serves them as if they
//! were live API responses.

use std::path::Path;
use std::sync::Arc;

use super::client::{decode_page, merge_pages};
use super::error::FetchError;
use super::types::RawStation;

/// Mock feed that serves pages from JSON files.
#[derive(Debug, Clone)]
pub struct MockBikeClient {
    /// Page bodies keyed by file name, in file-name order.
    pages: Arc<Vec<(String, String)>>,
}

impl MockBikeClient {
    /// Load every `*.json` file in `data_dir` as one page.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, FetchError> {
        let data_dir = data_dir.as_ref();

        let entries = std::fs::read_dir(data_dir).map_err(|e| FetchError::Io {
            message: format!("failed to read mock data directory {:?}: {}", data_dir, e),
        })?;

        let mut pages = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| FetchError::Io {
                    message: format!("failed to read directory entry: {}", e),
                })?
                .path();

            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let body = std::fs::read_to_string(&path).map_err(|e| FetchError::Io {
                message: format!("failed to read {:?}: {}", path, e),
            })?;
            pages.push((name, body));
        }

        if pages.is_empty() {
            return Err(FetchError::Io {
                message: format!("no mock page files found in {:?}", data_dir),
            });
        }

        pages.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(Self {
            pages: Arc::new(pages),
        })
    }

    /// Mimics [`SeoulBikeClient::fetch_all`](super::SeoulBikeClient::fetch_all).
    pub async fn fetch_all(&self) -> Result<Vec<RawStation>, FetchError> {
        let results = self
            .pages
            .iter()
            .map(|(name, body)| (name.clone(), decode_page(body)))
            .collect();
        merge_pages(results)
    }

    /// Number of page files loaded.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
