//! Boundary data error types.

/// Errors that can occur while loading district boundaries.
#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Download returned an error status
    #[error("API error {status}")]
    Api { status: u16 },

    /// Downloaded body was not GeoJSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Cache operation failed
    #[error("cache error: {message}")]
    Cache { message: String },
}
