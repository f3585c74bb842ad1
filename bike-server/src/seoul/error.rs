//! Station feed error types.

/// Errors that can occur while fetching station rows.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// JSON parsed but did not carry `rentBikeStatus.row`
    #[error("unexpected response shape: {message}")]
    UnexpectedShape { message: String },

    /// Reading a mock page from disk failed
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Every page failed, so there is nothing to show
    #[error("no station data retrieved from any of {pages} pages")]
    NoData { pages: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FetchError::Api {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "API error 503: Service Unavailable");

        let err = FetchError::UnexpectedShape {
            message: "INFO-200".into(),
        };
        assert_eq!(err.to_string(), "unexpected response shape: INFO-200");

        let err = FetchError::NoData { pages: 3 };
        assert_eq!(
            err.to_string(),
            "no station data retrieved from any of 3 pages"
        );
    }
}
