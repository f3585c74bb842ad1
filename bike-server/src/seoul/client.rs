//! Seoul Open Data bikeList HTTP client.
//!
//! The API serves at most 1000 rows per request, so the full station list is
//! fetched as a fixed sequence of pages. Pages are requested one after the
//! other; a page that fails is logged and skipped.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::error::FetchError;
use super::types::{BikeListResponse, RawStation, RentBikeStatus};

/// Default base URL for the Seoul Open Data API.
const DEFAULT_BASE_URL: &str = "http://openapi.seoul.go.kr:8088";

/// Default per-page request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Row ranges requested on every fetch. Together they cover every station
/// currently in service.
pub const DEFAULT_PAGES: [PageRange; 3] = [
    PageRange::new(1, 1000),
    PageRange::new(1001, 2000),
    PageRange::new(2001, 3000),
];

/// An inclusive, 1-based row range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

/// Configuration for the bikeList client.
#[derive(Debug, Clone)]
pub struct SeoulBikeConfig {
    /// API key, sent as a path segment
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds, applied to each page
    pub timeout_secs: u64,
    /// Row ranges to request, in order
    pub pages: Vec<PageRange>,
}

impl SeoulBikeConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            pages: DEFAULT_PAGES.to_vec(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-page timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Replace the page ranges.
    pub fn with_pages(mut self, pages: Vec<PageRange>) -> Self {
        self.pages = pages;
        self
    }
}

/// Client for the bikeList endpoint.
#[derive(Debug, Clone)]
pub struct SeoulBikeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    pages: Vec<PageRange>,
}

impl SeoulBikeClient {
    /// Create a new bikeList client.
    pub fn new(config: SeoulBikeConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            pages: config.pages,
        })
    }

    /// Fetch every configured page and concatenate the rows.
    ///
    /// Fails only when no page succeeded.
    pub async fn fetch_all(&self) -> Result<Vec<RawStation>, FetchError> {
        let mut results = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let label = format!("rows {}-{}", page.start, page.end);
            results.push((label, self.fetch_page(*page).await));
        }
        merge_pages(results)
    }

    /// Fetch a single page of rows.
    pub async fn fetch_page(&self, page: PageRange) -> Result<Vec<RawStation>, FetchError> {
        let url = format!(
            "{}/{}/json/bikeList/{}/{}",
            self.base_url, self.api_key, page.start, page.end
        );

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;
        decode_page(&body)
    }
}

/// Decode one page body into its rows.
pub(crate) fn decode_page(body: &str) -> Result<Vec<RawStation>, FetchError> {
    let response: BikeListResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Json {
            message: e.to_string(),
        })?;

    match response.rent_bike_status {
        Some(RentBikeStatus { row: Some(rows), .. }) => Ok(rows),
        Some(RentBikeStatus { result, row: None }) => {
            let message = match result {
                Some(result) => format!("no rows: {}: {}", result.code, result.message),
                None => "rentBikeStatus has no rows".to_string(),
            };
            Err(FetchError::UnexpectedShape { message })
        }
        None => {
            let message = match response.result {
                Some(result) => format!("{}: {}", result.code, result.message),
                None => body.chars().take(200).collect(),
            };
            Err(FetchError::UnexpectedShape { message })
        }
    }
}

/// Concatenate successful pages in order, logging and skipping failures.
pub(crate) fn merge_pages(
    results: Vec<(String, Result<Vec<RawStation>, FetchError>)>,
) -> Result<Vec<RawStation>, FetchError> {
    let pages = results.len();
    let mut rows = Vec::new();
    let mut succeeded = 0;

    for (label, result) in results {
        match result {
            Ok(page_rows) => {
                debug!(page = %label, rows = page_rows.len(), "fetched station page");
                succeeded += 1;
                rows.extend(page_rows);
            }
            Err(e) => warn!(page = %label, error = %e, "skipping station page"),
        }
    }

    if succeeded == 0 {
        return Err(FetchError::NoData { pages });
    }

    info!(rows = rows.len(), pages = succeeded, "fetched station rows");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::Router;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;

    #[test]
    fn config_defaults() {
        let config = SeoulBikeConfig::new("test-key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.pages, DEFAULT_PAGES.to_vec());
    }

    #[test]
    fn config_builder() {
        let config = SeoulBikeConfig::new("test-key")
            .with_base_url("http://localhost:8080")
            .with_timeout(2)
            .with_pages(vec![PageRange::new(1, 5)]);

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 2);
        assert_eq!(config.pages, vec![PageRange::new(1, 5)]);
    }

    #[test]
    fn default_pages_are_contiguous() {
        for pair in DEFAULT_PAGES.windows(2) {
            assert_eq!(pair[0].end + 1, pair[1].start);
        }
        assert_eq!(DEFAULT_PAGES[0].start, 1);
    }

    #[test]
    fn decode_rejects_error_envelope() {
        let body = r#"{"RESULT": {"CODE": "INFO-200", "MESSAGE": "해당하는 데이터가 없습니다."}}"#;
        match decode_page(body) {
            Err(FetchError::UnexpectedShape { message }) => {
                assert!(message.starts_with("INFO-200"));
            }
            other => panic!("expected UnexpectedShape, got {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_status_without_rows() {
        let body = r#"{"rentBikeStatus": {"list_total_count": 0,
            "RESULT": {"CODE": "INFO-000", "MESSAGE": "정상 처리되었습니다."}}}"#;
        match decode_page(body) {
            Err(FetchError::UnexpectedShape { message }) => {
                assert!(message.contains("INFO-000"));
            }
            other => panic!("expected UnexpectedShape, got {other:?}"),
        }
    }

    #[test]
    fn rowless_pages_count_as_failures() {
        let rowless = r#"{"rentBikeStatus": {"RESULT": {"CODE": "INFO-000", "MESSAGE": "ok"}}}"#;
        let results = vec![
            ("rows 1-1000".to_string(), decode_page(rowless)),
            ("rows 1001-2000".to_string(), decode_page("<html>busy</html>")),
        ];
        assert!(matches!(
            merge_pages(results),
            Err(FetchError::NoData { pages: 2 })
        ));
    }

    #[test]
    fn empty_row_list_is_a_page() {
        let body = r#"{"rentBikeStatus": {"row": []}}"#;
        assert_eq!(decode_page(body).unwrap().len(), 0);
    }

    #[test]
    fn decode_rejects_bad_json() {
        assert!(matches!(
            decode_page("<html>busy</html>"),
            Err(FetchError::Json { .. })
        ));
    }

    fn page_body(ids: &[&str]) -> String {
        let rows: Vec<_> = ids
            .iter()
            .map(|id| {
                serde_json::json!({
                    "stationId": id,
                    "stationName": format!("station {id}"),
                    "parkingBikeTotCnt": "1",
                    "rackTotCnt": "10",
                    "shared": "10",
                    "stationLatitude": "37.5",
                    "stationLongitude": "127.0"
                })
            })
            .collect();
        serde_json::json!({"rentBikeStatus": {"row": rows}}).to_string()
    }

    /// Serves page 1 normally, fails page 2 with a 500, and returns an error
    /// envelope for page 3.
    async fn flaky_page(Path((key, start, _end)): Path<(String, u32, u32)>) -> Response {
        if key != "test-key" {
            return (StatusCode::UNAUTHORIZED, "bad key").into_response();
        }
        match start {
            1 => page_body(&["ST-2", "ST-1"]).into_response(),
            1001 => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
            _ => r#"{"RESULT": {"CODE": "INFO-200", "MESSAGE": "no data"}}"#.into_response(),
        }
    }

    async fn spawn_server() -> String {
        let app = Router::new().route("/:key/json/bikeList/:start/:end", get(flaky_page));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn partial_failure_keeps_successful_pages() {
        let base = spawn_server().await;
        let client =
            SeoulBikeClient::new(SeoulBikeConfig::new("test-key").with_base_url(base)).unwrap();

        let rows = client.fetch_all().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].station_id, Some(serde_json::Value::from("ST-2")));
    }

    #[tokio::test]
    async fn all_pages_failing_is_an_error() {
        let base = spawn_server().await;
        let client =
            SeoulBikeClient::new(SeoulBikeConfig::new("wrong-key").with_base_url(base)).unwrap();

        let result = client.fetch_all().await;
        assert!(matches!(result, Err(FetchError::NoData { pages: 3 })));
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let base = spawn_server().await;
        let client =
            SeoulBikeClient::new(SeoulBikeConfig::new("test-key").with_base_url(base)).unwrap();

        let result = client.fetch_page(PageRange::new(1001, 2000)).await;
        assert!(matches!(result, Err(FetchError::Api { status: 500, .. })));
    }
}
