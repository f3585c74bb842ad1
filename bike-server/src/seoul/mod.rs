//! Seoul public bike (Ttareungyi) station feed.
//!
//! Fetches the real-time `bikeList` data set from the Seoul Open Data API.
//! Rows arrive loosely typed; see [`convert`] for how they are validated.

mod client;
pub mod convert;
mod error;
mod mock;
mod types;

pub use client::{DEFAULT_PAGES, PageRange, SeoulBikeClient, SeoulBikeConfig};
pub use error::FetchError;
pub use mock::MockBikeClient;
pub use types::{ApiResult, BikeListResponse, RawStation, RentBikeStatus};

/// The source of station rows: the live API or local mock pages.
#[derive(Debug, Clone)]
pub enum StationFeed {
    Live(SeoulBikeClient),
    Mock(MockBikeClient),
}

impl StationFeed {
    /// Fetch all station rows from whichever source is configured.
    pub async fn fetch_all(&self) -> Result<Vec<RawStation>, FetchError> {
        match self {
            StationFeed::Live(client) => client.fetch_all().await,
            StationFeed::Mock(client) => client.fetch_all().await,
        }
    }
}
