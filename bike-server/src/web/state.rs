//! Application state for the web layer.

use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};

use crate::geo::BoundaryService;
use crate::seoul::StationFeed;
use crate::session::SessionStore;

/// Shared application state.
///
/// The feed and boundary service are shared; everything that changes per
/// client lives in [`SessionStore`].
#[derive(Clone)]
pub struct AppState {
    /// Live API or mock pages
    pub feed: Arc<StationFeed>,

    /// Per-client sessions
    pub sessions: SessionStore,

    /// District boundaries for the map
    pub boundary: Arc<BoundaryService>,

    /// Offset for displayed timestamps, in seconds east of UTC
    pub utc_offset_secs: i32,
}

impl AppState {
    pub fn new(
        feed: StationFeed,
        sessions: SessionStore,
        boundary: BoundaryService,
        utc_offset_secs: i32,
    ) -> Self {
        Self {
            feed: Arc::new(feed),
            sessions,
            boundary: Arc::new(boundary),
            utc_offset_secs,
        }
    }

    /// The display offset, or UTC if `utc_offset_secs` is out of range.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_secs).unwrap_or_else(|| Utc.fix())
    }
}
