//! Per-client dashboard sessions.
//!
//! Each browser gets its own [`Session`] holding a refresh clock and the
//! most recent [`DashboardSnapshot`]. Nothing is shared between sessions:
//! two clients polling at once each fetch on their own schedule.
//!
//! Sessions live in a moka cache and expire after sitting idle. Each one
//! sits behind its own mutex, so ticks within a session run one at a time.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use moka::future::Cache as MokaCache;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classify::{ClassificationResult, FleetMetrics, classify};
use crate::domain::StationRecord;
use crate::refresh::RefreshState;
use crate::seoul::{RawStation, StationFeed, convert};

/// Everything one refresh produced.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub classification: ClassificationResult,
    /// Every row that validated, in feed order.
    pub stations: Vec<StationRecord>,
    pub metrics: FleetMetrics,
    /// Set when the fetch failed; the snapshot is then empty.
    pub fetch_error: Option<String>,
}

impl DashboardSnapshot {
    /// Build a snapshot from freshly fetched rows.
    pub fn from_rows(rows: &[RawStation], now: DateTime<Utc>, utc_offset_secs: i32) -> Self {
        let classification = classify(rows, now, utc_offset_secs).unwrap_or_else(|e| {
            warn!(error = %e, "classification failed, showing empty result");
            ClassificationResult::empty(local_time(now, utc_offset_secs))
        });
        let stations = convert::parse_rows(rows);
        let metrics = FleetMetrics::compute(rows.len(), &stations);

        Self {
            classification,
            stations,
            metrics,
            fetch_error: None,
        }
    }

    /// The blank snapshot shown after a failed fetch.
    pub fn failed(error: impl Into<String>, now: DateTime<Utc>, utc_offset_secs: i32) -> Self {
        Self {
            classification: ClassificationResult::empty(local_time(now, utc_offset_secs)),
            stations: Vec::new(),
            metrics: FleetMetrics::empty(),
            fetch_error: Some(error.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

/// `now` at the given offset, falling back to UTC for an invalid offset.
fn local_time(now: DateTime<Utc>, utc_offset_secs: i32) -> DateTime<FixedOffset> {
    match FixedOffset::east_opt(utc_offset_secs) {
        Some(offset) => now.with_timezone(&offset),
        None => now.fixed_offset(),
    }
}

/// One client's dashboard state.
#[derive(Debug, Default)]
pub struct Session {
    refresh: RefreshState,
    snapshot: Option<DashboardSnapshot>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one refresh tick.
    ///
    /// When the refresh clock says the data is stale, fetches from `feed`
    /// and replaces the snapshot. A failed fetch replaces it with a blank
    /// snapshot carrying the error; the previous data is not kept.
    ///
    /// Returns whether a fetch was attempted.
    pub async fn tick(
        &mut self,
        feed: &StationFeed,
        now: DateTime<Utc>,
        utc_offset_secs: i32,
    ) -> bool {
        if !self.refresh.should_refresh(now) {
            return false;
        }

        let snapshot = match feed.fetch_all().await {
            Ok(rows) => {
                let snapshot = DashboardSnapshot::from_rows(&rows, now, utc_offset_secs);
                info!(
                    total = snapshot.classification.total_station_count,
                    no_rental = snapshot.classification.no_rental_count(),
                    no_return = snapshot.classification.no_return_count(),
                    "station status updated"
                );
                snapshot
            }
            Err(e) => {
                warn!(error = %e, "station fetch failed");
                DashboardSnapshot::failed(e.to_string(), now, utc_offset_secs)
            }
        };

        self.snapshot = Some(snapshot);
        true
    }

    /// The latest snapshot, if any tick has fetched yet.
    pub fn snapshot(&self) -> Option<&DashboardSnapshot> {
        self.snapshot.as_ref()
    }

    /// When the refresh clock was last stamped.
    pub fn last_fetch_time(&self) -> Option<DateTime<Utc>> {
        self.refresh.last_fetch_time()
    }

    pub fn next_refresh_time(&self) -> Option<DateTime<Utc>> {
        self.refresh.next_refresh_time()
    }
}

/// Opaque session identifier, carried in a cookie.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        SessionId(Uuid::new_v4())
    }

    /// Parse a cookie value. Returns `None` for anything that isn't a UUID.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim()).ok().map(SessionId)
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared handle to a session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Configuration for the session store.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sessions untouched for this long are dropped.
    pub idle_ttl: Duration,

    /// Maximum number of live sessions.
    pub max_capacity: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(30 * 60),
            max_capacity: 10_000,
        }
    }
}

/// All live sessions.
#[derive(Clone)]
pub struct SessionStore {
    sessions: MokaCache<SessionId, SessionHandle>,
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        let sessions = MokaCache::builder()
            .time_to_idle(config.idle_ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { sessions }
    }

    /// Look up the session for a cookie value, creating one if the value is
    /// missing, malformed, or refers to an expired session.
    ///
    /// Returns the session's ID, its handle, and whether it was created.
    pub async fn get_or_create(&self, cookie: Option<&str>) -> (SessionId, SessionHandle, bool) {
        if let Some(id) = cookie.and_then(SessionId::parse)
            && let Some(handle) = self.sessions.get(&id).await
        {
            return (id, handle, false);
        }

        let id = SessionId::generate();
        let handle: SessionHandle = Arc::new(Mutex::new(Session::new()));
        self.sessions.insert(id, handle.clone()).await;
        debug!(session = %id, live = self.entry_count(), "created session");
        (id, handle, true)
    }

    /// Look up an existing session without creating one.
    pub async fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        self.sessions.get(id).await
    }

    /// Approximate number of live sessions.
    pub fn entry_count(&self) -> u64 {
        self.sessions.entry_count()
    }
}
