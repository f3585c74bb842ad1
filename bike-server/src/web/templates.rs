//! Askama templates for the dashboard.

use askama::Template;
use chrono::{DateTime, FixedOffset, Utc};

use crate::classify::{StationSummary, TIMESTAMP_FORMAT};
use crate::domain::StationRecord;
use crate::session::DashboardSnapshot;

use super::dto::{SortOrder, TableSort, sort_stations};

/// Seconds between automatic page reloads. Each reload is a refresh tick.
pub const PAGE_RELOAD_SECS: u32 = 60;

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// The dashboard.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub reload_secs: u32,
    pub header: HeaderView,
    /// Fetch failure shown in place of the content.
    pub error: Option<String>,
    pub no_rental: Vec<StationItemView>,
    pub no_return: Vec<StationItemView>,
    pub columns: Vec<ColumnView>,
    pub rows: Vec<StationRowView>,
}

/// Error page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Header statistics.
#[derive(Debug, Clone)]
pub struct HeaderView {
    pub total_stations: usize,
    pub total_bikes: u64,
    pub total_racks: u64,
    pub usage_rate: String,
    pub no_rental_count: usize,
    pub no_return_count: usize,
    pub last_updated: String,
    pub next_refresh: Option<String>,
}

/// An entry in the no-rental or no-return list.
#[derive(Debug, Clone)]
pub struct StationItemView {
    pub id: String,
    pub name: String,
}

impl From<&StationSummary> for StationItemView {
    fn from(s: &StationSummary) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
        }
    }
}

/// A sortable table heading.
#[derive(Debug, Clone)]
pub struct ColumnView {
    pub label: &'static str,
    pub href: String,
    /// Arrow shown on the active column.
    pub marker: &'static str,
}

/// A row of the station table.
#[derive(Debug, Clone)]
pub struct StationRowView {
    pub id: String,
    pub name: String,
    pub available_bikes: u32,
    pub rack_capacity: u32,
    pub colour: &'static str,
}

impl From<&StationRecord> for StationRowView {
    fn from(r: &StationRecord) -> Self {
        Self {
            id: r.id.to_string(),
            name: r.name.clone(),
            available_bikes: r.available_bikes,
            rack_capacity: r.rack_capacity,
            colour: r.tier().colour(),
        }
    }
}

impl DashboardTemplate {
    /// Build the page for a session's snapshot.
    ///
    /// `snapshot` is `None` only if the session has never ticked.
    pub fn new(
        snapshot: Option<&DashboardSnapshot>,
        next_refresh: Option<DateTime<Utc>>,
        offset: FixedOffset,
        sort: TableSort,
        order: SortOrder,
    ) -> Self {
        let next_refresh = next_refresh.map(|t| {
            t.with_timezone(&offset)
                .format(TIMESTAMP_FORMAT)
                .to_string()
        });

        let Some(snapshot) = snapshot else {
            return Self {
                reload_secs: PAGE_RELOAD_SECS,
                header: HeaderView::blank(next_refresh),
                error: Some("데이터를 불러올 수 없습니다. 잠시 후 다시 시도해주세요.".to_string()),
                no_rental: Vec::new(),
                no_return: Vec::new(),
                columns: columns(sort, order),
                rows: Vec::new(),
            };
        };

        let classification = &snapshot.classification;
        let metrics = &snapshot.metrics;

        let mut stations = snapshot.stations.clone();
        sort_stations(&mut stations, sort, order);

        Self {
            reload_secs: PAGE_RELOAD_SECS,
            header: HeaderView {
                total_stations: classification.total_station_count,
                total_bikes: metrics.total_bikes,
                total_racks: metrics.total_racks,
                usage_rate: format!("{:.1}%", metrics.usage_rate_percent),
                no_rental_count: classification.no_rental_count(),
                no_return_count: classification.no_return_count(),
                last_updated: classification.last_updated(),
                next_refresh,
            },
            error: snapshot.fetch_error.as_ref().map(|e| {
                format!("데이터를 불러올 수 없습니다. 잠시 후 다시 시도해주세요. ({e})")
            }),
            no_rental: classification.no_rental.iter().map(Into::into).collect(),
            no_return: classification.no_return.iter().map(Into::into).collect(),
            columns: columns(sort, order),
            rows: stations.iter().map(Into::into).collect(),
        }
    }
}

impl HeaderView {
    fn blank(next_refresh: Option<String>) -> Self {
        Self {
            total_stations: 0,
            total_bikes: 0,
            total_racks: 0,
            usage_rate: "0.0%".to_string(),
            no_rental_count: 0,
            no_return_count: 0,
            last_updated: "-".to_string(),
            next_refresh,
        }
    }
}

/// Table headings; clicking the active column flips the order.
fn columns(sort: TableSort, order: SortOrder) -> Vec<ColumnView> {
    TableSort::ALL
        .iter()
        .map(|col| {
            let active = *col == sort;
            let next = if active { order.reversed() } else { SortOrder::Asc };
            ColumnView {
                label: col.label(),
                href: format!("/?sort={}&order={}", col.as_str(), next.as_str()),
                marker: match (active, order) {
                    (false, _) => "",
                    (true, SortOrder::Asc) => "▲",
                    (true, SortOrder::Desc) => "▼",
                },
            }
        })
        .collect()
}
