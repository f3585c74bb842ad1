//! Data transfer objects for web requests and responses.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::classify::{ClassificationResult, FleetMetrics, StationSummary};
use crate::domain::{AvailabilityTier, StationRecord};
use crate::session::DashboardSnapshot;

/// Query string for the dashboard page.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// Table column to sort by: `id`, `name`, `bikes` or `racks`
    pub sort: Option<String>,

    /// `asc` or `desc`
    pub order: Option<String>,
}

/// Column the station table is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableSort {
    #[default]
    Id,
    Name,
    Bikes,
    Racks,
}

impl TableSort {
    pub const ALL: [TableSort; 4] = [
        TableSort::Id,
        TableSort::Name,
        TableSort::Bikes,
        TableSort::Racks,
    ];

    /// Parse a query value, falling back to the default for unknown input.
    pub fn parse(s: Option<&str>) -> Self {
        match s.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("name") => TableSort::Name,
            Some("bikes") => TableSort::Bikes,
            Some("racks") => TableSort::Racks,
            _ => TableSort::Id,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TableSort::Id => "id",
            TableSort::Name => "name",
            TableSort::Bikes => "bikes",
            TableSort::Racks => "racks",
        }
    }

    /// Column heading.
    pub fn label(&self) -> &'static str {
        match self {
            TableSort::Id => "번호",
            TableSort::Name => "대여소명",
            TableSort::Bikes => "대여 가능 대수",
            TableSort::Racks => "총 거치대 수",
        }
    }

    fn compare(&self, a: &StationRecord, b: &StationRecord) -> Ordering {
        match self {
            TableSort::Id => a.id.sort_key().cmp(&b.id.sort_key()),
            TableSort::Name => a.name.cmp(&b.name),
            TableSort::Bikes => a.available_bikes.cmp(&b.available_bikes),
            TableSort::Racks => a.rack_capacity.cmp(&b.rack_capacity),
        }
    }
}

/// Sort direction for the station table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: Option<&str>) -> Self {
        match s.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn reversed(&self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Stable-sort station records for the table.
pub fn sort_stations(stations: &mut [StationRecord], sort: TableSort, order: SortOrder) {
    stations.sort_by(|a, b| {
        let ord = sort.compare(a, b);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

/// One no-rental or no-return list.
#[derive(Debug, Serialize)]
pub struct BucketResult {
    pub count: usize,
    pub stations: Vec<StationSummary>,
}

impl BucketResult {
    fn from_list(stations: &[StationSummary]) -> Self {
        Self {
            count: stations.len(),
            stations: stations.to_vec(),
        }
    }
}

/// Response for `/api/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub no_rental: BucketResult,
    pub no_return: BucketResult,
    pub total_stations: usize,
    /// Formatted `generated_at`
    pub last_updated: String,
    pub metrics: FleetMetrics,
    /// Fetch error message, when the last refresh failed
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn from_snapshot(snapshot: &DashboardSnapshot) -> Self {
        let mut response = Self::from_classification(&snapshot.classification);
        response.metrics = snapshot.metrics.clone();
        response.error = snapshot.fetch_error.clone();
        response
    }

    pub fn from_classification(result: &ClassificationResult) -> Self {
        Self {
            no_rental: BucketResult::from_list(&result.no_rental),
            no_return: BucketResult::from_list(&result.no_return),
            total_stations: result.total_station_count,
            last_updated: result.last_updated(),
            metrics: FleetMetrics::empty(),
            error: None,
        }
    }
}

/// A map marker for `/api/stations`.
#[derive(Debug, Serialize)]
pub struct StationMarker {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub available_bikes: u32,
    pub rack_capacity: u32,
    pub tier: AvailabilityTier,
    pub colour: &'static str,
}

impl StationMarker {
    /// Build a marker; stations without coordinates get none.
    pub fn from_record(record: &StationRecord) -> Option<Self> {
        let (lat, lng) = record.position()?;
        let tier = record.tier();
        Some(Self {
            id: record.id.to_string(),
            name: record.name.clone(),
            lat,
            lng,
            available_bikes: record.available_bikes,
            rack_capacity: record.rack_capacity,
            tier,
            colour: tier.colour(),
        })
    }
}

/// Response for `/api/stations`.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub stations: Vec<StationMarker>,
}

impl StationsResponse {
    pub fn from_records(records: &[StationRecord]) -> Self {
        Self {
            stations: records.iter().filter_map(StationMarker::from_record).collect(),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
