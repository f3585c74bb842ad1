//! Station status classification.
//!
//! Splits a batch of raw station rows into the two lists the dashboard
//! highlights:
//!
//! - **no rental**: no bikes parked, so nothing can be rented
//! - **no return**: no docks at all, so nothing can be returned
//!
//! The two checks are independent; a station can appear in both lists.
//! Each list is ordered by the numeric part of the station ID.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{StationId, StationRecord};
use crate::seoul::RawStation;

/// Timestamp format shown on the dashboard.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors from a classification pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    /// The configured offset is outside ±24h
    #[error("invalid UTC offset: {0} seconds")]
    InvalidUtcOffset(i32),
}

/// One station in a no-rental or no-return list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationSummary {
    pub id: StationId,
    pub name: String,
    pub available_bikes: u32,
    pub rack_capacity: u32,
    pub usage_ratio: Option<i64>,
}

impl From<&StationRecord> for StationSummary {
    fn from(record: &StationRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            available_bikes: record.available_bikes,
            rack_capacity: record.rack_capacity,
            usage_ratio: record.usage_ratio,
        }
    }
}

/// Result of classifying one batch of rows.
///
/// Recomputed on every refresh and replaced wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    /// Stations with no bikes parked, by ascending ordinal.
    pub no_rental: Vec<StationSummary>,
    /// Stations with no docks, by ascending ordinal.
    pub no_return: Vec<StationSummary>,
    /// Every row seen, including rows that failed validation.
    pub total_station_count: usize,
    pub generated_at: DateTime<FixedOffset>,
}

impl ClassificationResult {
    /// The all-empty result shown when there is nothing to classify.
    pub fn empty(generated_at: DateTime<FixedOffset>) -> Self {
        Self {
            no_rental: Vec::new(),
            no_return: Vec::new(),
            total_station_count: 0,
            generated_at,
        }
    }

    pub fn no_rental_count(&self) -> usize {
        self.no_rental.len()
    }

    pub fn no_return_count(&self) -> usize {
        self.no_return.len()
    }

    /// `generated_at` formatted for display.
    pub fn last_updated(&self) -> String {
        self.generated_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Classify a batch of raw rows.
///
/// Rows that fail validation are logged and left out of both lists, but
/// still count toward `total_station_count`. `generated_at` is `now`
/// expressed at `utc_offset_secs`.
pub fn classify(
    rows: &[RawStation],
    now: DateTime<Utc>,
    utc_offset_secs: i32,
) -> Result<ClassificationResult, ClassifyError> {
    let offset = FixedOffset::east_opt(utc_offset_secs)
        .ok_or(ClassifyError::InvalidUtcOffset(utc_offset_secs))?;
    let generated_at = now.with_timezone(&offset);

    let mut no_rental = Vec::new();
    let mut no_return = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let record = match StationRecord::try_from(row) {
            Ok(record) => record,
            Err(e) => {
                warn!(row = index, error = %e, "skipping station row");
                continue;
            }
        };

        if record.available_bikes == 0 {
            no_rental.push(StationSummary::from(&record));
        }
        if record.rack_capacity == 0 {
            no_return.push(StationSummary::from(&record));
        }
    }

    // Stable sort: stations sharing a key keep their feed order.
    no_rental.sort_by_key(|s| s.id.sort_key());
    no_return.sort_by_key(|s| s.id.sort_key());

    debug!(
        total = rows.len(),
        no_rental = no_rental.len(),
        no_return = no_return.len(),
        "classified stations"
    );

    Ok(ClassificationResult {
        no_rental,
        no_return,
        total_station_count: rows.len(),
        generated_at,
    })
}

/// Fleet-wide totals for the header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetMetrics {
    pub total_stations: usize,
    pub total_bikes: u64,
    pub total_racks: u64,
    /// Parked bikes as a percentage of docks; 0 when there are no docks.
    pub usage_rate_percent: f64,
}

impl FleetMetrics {
    /// Compute totals. `total_stations` counts every row received, while
    /// bike and rack sums only cover rows that validated.
    pub fn compute(total_stations: usize, records: &[StationRecord]) -> Self {
        let total_bikes: u64 = records.iter().map(|r| u64::from(r.available_bikes)).sum();
        let total_racks: u64 = records.iter().map(|r| u64::from(r.rack_capacity)).sum();
        let usage_rate_percent = if total_racks > 0 {
            total_bikes as f64 / total_racks as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total_stations,
            total_bikes,
            total_racks,
            usage_rate_percent,
        }
    }

    pub fn empty() -> Self {
        Self::compute(0, &[])
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::seoul::RawStation;
    use serde_json::json;

    /// A well-formed raw row.
    pub fn raw(id: &str, bikes: u32, racks: u32) -> RawStation {
        serde_json::from_value(json!({
            "stationId": id,
            "stationName": format!(" {id} name "),
            "parkingBikeTotCnt": bikes.to_string(),
            "rackTotCnt": racks.to_string(),
            "shared": "0",
            "stationLatitude": "37.5",
            "stationLongitude": "127.0"
        }))
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::raw;
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    const KST: i32 = 9 * 3600;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 3, 0, 0).unwrap()
    }

    fn ids(list: &[StationSummary]) -> Vec<&str> {
        list.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn example_scenario() {
        let rows = vec![raw("ST-3", 0, 10), raw("ST-1", 5, 0), raw("ST-2", 0, 0)];

        let result = classify(&rows, now(), KST).unwrap();
        assert_eq!(ids(&result.no_rental), vec!["ST-2", "ST-3"]);
        assert_eq!(ids(&result.no_return), vec!["ST-1", "ST-2"]);
        assert_eq!(result.total_station_count, 3);
        assert_eq!(result.no_rental_count(), 2);
        assert_eq!(result.no_return_count(), 2);
    }

    #[test]
    fn empty_input_is_empty_result() {
        let result = classify(&[], now(), KST).unwrap();
        assert!(result.no_rental.is_empty());
        assert!(result.no_return.is_empty());
        assert_eq!(result.total_station_count, 0);
        assert_eq!(result, ClassificationResult::empty(result.generated_at));
    }

    #[test]
    fn timestamp_uses_configured_offset() {
        let result = classify(&[], now(), KST).unwrap();
        assert_eq!(result.last_updated(), "2024-05-01 12:00:00");
        assert_eq!(result.generated_at, now());
    }

    #[test]
    fn invalid_offset_is_an_error() {
        let result = classify(&[], now(), 25 * 3600);
        assert_eq!(result, Err(ClassifyError::InvalidUtcOffset(25 * 3600)));
    }

    #[test]
    fn malformed_rows_are_skipped_but_counted() {
        let bad_bikes: RawStation = serde_json::from_value(json!({
            "stationId": "ST-8", "stationName": "x",
            "parkingBikeTotCnt": "?", "rackTotCnt": "0"
        }))
        .unwrap();
        let no_racks_field: RawStation = serde_json::from_value(json!({
            "stationId": "ST-9", "stationName": "y", "parkingBikeTotCnt": "0"
        }))
        .unwrap();
        let rows = vec![bad_bikes, raw("ST-1", 0, 5), no_racks_field];

        let result = classify(&rows, now(), KST).unwrap();
        assert_eq!(ids(&result.no_rental), vec!["ST-1"]);
        assert!(result.no_return.is_empty());
        assert_eq!(result.total_station_count, 3);
    }

    #[test]
    fn unparsable_ids_sort_first_in_feed_order() {
        let rows = vec![
            raw("ST-5", 0, 1),
            raw("ST-beta", 0, 1),
            raw("ST-1", 0, 1),
            raw("ST-alpha", 0, 1),
        ];

        let result = classify(&rows, now(), KST).unwrap();
        assert_eq!(
            ids(&result.no_rental),
            vec!["ST-beta", "ST-alpha", "ST-1", "ST-5"]
        );
    }

    #[test]
    fn names_are_trimmed() {
        let result = classify(&[raw("ST-1", 0, 0)], now(), KST).unwrap();
        assert_eq!(result.no_rental[0].name, "ST-1 name");
    }

    #[test]
    fn numeric_sort_not_lexicographic() {
        let rows = vec![raw("ST-10", 0, 1), raw("ST-9", 0, 1), raw("ST-100", 0, 1)];
        let result = classify(&rows, now(), KST).unwrap();
        assert_eq!(ids(&result.no_rental), vec!["ST-9", "ST-10", "ST-100"]);
    }

    #[test]
    fn metrics_totals() {
        let records = crate::seoul::convert::parse_rows(&[
            raw("ST-1", 5, 10),
            raw("ST-2", 3, 10),
            raw("ST-3", 0, 0),
        ]);
        let metrics = FleetMetrics::compute(4, &records);
        assert_eq!(metrics.total_stations, 4);
        assert_eq!(metrics.total_bikes, 8);
        assert_eq!(metrics.total_racks, 20);
        assert!((metrics.usage_rate_percent - 40.0).abs() < 1e-9);
    }

    #[test]
    fn metrics_without_racks() {
        let metrics = FleetMetrics::empty();
        assert_eq!(metrics.total_stations, 0);
        assert_eq!(metrics.usage_rate_percent, 0.0);
    }
}
