//! Conversion from raw bikeList rows to domain records.
//!
//! Numeric fields are coerced leniently: JSON numbers and numeric strings
//! are both accepted, and integral floats such as `"12.0"` count as
//! integers. Anything else is a [`RecordError`].

use serde_json::Value;

use crate::domain::{RecordError, StationId, StationRecord};

use super::types::RawStation;

pub(crate) const FIELD_ID: &str = "stationId";
pub(crate) const FIELD_NAME: &str = "stationName";
pub(crate) const FIELD_BIKES: &str = "parkingBikeTotCnt";
pub(crate) const FIELD_RACKS: &str = "rackTotCnt";

/// Parse a non-negative integer count.
pub fn parse_count(field: &'static str, value: Option<&Value>) -> Result<u32, RecordError> {
    let value = match value {
        None | Some(Value::Null) => return Err(RecordError::Missing(field)),
        Some(v) => v,
    };

    let invalid = || RecordError::Invalid {
        field,
        value: value.to_string(),
    };

    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_u64() {
                u32::try_from(i).map_err(|_| invalid())
            } else {
                n.as_f64().and_then(integral_u32).ok_or_else(invalid)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u32>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral_u32))
                .ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

fn integral_u32(f: f64) -> Option<u32> {
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 {
        Some(f as u32)
    } else {
        None
    }
}

/// Parse a float, yielding `None` for anything unusable.
pub fn parse_float(value: Option<&Value>) -> Option<f64> {
    let f = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    f.is_finite().then_some(f)
}

/// Parse a signed integer, yielding `None` for anything unusable.
pub fn parse_ratio(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a field as text. Numbers are rendered as their JSON form.
pub fn parse_text(field: &'static str, value: Option<&Value>) -> Result<String, RecordError> {
    match value {
        None | Some(Value::Null) => Err(RecordError::Missing(field)),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(RecordError::Invalid {
            field,
            value: other.to_string(),
        }),
    }
}

/// Parse the station ID of a raw row.
pub fn parse_station_id(row: &RawStation) -> Result<StationId, RecordError> {
    let raw = parse_text(FIELD_ID, row.station_id.as_ref())?;
    StationId::new(&raw).map_err(|_| RecordError::Invalid {
        field: FIELD_ID,
        value: raw,
    })
}

impl TryFrom<&RawStation> for StationRecord {
    type Error = RecordError;

    fn try_from(row: &RawStation) -> Result<Self, Self::Error> {
        Ok(StationRecord {
            id: parse_station_id(row)?,
            name: parse_text(FIELD_NAME, row.station_name.as_ref())?,
            available_bikes: parse_count(FIELD_BIKES, row.parking_bike_tot_cnt.as_ref())?,
            rack_capacity: parse_count(FIELD_RACKS, row.rack_tot_cnt.as_ref())?,
            usage_ratio: parse_ratio(row.shared.as_ref()),
            latitude: parse_float(row.station_latitude.as_ref()),
            longitude: parse_float(row.station_longitude.as_ref()),
        })
    }
}

/// Convert every valid row, dropping the rest.
///
/// Rows are dropped silently here; the classifier is where bad rows get
/// reported.
pub fn parse_rows(rows: &[RawStation]) -> Vec<StationRecord> {
    rows.iter()
        .filter_map(|row| StationRecord::try_from(row).ok())
        .collect()
}
