//! Station identity and parsed station records.

use std::fmt;

use serde::Serialize;

/// Prefix carried by every station ID in the bikeList feed.
pub const STATION_ID_PREFIX: &str = "ST-";

/// Error returned when a station ID is unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station ID: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// A station identifier such as `ST-123`.
///
/// The feed uses a fixed non-numeric prefix followed by an ordinal. The
/// ordinal is not guaranteed to be numeric, so the raw string is kept and
/// the ordinal is parsed on demand.
///
/// # Examples
///
/// ```
/// use bike_server::domain::StationId;
///
/// let id = StationId::new("ST-123").unwrap();
/// assert_eq!(id.ordinal(), Some(123));
/// assert_eq!(id.sort_key(), 123);
///
/// let odd = StationId::new("ST-abc").unwrap();
/// assert_eq!(odd.ordinal(), None);
/// assert_eq!(odd.sort_key(), 0);
///
/// assert!(StationId::new("  ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    /// Create a station ID. Surrounding whitespace is trimmed; empty IDs are rejected.
    pub fn new(s: impl AsRef<str>) -> Result<Self, InvalidStationId> {
        let trimmed = s.as_ref().trim();
        if trimmed.is_empty() {
            return Err(InvalidStationId {
                reason: "station ID cannot be empty",
            });
        }
        Ok(StationId(trimmed.to_string()))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric ordinal after the `ST-` prefix, if it parses. Signed,
    /// so a stray `ST--5` still orders before `ST-1`.
    pub fn ordinal(&self) -> Option<i64> {
        self.0
            .strip_prefix(STATION_ID_PREFIX)
            .unwrap_or(&self.0)
            .parse()
            .ok()
    }

    /// Ordering key for station lists. Unparsable ordinals sort as `0`.
    pub fn sort_key(&self) -> i64 {
        self.ordinal().unwrap_or(0)
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A station row that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRecord {
    pub id: StationId,
    /// Display name, whitespace-trimmed.
    pub name: String,
    /// Bikes currently parked at the station.
    pub available_bikes: u32,
    /// Total number of docks. Zero for dockless or decommissioned stations.
    pub rack_capacity: u32,
    /// Usage percentage reported by the feed. Informational only.
    pub usage_ratio: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl StationRecord {
    /// Coordinates, when both are present.
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    pub fn tier(&self) -> AvailabilityTier {
        AvailabilityTier::for_bikes(self.available_bikes)
    }
}

/// Coarse availability band used to colour map markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityTier {
    /// More than 20 bikes.
    Plenty,
    /// 11 to 20 bikes.
    Some,
    /// 10 bikes or fewer.
    Few,
}

impl AvailabilityTier {
    /// Bands are exclusive at the bottom: exactly 20 bikes is `Some` and
    /// exactly 10 is `Few`.
    pub fn for_bikes(bikes: u32) -> Self {
        match bikes {
            21.. => AvailabilityTier::Plenty,
            11..=20 => AvailabilityTier::Some,
            _ => AvailabilityTier::Few,
        }
    }

    /// Marker colour for the map legend.
    pub fn colour(&self) -> &'static str {
        match self {
            AvailabilityTier::Plenty => "#2ecc71",
            AvailabilityTier::Some => "#f1c40f",
            AvailabilityTier::Few => "#e74c3c",
        }
    }
}
