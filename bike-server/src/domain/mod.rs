//! Domain types for the bike availability dashboard.
//!
//! Types here are validated at construction, so code that receives a
//! [`StationRecord`] can trust its counts are non-negative integers.

mod error;
mod station;

pub use error::RecordError;
pub use station::{AvailabilityTier, InvalidStationId, STATION_ID_PREFIX, StationId, StationRecord};
