//! bikeList API response DTOs.
//!
//! These types map directly to the Seoul Open Data `bikeList` JSON. The
//! feed sends counts and coordinates as strings on some days and as numbers
//! on others, so station fields are kept as raw JSON values and interpreted
//! in [`convert`](super::convert).

use serde::Deserialize;
use serde_json::Value;

/// Top-level body of a `bikeList` request.
#[derive(Debug, Clone, Deserialize)]
pub struct BikeListResponse {
    /// Present when the request succeeded.
    #[serde(rename = "rentBikeStatus")]
    pub rent_bike_status: Option<RentBikeStatus>,

    /// Present instead of `rentBikeStatus` when the API rejects the request
    /// (bad key, empty range, quota exceeded).
    #[serde(rename = "RESULT")]
    pub result: Option<ApiResult>,
}

/// The `rentBikeStatus` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RentBikeStatus {
    /// Status code and message for this page.
    #[serde(rename = "RESULT")]
    pub result: Option<ApiResult>,

    /// Station rows on this page. Absent when the API had nothing to send
    /// for the range.
    pub row: Option<Vec<RawStation>>,
}

/// Status block returned with every response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResult {
    /// e.g. `INFO-000` for success, `INFO-200` for no data.
    #[serde(rename = "CODE")]
    pub code: String,

    #[serde(rename = "MESSAGE")]
    pub message: String,
}

/// A station row exactly as the feed sends it.
///
/// Every field is optional; validation happens when converting to
/// [`StationRecord`](crate::domain::StationRecord).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStation {
    /// Station ID, e.g. `"ST-4"`.
    pub station_id: Option<Value>,

    /// Station name, often with leading digits and padding.
    pub station_name: Option<Value>,

    /// Bikes currently parked.
    pub parking_bike_tot_cnt: Option<Value>,

    /// Total docks.
    pub rack_tot_cnt: Option<Value>,

    /// Usage percentage.
    pub shared: Option<Value>,

    pub station_latitude: Option<Value>,

    pub station_longitude: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_success_page() {
        let body = r#"{
            "rentBikeStatus": {
                "list_total_count": 2,
                "RESULT": {"CODE": "INFO-000", "MESSAGE": "정상 처리되었습니다."},
                "row": [
                    {"rackTotCnt": "15", "stationName": "102. 망원역 1번출구 앞",
                     "parkingBikeTotCnt": "8", "shared": "53",
                     "stationLatitude": "37.55564880", "stationLongitude": "126.91062927",
                     "stationId": "ST-4"},
                    {"rackTotCnt": 0, "stationName": "103. 망원역 2번출구 앞",
                     "parkingBikeTotCnt": 0, "shared": 0,
                     "stationLatitude": 37.5547, "stationLongitude": 126.9105,
                     "stationId": "ST-5"}
                ]
            }
        }"#;

        let response: BikeListResponse = serde_json::from_str(body).unwrap();
        let status = response.rent_bike_status.unwrap();
        assert_eq!(status.result.unwrap().code, "INFO-000");
        let rows = status.row.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].station_id, Some(Value::from("ST-4")));
        assert_eq!(rows[1].rack_tot_cnt, Some(Value::from(0)));
    }

    #[test]
    fn parse_error_envelope() {
        let body = r#"{"RESULT": {"CODE": "INFO-100", "MESSAGE": "인증키가 유효하지 않습니다."}}"#;

        let response: BikeListResponse = serde_json::from_str(body).unwrap();
        assert!(response.rent_bike_status.is_none());
        assert_eq!(response.result.unwrap().code, "INFO-100");
    }

    #[test]
    fn status_without_rows() {
        let body = r#"{"rentBikeStatus": {"RESULT": {"CODE": "INFO-000", "MESSAGE": "ok"}}}"#;

        let response: BikeListResponse = serde_json::from_str(body).unwrap();
        assert!(response.rent_bike_status.unwrap().row.is_none());
    }

    #[test]
    fn missing_fields_are_none() {
        let row: RawStation = serde_json::from_str(r#"{"stationId": "ST-9"}"#).unwrap();
        assert_eq!(row.station_id, Some(Value::from("ST-9")));
        assert!(row.station_name.is_none());
        assert!(row.parking_bike_tot_cnt.is_none());
    }
}
