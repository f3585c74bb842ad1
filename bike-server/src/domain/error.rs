//! Domain error types.
//!
//! These errors describe why a single station row could not be turned into
//! a [`StationRecord`](super::StationRecord). They never abort a whole
//! refresh; callers log them and move on to the next row.

/// A station row failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// A required field was absent or null
    #[error("missing field: {0}")]
    Missing(&'static str),

    /// A field was present but could not be interpreted
    #[error("invalid {field}: {value}")]
    Invalid { field: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = RecordError::Missing("rackTotCnt");
        assert_eq!(err.to_string(), "missing field: rackTotCnt");

        let err = RecordError::Invalid {
            field: "parkingBikeTotCnt",
            value: "\"-3\"".into(),
        };
        assert_eq!(err.to_string(), "invalid parkingBikeTotCnt: \"-3\"");
    }
}
