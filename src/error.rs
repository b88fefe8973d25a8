//! Error type shared by every fallible operation in the crate.
//!
//! Malformed boards and malformed configuration are programmer errors and are
//! surfaced immediately. A saturated board (fewer than three legal spots) is
//! not an error anywhere in the search.

use thiserror::Error;

/// Errors raised while scoring, predicting, or simulating placements.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlacementError {
    #[error("invalid spot '{0}'")]
    InvalidSpot(String),

    #[error("spot '{0}' is occupied or blocked")]
    OccupiedSpot(String),

    #[error("road '{edge}' does not touch settlement '{node}'")]
    DisconnectedRoad { node: String, edge: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("malformed board: {0}")]
    MalformedBoard(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PlacementError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_key() {
        let err = PlacementError::InvalidSpot("0_2_5".to_string());
        assert_eq!(err.to_string(), "invalid spot '0_2_5'");

        let err = PlacementError::DisconnectedRoad {
            node: "5_10_11".to_string(),
            edge: "6_11".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "road '6_11' does not touch settlement '5_10_11'"
        );
    }
}
