use chrono::NaiveDate;
use thiserror::Error;

use crate::types::Side;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DataError {
    #[error("unknown ticker: {ticker}")]
    NotFound { ticker: String },

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("{ticker}: reported {reported} {side} paths, path list has {derived} viable")]
    DataInconsistency {
        ticker: String,
        side: Side,
        reported: usize,
        derived: usize,
    },

    #[error("ticker already present: {ticker}")]
    DuplicateTicker { ticker: String },

    #[error("{ticker}: price {price} outside [0, 1]")]
    InvalidPrice { ticker: String, price: f64 },

    #[error("{ticker}: no constraint named {name:?}")]
    UnknownConstraint { ticker: String, name: String },

    #[error("{ticker}: price history ending {end} starts before the supported calendar")]
    HistoryOutOfRange { ticker: String, end: NaiveDate },

    #[error("{ticker}: no viable {side} path {description:?}")]
    UnknownPath {
        ticker: String,
        side: Side,
        description: String,
    },
}

impl DataError {
    pub fn not_found(ticker: &str) -> Self {
        Self::NotFound {
            ticker: ticker.to_string(),
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidFilter(_) => "invalid_filter",
            Self::DataInconsistency { .. } => "data_inconsistency",
            Self::DuplicateTicker { .. } => "duplicate_ticker",
            Self::InvalidPrice { .. } => "invalid_price",
            Self::UnknownConstraint { .. } => "unknown_constraint",
            Self::UnknownPath { .. } => "unknown_path",
            Self::HistoryOutOfRange { .. } => "history_out_of_range",
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inconsistency_message_names_side() {
        let err = DataError::DataInconsistency {
            ticker: "SENATE-2024-CONTROL".to_string(),
            side: Side::Yes,
            reported: 8,
            derived: 3,
        };
        assert_eq!(
            err.to_string(),
            "SENATE-2024-CONTROL: reported 8 yes paths, path list has 3 viable"
        );
        assert_eq!(err.kind(), "data_inconsistency");
    }
}
