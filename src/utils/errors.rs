//! Error types for each pipeline stage
//!
//! Every stage has its own error so the front ends can tell the user exactly
//! where a run stopped. [`StockError`] wraps them at the invocation boundary.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{ChartInterval, ChartRange};

/// Invalid `&stock` command input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Usage: {prefix} <ticker> <range> <interval> <type> <moving average values>")]
    Usage { prefix: String },
    #[error("The valid ranges are: {valid}")]
    InvalidRange { valid: String },
    #[error("The valid intervals are: {valid}")]
    InvalidInterval { valid: String },
    #[error("The valid types are: {valid}")]
    InvalidKind { valid: String },
    #[error("Invalid moving average value '{0}', try again with positive integers.")]
    InvalidMovingAverage(String),
}

/// What went wrong while talking to the market data provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchErrorKind {
    #[error("Error 404; please try again with another ticker/range/interval.")]
    NotFound,
    #[error("HTTP Error ({code}): {body}")]
    Status { code: u16, body: String },
    #[error("Request Error: {0}")]
    Network(String),
    #[error("ticker cannot be empty")]
    InvalidSymbol,
}

/// Fetch failure with the request context needed to diagnose it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to fetch {symbol} ({range} range, {interval} interval): {kind}")]
pub struct FetchError {
    pub symbol: String,
    pub range: ChartRange,
    pub interval: ChartInterval,
    pub kind: FetchErrorKind,
}

impl FetchError {
    /// HTTP status code, if the provider answered at all
    pub fn status_code(&self) -> Option<u16> {
        match &self.kind {
            FetchErrorKind::NotFound => Some(404),
            FetchErrorKind::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Payload arrived but could not be read as OHLCV rows
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Provider returned no price data")]
    Empty,
    #[error("Malformed CSV at line {line}: {message}")]
    Csv { line: u64, message: String },
    #[error("Malformed JSON: {0}")]
    Json(String),
    #[error("Row {row} is missing '{field}'")]
    MissingField { row: usize, field: &'static str },
    #[error("Row {row} has invalid {field} '{value}'")]
    InvalidNumber {
        row: usize,
        field: &'static str,
        value: String,
    },
    #[error("Row {row} has invalid timestamp '{value}'")]
    InvalidTimestamp { row: usize, value: String },
    #[error("Column '{field}' has {found} values, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Provider error: {0}")]
    Provider(String),
}

/// Which OHLCV invariant a record broke
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationReason {
    #[error("{0} is not a finite number")]
    NonFinite(&'static str),
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("high {high} is below low {low}")]
    HighBelowLow { high: f64, low: f64 },
    #[error("{field} {value} is outside the low/high range")]
    OutsideRange { field: &'static str, value: f64 },
    #[error("volume must be non-negative, got {0}")]
    NegativeVolume(f64),
    #[error("duplicate timestamp")]
    DuplicateTimestamp,
}

/// A record that breaks the OHLCV invariants
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid record #{index} at {timestamp}: {reason}")]
pub struct ValidationError {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub reason: ValidationReason,
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to draw chart: {0}")]
    Draw(String),
    #[error("Failed to write chart file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid chart size {width}x{height}")]
    InvalidLayout { width: u32, height: u32 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Terminal failure of one pipeline run
#[derive(Error, Debug)]
pub enum StockError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl StockError {
    /// Name of the stage that failed, for user-facing reports
    pub fn stage(&self) -> &'static str {
        match self {
            StockError::Query(_) => "query",
            StockError::Fetch(_) => "fetch",
            StockError::Parse(_) => "parse",
            StockError::Validation(_) => "validation",
            StockError::Render(_) => "render",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_carries_context() {
        let err = FetchError {
            symbol: "SPY".to_string(),
            range: ChartRange::OneDay,
            interval: ChartInterval::FiveMinutes,
            kind: FetchErrorKind::NotFound,
        };

        let text = err.to_string();
        assert!(text.contains("SPY"));
        assert!(text.contains("1d range"));
        assert!(text.contains("5m interval"));
        assert!(text.contains("404"));
        assert_eq!(err.status_code(), Some(404));
    }

    #[test]
    fn test_stage_names() {
        let parse: StockError = ParseError::Empty.into();
        assert_eq!(parse.stage(), "parse");

        let render: StockError = RenderError::InvalidLayout { width: 0, height: 10 }.into();
        assert_eq!(render.stage(), "render");

        let query: StockError = QueryError::InvalidMovingAverage("x".to_string()).into();
        assert_eq!(query.stage(), "query");
    }
}
