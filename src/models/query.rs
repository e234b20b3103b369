//! Stock chart query models

use std::fmt;
use std::str::FromStr;

use crate::utils::errors::QueryError;

/// How much history to request from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartRange {
    OneDay,
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    YearToDate,
    Max,
}

impl ChartRange {
    pub const ALL: [ChartRange; 11] = [
        ChartRange::OneDay,
        ChartRange::FiveDays,
        ChartRange::OneMonth,
        ChartRange::ThreeMonths,
        ChartRange::SixMonths,
        ChartRange::OneYear,
        ChartRange::TwoYears,
        ChartRange::FiveYears,
        ChartRange::TenYears,
        ChartRange::YearToDate,
        ChartRange::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartRange::OneDay => "1d",
            ChartRange::FiveDays => "5d",
            ChartRange::OneMonth => "1mo",
            ChartRange::ThreeMonths => "3mo",
            ChartRange::SixMonths => "6mo",
            ChartRange::OneYear => "1y",
            ChartRange::TwoYears => "2y",
            ChartRange::FiveYears => "5y",
            ChartRange::TenYears => "10y",
            ChartRange::YearToDate => "ytd",
            ChartRange::Max => "max",
        }
    }

    fn valid_list() -> String {
        Self::ALL.iter().map(|r| r.as_str()).collect::<Vec<_>>().join(", ")
    }
}

impl FromStr for ChartRange {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| QueryError::InvalidRange { valid: Self::valid_list() })
    }
}

impl fmt::Display for ChartRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sampling granularity of each candle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartInterval {
    OneMinute,
    TwoMinutes,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    SixtyMinutes,
    NinetyMinutes,
    OneHour,
    OneDay,
    FiveDays,
    OneWeek,
    OneMonth,
    ThreeMonths,
}

impl ChartInterval {
    pub const ALL: [ChartInterval; 13] = [
        ChartInterval::OneMinute,
        ChartInterval::TwoMinutes,
        ChartInterval::FiveMinutes,
        ChartInterval::FifteenMinutes,
        ChartInterval::ThirtyMinutes,
        ChartInterval::SixtyMinutes,
        ChartInterval::NinetyMinutes,
        ChartInterval::OneHour,
        ChartInterval::OneDay,
        ChartInterval::FiveDays,
        ChartInterval::OneWeek,
        ChartInterval::OneMonth,
        ChartInterval::ThreeMonths,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartInterval::OneMinute => "1m",
            ChartInterval::TwoMinutes => "2m",
            ChartInterval::FiveMinutes => "5m",
            ChartInterval::FifteenMinutes => "15m",
            ChartInterval::ThirtyMinutes => "30m",
            ChartInterval::SixtyMinutes => "60m",
            ChartInterval::NinetyMinutes => "90m",
            ChartInterval::OneHour => "1h",
            ChartInterval::OneDay => "1d",
            ChartInterval::FiveDays => "5d",
            ChartInterval::OneWeek => "1wk",
            ChartInterval::OneMonth => "1mo",
            ChartInterval::ThreeMonths => "3mo",
        }
    }

    /// Minute and hour buckets, labelled with a time of day on the chart
    pub fn is_intraday(&self) -> bool {
        matches!(
            self,
            ChartInterval::OneMinute
                | ChartInterval::TwoMinutes
                | ChartInterval::FiveMinutes
                | ChartInterval::FifteenMinutes
                | ChartInterval::ThirtyMinutes
                | ChartInterval::SixtyMinutes
                | ChartInterval::NinetyMinutes
                | ChartInterval::OneHour
        )
    }

    fn valid_list() -> String {
        Self::ALL.iter().map(|i| i.as_str()).collect::<Vec<_>>().join(", ")
    }
}

impl FromStr for ChartInterval {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| QueryError::InvalidInterval { valid: Self::valid_list() })
    }
}

impl fmt::Display for ChartInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Candle,
    Line,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Candle => "candle",
            ChartKind::Line => "line",
        }
    }
}

impl FromStr for ChartKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "candle" => Ok(ChartKind::Candle),
            "line" => Ok(ChartKind::Line),
            _ => Err(QueryError::InvalidKind {
                valid: "candle, line".to_string(),
            }),
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully validated chart request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockQuery {
    pub ticker: String,
    pub range: ChartRange,
    pub interval: ChartInterval,
    pub kind: ChartKind,
    pub moving_averages: Vec<usize>,
}

impl StockQuery {
    /// Chart title, e.g. `SPY (2y Range, 1wk Interval)`
    pub fn title(&self) -> String {
        format!("{} ({} Range, {} Interval)", self.ticker, self.range, self.interval)
    }

    /// Attachment/file name for this chart; ticker characters outside
    /// `[A-Za-z0-9]` become `_` (`BRK/B` -> `BRK_B_1y_1d.png`)
    pub fn file_name(&self) -> String {
        let ticker: String = self
            .ticker
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("{}_{}_{}.png", ticker, self.range, self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_round_trips_through_str() {
        for range in ChartRange::ALL {
            assert_eq!(range.as_str().parse::<ChartRange>(), Ok(range));
        }
        assert!(matches!(
            "3y".parse::<ChartRange>(),
            Err(QueryError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_interval_intraday() {
        assert!(ChartInterval::FiveMinutes.is_intraday());
        assert!(ChartInterval::OneHour.is_intraday());
        assert!(!ChartInterval::OneDay.is_intraday());
        assert!(!ChartInterval::OneWeek.is_intraday());
    }

    #[test]
    fn test_invalid_interval_lists_choices() {
        let err = "4h".parse::<ChartInterval>().unwrap_err();
        let text = err.to_string();
        assert!(text.contains("1wk"));
        assert!(text.contains("90m"));
    }

    #[test]
    fn test_title_and_file_name() {
        let query = StockQuery {
            ticker: "SPY".to_string(),
            range: ChartRange::TwoYears,
            interval: ChartInterval::OneWeek,
            kind: ChartKind::Candle,
            moving_averages: vec![5, 10, 20],
        };
        assert_eq!(query.title(), "SPY (2y Range, 1wk Interval)");
        assert_eq!(query.file_name(), "SPY_2y_1wk.png");
    }

    #[test]
    fn test_file_name_replaces_path_characters() {
        let query = StockQuery {
            ticker: "BRK/B".to_string(),
            range: ChartRange::TwoYears,
            interval: ChartInterval::OneDay,
            kind: ChartKind::Line,
            moving_averages: Vec::new(),
        };
        assert_eq!(query.file_name(), "BRK_B_2y_1d.png");
        assert_eq!(query.title(), "BRK/B (2y Range, 1d Interval)");
    }
}
