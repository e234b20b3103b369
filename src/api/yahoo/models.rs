use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Which Yahoo Finance endpoint to query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `/v7/finance/download`, CSV history
    Download,
    /// `/v8/finance/chart`, JSON history
    Chart,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Download => "v7/finance/download",
            Endpoint::Chart => "v8/finance/chart",
        }
    }

    pub fn format(&self) -> PayloadFormat {
        match self {
            Endpoint::Download => PayloadFormat::Csv,
            Endpoint::Chart => PayloadFormat::Json,
        }
    }
}

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "download" | "csv" => Ok(Endpoint::Download),
            "chart" | "json" => Ok(Endpoint::Chart),
            other => Err(format!("Unknown endpoint '{}'. Use: download, chart", other)),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Download => f.write_str("download"),
            Endpoint::Chart => f.write_str("chart"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    Csv,
    Json,
}

/// Response body exactly as the provider sent it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    pub format: PayloadFormat,
    pub body: String,
}

/// One row of the download endpoint's CSV.
///
/// Intraday downloads label the first column `Datetime` instead of `Date`.
/// Yahoo writes `null` for buckets without trades.
#[derive(Debug, Clone, Deserialize)]
pub struct CsvRow {
    #[serde(rename = "Date", alias = "Datetime")]
    pub date: String,
    #[serde(rename = "Open")]
    pub open: Option<String>,
    #[serde(rename = "High")]
    pub high: Option<String>,
    #[serde(rename = "Low")]
    pub low: Option<String>,
    #[serde(rename = "Close")]
    pub close: Option<String>,
    #[serde(rename = "Volume")]
    pub volume: Option<String>,
}

/// Top level of the chart endpoint's JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartApiError>,
}

/// Error object returned inside an otherwise well-formed chart response
#[derive(Debug, Clone, Deserialize)]
pub struct ChartApiError {
    pub code: Option<String>,
    pub description: Option<String>,
}

impl fmt::Display for ChartApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.code.as_deref().unwrap_or("Unknown"),
            self.description.as_deref().unwrap_or("no description")
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    /// Unix seconds, one per bucket
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteColumns>,
}

/// Column-oriented OHLCV values, parallel to `ChartResult::timestamp`
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteColumns {
    pub open: Option<Vec<Option<f64>>>,
    pub high: Option<Vec<Option<f64>>>,
    pub low: Option<Vec<Option<f64>>>,
    pub close: Option<Vec<Option<f64>>>,
    pub volume: Option<Vec<Option<f64>>>,
}

/// Error body some Yahoo endpoints send alongside a non-2xx status
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub finance: Option<FinanceError>,
    pub chart: Option<ChartEnvelope>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FinanceError {
    pub error: Option<ChartApiError>,
}

impl ErrorResponse {
    /// Provider description of the failure, from whichever envelope it used
    pub fn description(&self) -> Option<String> {
        self.finance
            .as_ref()
            .and_then(|f| f.error.as_ref())
            .or_else(|| self.chart.as_ref().and_then(|c| c.error.as_ref()))
            .map(|e| e.to_string())
    }
}
