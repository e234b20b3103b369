use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, warn};

use crate::api::yahoo::models::{ChartResponse, CsvRow};
use crate::api::yahoo::{PayloadFormat, RawPayload};
use crate::models::{Candle, PriceSeries};
use crate::utils::errors::{ParseError, StockError};

/// Build a validated price series from a provider payload.
///
/// Rows where every price is missing are empty buckets and get skipped. Any
/// other missing or malformed value rejects the whole payload, and so does any
/// record that breaks the OHLCV invariants.
pub fn build_series(payload: &RawPayload) -> Result<PriceSeries, StockError> {
    let candles = match payload.format {
        PayloadFormat::Csv => parse_csv(&payload.body)?,
        PayloadFormat::Json => parse_json(&payload.body)?,
    };
    debug!("Parsed {} candles from {:?} payload", candles.len(), payload.format);

    PriceSeries::new(candles)
}

/// Parse the download endpoint's CSV
pub fn parse_csv(body: &str) -> Result<Vec<Candle>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut candles = Vec::new();
    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = index + 1;
        let record = result.map_err(|e| ParseError::Csv {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            message: e.to_string(),
        })?;

        let timestamp = parse_timestamp(&record.date).ok_or_else(|| ParseError::InvalidTimestamp {
            row,
            value: record.date.clone(),
        })?;

        let values = [
            csv_cell(row, "open", record.open.as_deref())?,
            csv_cell(row, "high", record.high.as_deref())?,
            csv_cell(row, "low", record.low.as_deref())?,
            csv_cell(row, "close", record.close.as_deref())?,
            csv_cell(row, "volume", record.volume.as_deref())?,
        ];

        if let Some(candle) = assemble(row, timestamp, values)? {
            candles.push(candle);
        }
    }

    Ok(candles)
}

/// Parse the chart endpoint's JSON
pub fn parse_json(body: &str) -> Result<Vec<Candle>, ParseError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| ParseError::Json(e.to_string()))?;

    if let Some(error) = response.chart.error {
        return Err(ParseError::Provider(error.to_string()));
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or(ParseError::Empty)?;

    let expected = result.timestamp.len();
    if expected == 0 {
        return Ok(Vec::new());
    }

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or(ParseError::MissingField { row: 1, field: "quote" })?;

    let open = column(quote.open, "open", expected)?;
    let high = column(quote.high, "high", expected)?;
    let low = column(quote.low, "low", expected)?;
    let close = column(quote.close, "close", expected)?;
    let volume = column(quote.volume, "volume", expected)?;

    let mut candles = Vec::with_capacity(expected);
    for (i, &seconds) in result.timestamp.iter().enumerate() {
        let row = i + 1;
        let timestamp = DateTime::<Utc>::from_timestamp(seconds, 0).ok_or_else(|| {
            ParseError::InvalidTimestamp {
                row,
                value: seconds.to_string(),
            }
        })?;

        if let Some(candle) = assemble(row, timestamp, [open[i], high[i], low[i], close[i], volume[i]])? {
            candles.push(candle);
        }
    }

    Ok(candles)
}

/// Turn one row's values into a candle.
///
/// Returns `Ok(None)` for an empty bucket (all four prices missing).
fn assemble(
    row: usize,
    timestamp: DateTime<Utc>,
    values: [Option<f64>; 5],
) -> Result<Option<Candle>, ParseError> {
    const FIELDS: [&str; 5] = ["open", "high", "low", "close", "volume"];

    if values[..4].iter().all(Option::is_none) {
        warn!("Skipping empty bucket at row {} ({})", row, timestamp);
        return Ok(None);
    }

    if let Some(missing) = values.iter().position(Option::is_none) {
        return Err(ParseError::MissingField {
            row,
            field: FIELDS[missing],
        });
    }

    let [open, high, low, close, volume] = values.map(|v| v.unwrap_or_default());
    Ok(Some(Candle {
        timestamp,
        open,
        high,
        low,
        close,
        volume,
    }))
}

/// Numeric CSV cell; empty and `null` cells are missing values
fn csv_cell(row: usize, field: &'static str, value: Option<&str>) -> Result<Option<f64>, ParseError> {
    match value {
        None | Some("") | Some("null") => Ok(None),
        Some(text) => text.parse::<f64>().map(Some).map_err(|_| ParseError::InvalidNumber {
            row,
            field,
            value: text.to_string(),
        }),
    }
}

fn column(
    values: Option<Vec<Option<f64>>>,
    field: &'static str,
    expected: usize,
) -> Result<Vec<Option<f64>>, ParseError> {
    let values = values.ok_or(ParseError::MissingField { row: 1, field })?;
    if values.len() != expected {
        return Err(ParseError::LengthMismatch {
            field,
            expected,
            found: values.len(),
        });
    }
    Ok(values)
}

/// Accepts `2024-01-02`, `2024-01-02 09:30:00-05:00`, RFC 3339, and naive
/// date-times (taken as UTC)
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}
