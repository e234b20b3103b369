//! OHLCV records and the validated price series built from them

use chrono::{DateTime, Utc};

use crate::utils::errors::{ParseError, StockError, ValidationError, ValidationReason};

/// One time bucket of price and volume data
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Up candles close at or above their open
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }

    /// Check the OHLCV invariants for this record
    pub fn validate(&self) -> Result<(), ValidationReason> {
        let prices = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];

        for (field, value) in prices {
            if !value.is_finite() {
                return Err(ValidationReason::NonFinite(field));
            }
            if value <= 0.0 {
                return Err(ValidationReason::NonPositive { field, value });
            }
        }

        if self.low > self.high {
            return Err(ValidationReason::HighBelowLow {
                high: self.high,
                low: self.low,
            });
        }

        for (field, value) in [("open", self.open), ("close", self.close)] {
            if value < self.low || value > self.high {
                return Err(ValidationReason::OutsideRange { field, value });
            }
        }

        if !self.volume.is_finite() {
            return Err(ValidationReason::NonFinite("volume"));
        }
        if self.volume < 0.0 {
            return Err(ValidationReason::NegativeVolume(self.volume));
        }

        Ok(())
    }
}

/// Candles in strictly ascending timestamp order.
///
/// Only constructed through [`PriceSeries::new`], so every series is non-empty,
/// free of duplicate timestamps, and made of records that satisfy
/// `low <= open, close <= high`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    candles: Vec<Candle>,
}

impl PriceSeries {
    /// Sort ascending by timestamp, then validate every record.
    ///
    /// The whole series is rejected on the first bad record; error indices
    /// are positions in the sorted series.
    pub fn new(mut candles: Vec<Candle>) -> Result<Self, StockError> {
        if candles.is_empty() {
            return Err(ParseError::Empty.into());
        }

        // Stable, so provider order survives for already-sorted input
        candles.sort_by_key(|c| c.timestamp);

        // Indices in errors refer to the sorted series
        for (index, candle) in candles.iter().enumerate() {
            candle.validate().map_err(|reason| ValidationError {
                index,
                timestamp: candle.timestamp,
                reason,
            })?;
        }

        if let Some(index) = candles
            .windows(2)
            .position(|pair| pair[0].timestamp == pair[1].timestamp)
        {
            return Err(ValidationError {
                index: index + 1,
                timestamp: candles[index + 1].timestamp,
                reason: ValidationReason::DuplicateTimestamp,
            }
            .into());
        }

        Ok(Self { candles })
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn first(&self) -> &Candle {
        &self.candles[0]
    }

    pub fn last(&self) -> &Candle {
        &self.candles[self.candles.len() - 1]
    }

    /// Lowest low and highest high across the series
    pub fn price_bounds(&self) -> (f64, f64) {
        self.candles.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
            (lo.min(c.low), hi.max(c.high))
        })
    }

    pub fn max_volume(&self) -> f64 {
        self.candles.iter().map(|c| c.volume).fold(0.0, f64::max)
    }

    /// Simple moving average of closes.
    ///
    /// Position `i` holds the mean of closes `i + 1 - window ..= i`, or `None`
    /// while fewer than `window` closes are available.
    pub fn moving_average(&self, window: usize) -> Vec<Option<f64>> {
        if window == 0 {
            return vec![None; self.candles.len()];
        }

        let mut sum = 0.0;
        self.candles
            .iter()
            .enumerate()
            .map(|(i, c)| {
                sum += c.close;
                if i >= window {
                    sum -= self.candles[i - window].close;
                }
                if i + 1 >= window {
                    Some(sum / window as f64)
                } else {
                    None
                }
            })
            .collect()
    }
}
