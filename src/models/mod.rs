//! Data models for the stock chart pipeline
//!
//! Queries coming in from the front ends, the price series built from provider
//! data, and the styling and output types used by the renderer.

pub mod chart;
pub mod ohlcv;
pub mod query;

// Re-export commonly used types for convenience
pub use chart::{ChartLayout, ChartStyle, StockChart};
pub use ohlcv::{Candle, PriceSeries};
pub use query::{ChartInterval, ChartKind, ChartRange, StockQuery};
