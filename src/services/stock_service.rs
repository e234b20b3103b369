use std::path::Path;

use tracing::info;

use crate::api::yahoo::YahooClient;
use crate::models::{ChartLayout, ChartStyle, PriceSeries, StockChart, StockQuery};
use crate::services::{chart_service, series_service};
use crate::utils::errors::StockError;

/// Fetch and validate the price series for a query
pub async fn fetch_series(client: &YahooClient, query: &StockQuery) -> Result<PriceSeries, StockError> {
    info!(
        "📈 Fetching {} ({} range, {} interval) from {} endpoint",
        query.ticker,
        query.range,
        query.interval,
        client.endpoint()
    );

    let payload = client
        .fetch_history(&query.ticker, query.range, query.interval)
        .await?;
    let series = series_service::build_series(&payload)?;

    info!(
        "✓ Built series of {} candles for {} ({} to {})",
        series.len(),
        query.ticker,
        series.first().timestamp,
        series.last().timestamp
    );
    Ok(series)
}

/// Run the whole pipeline and return the chart as PNG bytes
pub async fn generate_chart(
    client: &YahooClient,
    query: &StockQuery,
    style: &ChartStyle,
    layout: &ChartLayout,
) -> Result<StockChart, StockError> {
    let series = fetch_series(client, query).await?;
    let png = chart_service::render_png(&series, query, style, layout)?;
    info!("✓ Chart generated successfully: {} bytes", png.len());

    Ok(StockChart {
        title: query.title(),
        file_name: query.file_name(),
        candles: series.len(),
        png,
    })
}

/// Run the whole pipeline and write the chart to `path`
///
/// Returns the number of candles drawn.
pub async fn save_chart(
    client: &YahooClient,
    query: &StockQuery,
    style: &ChartStyle,
    layout: &ChartLayout,
    path: &Path,
) -> Result<usize, StockError> {
    let series = fetch_series(client, query).await?;
    chart_service::render_to_file(&series, query, style, layout, path)?;
    info!("✓ Chart written to {}", path.display());

    Ok(series.len())
}
