use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::{debug, warn};

use crate::models::{ChartKind, ChartLayout, ChartStyle, PriceSeries, StockQuery};
use crate::utils::errors::RenderError;

/// Share of the image height given to the volume subpanel
const VOLUME_PANEL_RATIO: f64 = 0.28;
/// Candle body width relative to one x slot
const CANDLE_WIDTH_RATIO: f64 = 0.8;
/// Volume bar width relative to one x slot
const VOLUME_WIDTH_RATIO: f64 = 0.65;
const Y_LABEL_AREA: u32 = 70;
const X_LABEL_AREA: u32 = 30;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

fn check_layout(layout: &ChartLayout) -> Result<(), RenderError> {
    if layout.width == 0 || layout.height == 0 {
        return Err(RenderError::InvalidLayout {
            width: layout.width,
            height: layout.height,
        });
    }
    Ok(())
}

/// Compact volume label: 1.2K, 3.4M, 5.6B
pub fn format_volume(volume: f64) -> String {
    let abs = volume.abs();
    if abs >= 1e9 {
        format!("{:.1}B", volume / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", volume / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}K", volume / 1e3)
    } else {
        format!("{:.0}", volume)
    }
}

/// Draw the full chart (price panel on top, volume below) onto `root`
fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &PriceSeries,
    query: &StockQuery,
    style: &ChartStyle,
    layout: &ChartLayout,
) -> Result<(), RenderError> {
    root.fill(&style.background).map_err(draw_err)?;

    let price_height = (layout.height as f64 * (1.0 - VOLUME_PANEL_RATIO)) as u32;
    let (upper, lower) = root.split_vertically(price_height);

    let candles = series.candles();
    let n = candles.len();
    // One x slot per record, so weekends and closed hours leave no gaps
    let x_range = -0.5f64..(n as f64 - 0.5);

    let (low, high) = series.price_bounds();
    let padding = ((high - low) * 0.05).max(high * 1e-3);
    let y_range = (low - padding).max(0.0)..(high + padding);

    let date_format = if query.interval.is_intraday() {
        "%m-%d %H:%M"
    } else {
        "%Y-%m-%d"
    };
    let x_formatter = |x: &f64| -> String {
        let i = x.round();
        if i < 0.0 || i as usize >= n {
            return String::new();
        }
        candles[i as usize].timestamp.format(date_format).to_string()
    };
    let price_formatter = |y: &f64| format!("{:.2}", y);
    let volume_formatter = |y: &f64| format_volume(*y);
    let label_style = ("sans-serif", 14.0).into_font().color(&style.text);
    let y_label_area = if layout.draw_text { Y_LABEL_AREA } else { 0 };

    // Price panel
    let mut builder = ChartBuilder::on(&upper);
    builder.margin(10).y_label_area_size(y_label_area);
    if layout.draw_text {
        builder.caption(query.title(), ("sans-serif", 24.0).into_font().color(&style.text));
    }
    let mut price_chart = builder
        .build_cartesian_2d(x_range.clone(), y_range)
        .map_err(draw_err)?;

    if layout.draw_text {
        price_chart
            .configure_mesh()
            .bold_line_style(style.grid.mix(0.5).stroke_width(1))
            .light_line_style(style.grid.mix(0.15).stroke_width(1))
            .axis_style(style.grid.stroke_width(1))
            .label_style(label_style.clone())
            .y_labels(8)
            .y_label_formatter(&price_formatter)
            .draw()
            .map_err(draw_err)?;
    }

    let slot_pixels = price_chart.plotting_area().dim_in_pixel().0 as f64 / n as f64;

    match query.kind {
        ChartKind::Candle => {
            // Hollow up bodies let the background show through
            let gain = style.up.stroke_width(1);
            let loss = style.down.filled();
            let width = (slot_pixels * CANDLE_WIDTH_RATIO).max(1.0) as u32;
            // CandleStick counts open == close as a loss; follow Candle::is_up so
            // price and volume agree on every record
            price_chart
                .draw_series(candles.iter().enumerate().map(|(i, c)| {
                    let candle_style = if c.is_up() { gain } else { loss };
                    CandleStick::new(i as f64, c.open, c.high, c.low, c.close, candle_style, candle_style, width)
                }))
                .map_err(draw_err)?;
        }
        ChartKind::Line => {
            price_chart
                .draw_series(LineSeries::new(
                    candles.iter().enumerate().map(|(i, c)| (i as f64, c.close)),
                    style.line.stroke_width(2),
                ))
                .map_err(draw_err)?;
        }
    }

    let mut legend = Vec::new();
    for (slot, &window) in query.moving_averages.iter().enumerate() {
        if window > n {
            warn!("Skipping MA{}: only {} candles available", window, n);
            continue;
        }

        let color = style.moving_average_color(slot);
        let averages = series.moving_average(window);
        price_chart
            .draw_series(LineSeries::new(
                averages
                    .iter()
                    .enumerate()
                    .filter_map(|(i, value)| value.map(|v| (i as f64, v))),
                color.stroke_width(2),
            ))
            .map_err(draw_err)?;

        if let Some(Some(latest)) = averages.last() {
            legend.push((format!("MA{}: {:.2}", window, latest), color));
        }
    }

    if layout.draw_text {
        let left = y_label_area as i32 + 20;
        for (i, (label, color)) in legend.iter().enumerate() {
            upper
                .draw(&Text::new(
                    label.as_str(),
                    (left, 45 + 18 * i as i32),
                    ("sans-serif", 14.0).into_font().color(color),
                ))
                .map_err(draw_err)?;
        }
    }

    // Volume panel
    let max_volume = series.max_volume().max(1.0);
    let mut builder = ChartBuilder::on(&lower);
    builder
        .margin(10)
        .margin_top(0)
        .y_label_area_size(y_label_area)
        .x_label_area_size(if layout.draw_text { X_LABEL_AREA } else { 0 });
    let mut volume_chart = builder
        .build_cartesian_2d(x_range, 0f64..max_volume * 1.05)
        .map_err(draw_err)?;

    if layout.draw_text {
        volume_chart
            .configure_mesh()
            .bold_line_style(style.grid.mix(0.5).stroke_width(1))
            .light_line_style(style.grid.mix(0.15).stroke_width(1))
            .axis_style(style.grid.stroke_width(1))
            .label_style(label_style)
            .x_labels(8)
            .y_labels(3)
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&volume_formatter)
            .draw()
            .map_err(draw_err)?;
    }

    let half = VOLUME_WIDTH_RATIO / 2.0;
    volume_chart
        .draw_series(candles.iter().enumerate().map(|(i, c)| {
            let color = if c.is_up() { style.up } else { style.down };
            let x = i as f64;
            Rectangle::new([(x - half, 0.0), (x + half, c.volume)], color.filled())
        }))
        .map_err(draw_err)?;

    Ok(())
}

/// Render into a raw RGB buffer (`width * height * 3` bytes)
#[cfg(test)]
pub fn render_to_buffer(
    series: &PriceSeries,
    query: &StockQuery,
    style: &ChartStyle,
    layout: &ChartLayout,
) -> Result<Vec<u8>, RenderError> {
    check_layout(layout)?;

    let mut buffer = vec![0u8; layout.width as usize * layout.height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (layout.width, layout.height))
            .into_drawing_area();
        draw_chart(&root, series, query, style, layout)?;
        root.present().map_err(draw_err)?;
    }

    Ok(buffer)
}

/// Hidden temporary file next to `path`, ending in `.png` so the encoder picks PNG
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("chart");
    path.with_file_name(format!(
        ".{}.{}-{}.tmp.png",
        name,
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ))
}

fn write_png(
    series: &PriceSeries,
    query: &StockQuery,
    style: &ChartStyle,
    layout: &ChartLayout,
    path: &Path,
) -> Result<(), RenderError> {
    let root = BitMapBackend::new(path, (layout.width, layout.height)).into_drawing_area();
    draw_chart(&root, series, query, style, layout)?;
    root.present().map_err(draw_err)
}

/// Render a PNG to `path`.
///
/// The image is written to a temporary sibling and renamed into place, so a
/// failed render never leaves a partial file at `path`.
pub fn render_to_file(
    series: &PriceSeries,
    query: &StockQuery,
    style: &ChartStyle,
    layout: &ChartLayout,
    path: &Path,
) -> Result<(), RenderError> {
    check_layout(layout)?;

    let temp_path = temp_sibling(path);
    debug!("Rendering chart to {}", temp_path.display());

    let drawn = write_png(series, query, style, layout, &temp_path);

    match drawn.and_then(|_| fs::rename(&temp_path, path).map_err(RenderError::from)) {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(&temp_path);
            Err(e)
        }
    }
}

/// Render a PNG and return its bytes
pub fn render_png(
    series: &PriceSeries,
    query: &StockQuery,
    style: &ChartStyle,
    layout: &ChartLayout,
) -> Result<Vec<u8>, RenderError> {
    let temp_file = std::env::temp_dir().join(format!(
        "discord_stocks_chart_{}_{}.png",
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    render_to_file(series, query, style, layout, &temp_file)?;

    let image_data = fs::read(&temp_file);
    // Clean up temporary file
    let _ = fs::remove_file(&temp_file);

    Ok(image_data?)
}
