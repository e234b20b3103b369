//! Chart generation models

use plotters::style::RGBColor;

/// Fixed palette applied to every chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub background: RGBColor,
    pub grid: RGBColor,
    pub text: RGBColor,
    pub up: RGBColor,
    pub down: RGBColor,
    pub line: RGBColor,
    pub moving_averages: Vec<RGBColor>,
}

impl ChartStyle {
    /// Dark theme matching Discord's message background
    pub fn discord_dark() -> Self {
        Self {
            background: RGBColor(0x36, 0x39, 0x3E),
            grid: RGBColor(0x5A, 0x5E, 0x66),
            text: RGBColor(0xFF, 0xFF, 0xFF),
            up: RGBColor(0x59, 0xEB, 0x00),
            down: RGBColor(0xFF, 0x00, 0x00),
            line: RGBColor(0xFF, 0xFF, 0xFF),
            moving_averages: vec![
                RGBColor(0x56, 0x62, 0xF6),
                RGBColor(0xFF, 0xEB, 0x00),
                RGBColor(0xFF, 0x7A, 0x00),
                RGBColor(0xAE, 0xF3, 0x5A),
                RGBColor(0x02, 0x89, 0x10),
            ],
        }
    }

    /// Color for the `index`-th moving average, cycling through the palette
    pub fn moving_average_color(&self, index: usize) -> RGBColor {
        if self.moving_averages.is_empty() {
            return self.line;
        }
        self.moving_averages[index % self.moving_averages.len()]
    }
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::discord_dark()
    }
}

/// Output size and whether titles/labels are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartLayout {
    pub width: u32,
    pub height: u32,
    pub draw_text: bool,
}

impl ChartLayout {
    pub const DEFAULT_WIDTH: u32 = 1200;
    pub const DEFAULT_HEIGHT: u32 = 600;

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            draw_text: true,
        }
    }

    /// Same layout with no text; needs no system fonts
    #[cfg(test)]
    pub fn without_text(mut self) -> Self {
        self.draw_text = false;
        self
    }
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
    }
}

/// A rendered chart ready to be attached or saved
#[derive(Debug, Clone)]
pub struct StockChart {
    pub title: String,
    pub file_name: String,
    pub candles: usize,
    pub png: Vec<u8>,
}
