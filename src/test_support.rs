//! Fixtures shared by unit tests

use chrono::{Duration, TimeZone, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::models::{Candle, ChartInterval, ChartKind, ChartRange, PriceSeries, StockQuery};

/// Two weeks of daily SPY-like bars, oldest first
pub const SPY_CSV: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2024-01-02,472.16,473.67,470.49,472.65,469.36,123623700
2024-01-03,470.43,471.19,468.17,468.79,465.53,103585900
2024-01-04,468.30,470.96,467.05,467.28,464.03,84232200
2024-01-05,467.49,470.44,466.43,467.92,464.66,86118900
2024-01-08,468.43,474.75,468.30,474.60,471.30,74879100
2024-01-09,471.87,474.93,471.35,473.88,470.59,65931400
2024-01-10,474.16,477.45,473.87,476.56,473.25,67310600
2024-01-11,477.59,478.12,472.26,476.35,473.04,77940700
2024-01-12,477.84,478.60,475.23,476.68,473.37,58026400
";

pub fn spy_query(kind: ChartKind, moving_averages: Vec<usize>) -> StockQuery {
    StockQuery {
        ticker: "SPY".to_string(),
        range: ChartRange::TwoYears,
        interval: ChartInterval::OneDay,
        kind,
        moving_averages,
    }
}

/// `count` daily candles alternating up and down days
pub fn sample_series(count: usize) -> PriceSeries {
    let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
    let candles = (0..count)
        .map(|i| {
            let base = 100.0 + (i as f64 * 0.7).sin() * 10.0 + i as f64 * 0.2;
            let (open, close) = if i % 2 == 0 { (base, base + 1.5) } else { (base + 1.5, base) };
            Candle {
                timestamp: start + Duration::days(i as i64),
                open,
                high: base + 2.5,
                low: base - 1.0,
                close,
                volume: 1_000_000.0 + (i as f64 * 37_000.0),
            }
        })
        .collect();
    PriceSeries::new(candles).unwrap()
}

/// Answer a single HTTP request with a canned response; yields the raw request
pub async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        String::from_utf8_lossy(&request).into_owned()
    });

    (format!("http://{}", addr), handle)
}

/// Fresh empty directory under the system temp dir
pub fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "discord_stocks_{}_{}_{}",
        name,
        std::process::id(),
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
