//! One-shot command line mode: render a single chart to disk and exit

use tracing::{error, info};

use crate::api::yahoo::YahooClient;
use crate::config::Settings;
use crate::models::ChartStyle;
use crate::services::{query_service, stock_service};
use crate::utils::errors::StockError;

/// Run the pipeline once for `args` (`<ticker> <range> <interval> <type> [mav...]`).
///
/// Returns the process exit code.
pub async fn run(settings: &Settings, client: &YahooClient, args: &[String]) -> i32 {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match render(settings, client, &args).await {
        Ok(candles) => {
            info!(
                "Complete: {} candles written to {}",
                candles,
                settings.output_path.display()
            );
            0
        }
        Err(StockError::Fetch(e)) => {
            error!("fetch failed (status {:?}): {}", e.status_code(), e);
            1
        }
        Err(e) => {
            error!("{} failed: {}", e.stage(), e);
            1
        }
    }
}

async fn render(settings: &Settings, client: &YahooClient, args: &[&str]) -> Result<usize, StockError> {
    let query = query_service::parse_args(args, env!("CARGO_PKG_NAME"))?;
    info!("Rendering {}", query.title());

    stock_service::save_chart(
        client,
        &query,
        &ChartStyle::discord_dark(),
        &settings.layout,
        &settings.output_path,
    )
    .await
}
