use serenity::all::CreateAttachment;
use serenity::builder::CreateMessage;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::{help, CommandError};
use crate::api::yahoo::YahooClient;
use crate::config::Settings;
use crate::models::ChartStyle;
use crate::services::{query_service, stock_service};
use crate::utils::errors::StockError;

/// Message text posted with the chart image
fn chart_caption(title: &str) -> String {
    format!("📈 **{}**", title)
}

/// `&stock <ticker> <range> <interval> <type> [moving averages...]`
pub async fn execute(
    ctx: &Context,
    msg: &Message,
    settings: &Settings,
    client: &YahooClient,
    args: &[&str],
) -> Result<(), CommandError> {
    tracing::info!("📈 Stock command received from user {} with args: {:?}", msg.author.id, args);

    if args.is_empty() || args[0].eq_ignore_ascii_case("help") {
        return help::execute(ctx, msg, &settings.command_prefix).await;
    }

    let query = query_service::parse_query(&msg.content, &settings.command_prefix).map_err(StockError::from)?;
    tracing::info!("Parsed query: {}", query.title());

    // Show typing indicator while generating chart
    match msg.channel_id.broadcast_typing(ctx.http.as_ref()).await {
        Ok(_) => tracing::debug!("Broadcast typing indicator"),
        Err(e) => tracing::warn!("Failed to broadcast typing: {}", e),
    };

    let chart = stock_service::generate_chart(client, &query, &ChartStyle::discord_dark(), &settings.layout).await?;

    let size = chart.png.len();
    let attachment = CreateAttachment::bytes(chart.png, chart.file_name.clone());
    msg.channel_id
        .send_message(
            ctx,
            CreateMessage::default()
                .content(chart_caption(&chart.title))
                .add_file(attachment),
        )
        .await?;

    tracing::info!(
        "✓ Chart message sent for {} ({} candles, {} bytes)",
        chart.title,
        chart.candles,
        size
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChartKind;
    use crate::test_support::spy_query;

    #[test]
    fn test_chart_caption_carries_title() {
        let query = spy_query(ChartKind::Candle, vec![]);
        assert_eq!(chart_caption(&query.title()), "📈 **SPY (2y Range, 1d Interval)**");
    }
}
