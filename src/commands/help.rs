use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::CommandError;
use crate::models::{ChartInterval, ChartRange};

pub fn help_embed(prefix: &str) -> CreateEmbed {
    let ranges = ChartRange::ALL.iter().map(|r| r.as_str()).collect::<Vec<_>>().join(", ");
    let intervals = ChartInterval::ALL.iter().map(|i| i.as_str()).collect::<Vec<_>>().join(", ");

    CreateEmbed::default()
        .title("📈 Stock Chart Command")
        .description("Draws a candlestick or line chart from Yahoo Finance price history, with volume.")
        .color(0x00b0f4)
        .field(
            "Usage",
            format!("`{} <ticker> <range> <interval> <type> [moving averages...]`", prefix),
            false,
        )
        .field(
            "Examples",
            format!(
                "`{p} AAPL 1y 1d candle 2 3 5` (daily candles for the last year, 2/3/5 day MAs)\n\
                 `{p} SPY 2y 1wk candle 5 10 20` (weekly candles for two years)\n\
                 `{p} TSLA 5d 15m line` (15 minute line chart)",
                p = prefix
            ),
            false,
        )
        .field("Ranges", ranges, false)
        .field("Intervals", intervals, false)
        .field("Types", "candle, line", false)
        .field(
            "Notes",
            "• Yahoo rejects some range/interval pairs (e.g. `1d` with `5m`) with a 404\n\
             • Moving averages are whole numbers of candles",
            false,
        )
}

pub async fn execute(ctx: &Context, msg: &Message, prefix: &str) -> Result<(), CommandError> {
    msg.channel_id
        .send_message(ctx, CreateMessage::default().embed(help_embed(prefix)))
        .await?;

    Ok(())
}
