pub mod help;
pub mod stock;

use std::sync::Arc;

use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;
use thiserror::Error;
use tracing::error;

use crate::api::yahoo::YahooClient;
use crate::config::Settings;
use crate::utils::errors::StockError;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Stock(#[from] StockError),
    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),
    #[error("{0} not initialized")]
    MissingState(&'static str),
}

/// Shared, read-only bot state stored in the client's type map
async fn bot_state(ctx: &Context) -> Result<(Arc<Settings>, YahooClient), CommandError> {
    let data = ctx.data.read().await;
    let settings = data
        .get::<crate::BotSettings>()
        .cloned()
        .ok_or(CommandError::MissingState("Settings"))?;
    let client = data
        .get::<crate::StockClient>()
        .cloned()
        .ok_or(CommandError::MissingState("Yahoo client"))?;
    Ok((settings, client))
}

pub async fn handle_message(ctx: &Context, msg: &Message) {
    if msg.author.bot {
        return;
    }

    // Parse command and arguments
    let parts: Vec<&str> = msg.content.split_whitespace().collect();
    let Some(&command) = parts.first() else {
        return;
    };

    let (settings, client) = match bot_state(ctx).await {
        Ok(state) => state,
        Err(e) => {
            error!("Cannot handle message: {}", e);
            return;
        }
    };

    if command != settings.command_prefix {
        return;
    }

    let args = &parts[1..];
    let result = stock::execute(ctx, msg, &settings, &client, args).await;

    if let Err(e) = result {
        error!("❌ Error executing command {}: {}", command, e);

        // Send error to user as Discord message embed
        let embed = CreateEmbed::default()
            .title("Command Error")
            .description(user_message(&e))
            .color(0xff0000);

        let _ = msg
            .channel_id
            .send_message(ctx, CreateMessage::default().embed(embed))
            .await;
    }
}

/// User-facing description of a failed command, naming the failed stage
pub fn user_message(err: &CommandError) -> String {
    match err {
        CommandError::Stock(StockError::Query(e)) => format!("❌ {}", e),
        CommandError::Stock(e) => {
            let stage = e.stage();
            let mut chars = stage.chars();
            let stage = match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            };
            format!("❌ **{} failed**: {}", stage, e)
        }
        CommandError::Discord(e) => {
            let error_msg = e.to_string();
            if error_msg.contains("429") || error_msg.contains("rate limit") {
                "⚠️ **Rate Limited**: Discord is rate limiting us. Please try again in a moment.".to_string()
            } else {
                "⚠️ **Network Error**: Having trouble connecting to Discord. Please try again.".to_string()
            }
        }
        CommandError::MissingState(_) => "❌ An error occurred while executing the command.".to_string(),
    }
}
