use std::sync::Arc;

use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod cli;
mod commands;
mod config;
mod models;
mod services;
mod utils;

#[cfg(test)]
mod test_support;

use api::yahoo::YahooClient;
use config::Settings;

struct Handler;

struct BotSettings;

impl TypeMapKey for BotSettings {
    type Value = Arc<Settings>;
}

struct StockClient;

impl TypeMapKey for StockClient {
    type Value = YahooClient;
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        commands::handle_message(&ctx, &msg).await;
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
    }
}

async fn run_bot(settings: Settings, client: YahooClient) {
    let token = match settings.require_discord_token() {
        Ok(token) => token.to_string(),
        Err(e) => {
            error!("{}; pass chart arguments to render once without Discord", e);
            return;
        }
    };

    let intents = GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGES;

    let mut discord = match Client::builder(&token, intents).event_handler(Handler).await {
        Ok(discord) => discord,
        Err(e) => {
            error!("Failed to create client: {}", e);
            return;
        }
    };

    // Store the settings and HTTP client in client data
    {
        let mut data = discord.data.write().await;
        data.insert::<BotSettings>(Arc::new(settings));
        data.insert::<StockClient>(client);
    }

    if let Err(e) = discord.start().await {
        error!("Client error: {}", e);
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()
            .add_directive("discord_stocks=debug".parse().unwrap())
            .add_directive("serenity=warn".parse().unwrap()))
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let client = match YahooClient::new(&settings.provider) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            std::process::exit(2);
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        let code = cli::run(&settings, &client, &args).await;
        std::process::exit(code);
    }

    info!("📈 Starting discord-stocks bot (prefix {})...", settings.command_prefix);
    run_bot(settings, client).await;
}
