// main.rs - Sample bot wiring for slashkit
// Loads configuration from botconfig.txt, builds the sample command
// registry, registers it with Discord on ready, and routes interactions
// through the registry until shut down.

mod commands;

use std::collections::HashMap;
use std::env;
use std::fs;

use serenity::{
    async_trait,
    client::{Client, Context, EventHandler},
    model::application::interaction::Interaction,
    model::gateway::Ready,
    model::id::GuildId,
    prelude::GatewayIntents,
};
use tokio::signal;

use slashkit::{GuildScope, SlashRegistry};

struct Handler {
    registry: SlashRegistry,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        println!("✅ Bot connected as {}!", ready.user.name);
        match self.registry.sync(&ctx.http).await {
            Ok(()) => println!("✅ Registered {} slash commands with Discord", self.registry.len()),
            Err(e) => {
                log::error!("❌ Failed to register slash commands: {}", e);
                eprintln!("❌ Failed to register slash commands: {}", e);
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::ApplicationCommand(command) = interaction {
            let name = command.data.name.clone();
            if let Err(e) = self.registry.dispatch(&ctx, &command).await {
                log::error!(
                    "❌ Command '{}' failed for user {} ({}): {:?}",
                    name,
                    command.user.name,
                    command.user.id,
                    e
                );
            }
        }
    }
}

// Read KEY=VALUE configuration from botconfig.txt with multi-path fallback.
fn load_bot_config() -> Result<HashMap<String, String>, String> {
    let config_paths = [
        "botconfig.txt",
        "../botconfig.txt",
        "../../botconfig.txt",
        "src/botconfig.txt",
    ];

    for config_path in &config_paths {
        match fs::read_to_string(config_path) {
            Ok(content) => {
                // Remove BOM if present
                let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
                let mut config = HashMap::new();

                for line in content.lines() {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some(equals_pos) = line.find('=') {
                        let key = line[..equals_pos].trim().to_string();
                        let value = line[equals_pos + 1..].trim().to_string();
                        env::set_var(&key, &value);
                        config.insert(key, value);
                    }
                }

                println!("✅ Configuration loaded from {}", config_path);
                return Ok(config);
            }
            Err(_) => continue,
        }
    }

    Err("No botconfig.txt file found in any expected location (., .., ../.., src/)".to_string())
}

#[tokio::main]
async fn main() {
    // Initialize logger - must be done before any logging calls
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error"))
        .format_timestamp_secs()
        .init();

    if let Err(error) = load_bot_config() {
        log::error!("❌ Failed to load botconfig.txt: {}", error);
        eprintln!("❌ Failed to load botconfig.txt: {}", error);
        eprintln!("Create a botconfig.txt file in the project root with: DISCORD_TOKEN=your_token_here");
        return;
    }

    let token = match env::var("DISCORD_TOKEN") {
        Ok(token) => {
            if token == "YOUR_BOT_TOKEN_HERE" || token.is_empty() {
                eprintln!("❌ DISCORD_TOKEN in botconfig.txt is set to placeholder! Replace with your actual Discord bot token.");
                return;
            }
            token
        }
        Err(_) => {
            eprintln!("❌ DISCORD_TOKEN not found in botconfig.txt file!");
            return;
        }
    };

    // Commands register per-guild when GUILD_ID is set (instant propagation,
    // handy for testing), globally otherwise.
    let scope = match env::var("GUILD_ID") {
        Ok(id) => match id.parse::<u64>() {
            Ok(id) => GuildScope::Guilds(vec![GuildId(id)]),
            Err(_) => {
                eprintln!("❌ GUILD_ID in botconfig.txt is not a valid ID");
                return;
            }
        },
        Err(_) => GuildScope::Global,
    };

    // All commands are inferred up front; a bad declaration stops the bot
    // here instead of surfacing mid-session.
    let registry = match commands::build_registry(scope) {
        Ok(registry) => registry,
        Err(e) => {
            log::error!("❌ Invalid command declaration: {}", e);
            eprintln!("❌ Invalid command declaration: {}", e);
            return;
        }
    };
    println!("🤖 Built {} slash commands", registry.len());

    // Slash commands arrive as interactions; no privileged intents needed.
    let intents = GatewayIntents::non_privileged();

    let mut client = match Client::builder(token, intents)
        .event_handler(Handler { registry })
        .await
    {
        Ok(client) => client,
        Err(e) => {
            log::error!("❌ Error creating Discord client: {:?}", e);
            eprintln!("❌ Error creating Discord client: {:?}", e);
            eprintln!("Check your token in botconfig.txt file");
            return;
        }
    };

    println!("🚀 Bot is running... Press Ctrl+C to stop");
    tokio::select! {
        _ = signal::ctrl_c() => {
            println!("\n⏹️ Stopping bot gracefully...");
        }
        result = client.start() => {
            if let Err(why) = result {
                log::error!("❌ Client error: {:?}", why);
                eprintln!("❌ Client error: {:?}", why);
            }
        }
    }

    println!("✅ Bot stopped");
}
