// ping.rs - Ping Command
// Measures and displays the bot's response time. The simplest possible
// slash command: no options, so inference produces an empty option list.

use slashkit::{
    CommandResult, GuildScope, InvalidParameter, RegisteredCommand, SlashArgs,
    SlashCommandBuilder, SlashContext,
};

pub fn command(scope: GuildScope) -> Result<RegisteredCommand, InvalidParameter> {
    SlashCommandBuilder::new("ping", ping)
        .description("Test bot connectivity and response time")
        .scope(scope)
        .build()
}

async fn ping(cx: SlashContext, _args: SlashArgs) -> CommandResult {
    let start_time = std::time::Instant::now();
    let elapsed = start_time.elapsed();
    cx.send(&format!("Pong! Response time: {}ms", elapsed.as_millis()))
        .await
}
