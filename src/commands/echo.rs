// echo.rs - Echo Command
// Repeats back user input. Shows a required string option whose description
// comes from the command's doc text rather than an explicit override.

use slashkit::{
    CommandResult, GuildScope, InvalidParameter, ParamType, PrimitiveKind, RegisteredCommand,
    SlashArgs, SlashCommandBuilder, SlashContext,
};

pub fn command(scope: GuildScope) -> Result<RegisteredCommand, InvalidParameter> {
    SlashCommandBuilder::new("echo", echo)
        .doc(
            "Echo back your message.

            Parameters
            ----------
            message : str
                The message to echo
            ",
        )
        .scope(scope)
        .param("message", ParamType::Primitive(PrimitiveKind::Str))
        .build()
}

async fn echo(cx: SlashContext, args: SlashArgs) -> CommandResult {
    let text = args.string("message").unwrap_or("No message provided");
    cx.send(text).await
}
