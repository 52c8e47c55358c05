// context.rs - Per-invocation context for slash handlers and converters

use std::sync::Arc;

use serenity::client::Context;
use serenity::http::Http;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::id::{ChannelId, GuildId};
use serenity::model::user::User;

use crate::convert::ConverterContext;
use crate::error::CommandResult;

/// Opaque per-invocation state handed to the handler and to coercion.
/// Cloneable: both halves are reference-counted internally.
#[derive(Clone)]
pub struct SlashContext {
    pub ctx: Context,
    pub interaction: ApplicationCommandInteraction,
}

impl SlashContext {
    pub fn new(ctx: Context, interaction: ApplicationCommandInteraction) -> Self {
        SlashContext { ctx, interaction }
    }

    /// The user who invoked the command.
    pub fn user(&self) -> &User {
        &self.interaction.user
    }

    pub fn guild_id(&self) -> Option<GuildId> {
        self.interaction.guild_id
    }

    /// Send the initial response to the interaction.
    pub async fn send(&self, content: &str) -> CommandResult {
        self.interaction
            .create_interaction_response(&self.ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| message.content(content))
            })
            .await?;
        Ok(())
    }

    /// Send the initial response visible only to the invoking user.
    pub async fn send_ephemeral(&self, content: &str) -> CommandResult {
        self.interaction
            .create_interaction_response(&self.ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| message.content(content).ephemeral(true))
            })
            .await?;
        Ok(())
    }

    /// Send a follow-up message after the initial response.
    pub async fn followup(&self, content: &str) -> CommandResult {
        self.interaction
            .create_followup_message(&self.ctx.http, |message| message.content(content))
            .await?;
        Ok(())
    }
}

impl ConverterContext for SlashContext {
    fn http(&self) -> Option<Arc<Http>> {
        Some(Arc::clone(&self.ctx.http))
    }

    fn guild_id(&self) -> Option<GuildId> {
        self.interaction.guild_id
    }

    fn channel_id(&self) -> Option<ChannelId> {
        Some(self.interaction.channel_id)
    }
}
