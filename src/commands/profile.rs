// profile.rs - Profile Command
// Shows a user's profile picture. Exercises the converter path end to end:
// the `for_` parameter (public name `for`, recovered through the name remap)
// resolves a mention or raw ID into a full serenity User via HTTP lookup,
// and falls back to the invoking user when omitted.

use async_trait::async_trait;
use serenity::model::user::User;

use slashkit::{
    CommandResult, Convert, ConverterContext, GuildScope, InvalidParameter, ParamType,
    RegisteredCommand, SlashArgs, SlashCommandBuilder, SlashContext, SlashValue,
};

/// Resolves a user mention (`<@123>`) or raw snowflake into a `User`.
pub struct UserLookup;

#[async_trait]
impl Convert for UserLookup {
    async fn convert(
        &self,
        cx: &dyn ConverterContext,
        raw: &str,
    ) -> Result<SlashValue, Box<dyn std::error::Error + Send + Sync>> {
        let id = slashkit::parse_mention_id(raw)
            .ok_or_else(|| format!("'{}' is not a user mention or ID", raw))?;
        let http = cx.http().ok_or("no HTTP client available")?;
        let user = http.get_user(id).await?;
        Ok(SlashValue::rich(user))
    }
}

pub fn command(scope: GuildScope) -> Result<RegisteredCommand, InvalidParameter> {
    SlashCommandBuilder::new("profile", profile)
        .doc(
            "Show a user's profile picture.

            Parameters
            ----------
            for : str, optional
                Whose profile to show; defaults to you
            ",
        )
        .scope(scope)
        .param_with_default(
            "for_",
            ParamType::converter(UserLookup),
            SlashValue::Absent,
        )
        .notify_on_bad_argument(true)
        .build()
}

async fn profile(cx: SlashContext, args: SlashArgs) -> CommandResult {
    let user: User = match args.rich::<User>("for_") {
        Some(user) => (*user).clone(),
        None => cx.user().clone(),
    };

    let avatar_url = user
        .avatar_url()
        .unwrap_or_else(|| user.default_avatar_url());
    cx.send(&format!("**{}'s Profile Picture**\n{}", user.name, avatar_url))
        .await
}
