// rank.rs - Rank Command
// Content ranking with a fixed analysis-type menu. Shows literal-choice
// inference: the analysis_type union of string literals registers as a
// choice list, and the declared default fills in when the user omits it.

use slashkit::{
    ChoiceValue, CommandResult, GuildScope, InvalidParameter, ParamType, PrimitiveKind,
    RegisteredCommand, SlashArgs, SlashCommandBuilder, SlashContext, SlashValue,
};

const ANALYSIS_TYPES: [(&str, &str); 5] = [
    ("Comprehensive", "comprehensive"),
    ("Usability", "usability"),
    ("Quality", "quality"),
    ("Accessibility", "accessibility"),
    ("SEO", "seo"),
];

pub fn command(scope: GuildScope) -> Result<RegisteredCommand, InvalidParameter> {
    let analysis_type = ParamType::union(
        ANALYSIS_TYPES
            .iter()
            .map(|(label, value)| {
                ParamType::literal_named(ChoiceValue::Str((*value).to_owned()), label)
            })
            .collect(),
    );

    SlashCommandBuilder::new("rank", rank)
        .doc(
            "Rank and analyze web content.

            Parameters
            ----------
            url : str
                URL to analyze
            analysis_type : str, optional
                Type of analysis to perform
            ",
        )
        .scope(scope)
        .param("url", ParamType::Primitive(PrimitiveKind::Str))
        .param_with_default(
            "analysis_type",
            analysis_type,
            SlashValue::Str("comprehensive".to_owned()),
        )
        .build()
}

async fn rank(cx: SlashContext, args: SlashArgs) -> CommandResult {
    let url = args.string("url").unwrap_or_default().to_owned();
    let analysis_type = args
        .string("analysis_type")
        .unwrap_or("comprehensive")
        .to_owned();

    cx.send("📊 Processing ranking analysis...").await?;
    cx.followup(&format!(
        "📊 **Content Ranking Analysis**\n\nURL: {}\nAnalysis Type: {}",
        url, analysis_type
    ))
    .await
}
