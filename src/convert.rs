// convert.rs - Runtime argument coercion
//
// Discord validates converter-backed options as plain strings; the real
// conversion into richer application types happens here, after receipt.
// Coercion only ever runs for parameters listed in a command's converter
// table whose delivered value is still a raw string.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use serde_json::Value;
use serenity::http::Http;
use serenity::model::id::{ChannelId, GuildId};

use crate::error::BadSlashArgument;
use crate::model::{ParamType, PrimitiveKind, SlashValue};

/// Parameter name to declared type, for parameters that need post-receipt
/// coercion. Keyed by the public option name.
pub type ConverterTable = HashMap<String, ParamType>;

/// Remote-lookup surface available to converters. Implemented by
/// `SlashContext` for live invocations; converters that do not need remote
/// lookups work against the defaults.
pub trait ConverterContext: Send + Sync {
    fn http(&self) -> Option<Arc<Http>> {
        None
    }

    fn guild_id(&self) -> Option<GuildId> {
        None
    }

    fn channel_id(&self) -> Option<ChannelId> {
        None
    }
}

/// Coercion capability: transforms a raw delivered string into a richer
/// value. Attached to a parameter at declaration time through
/// `ParamType::converter`; never probed for at call time.
#[async_trait]
pub trait Convert: Send + Sync {
    async fn convert(
        &self,
        cx: &dyn ConverterContext,
        raw: &str,
    ) -> Result<SlashValue, Box<dyn std::error::Error + Send + Sync>>;
}

/// Coerce one delivered wire value against its declared type.
///
/// Values Discord already parsed into a non-string shape pass through
/// unchanged; only raw strings are handled.
pub async fn coerce_value(
    cx: &dyn ConverterContext,
    key: &str,
    value: &Value,
    ty: &ParamType,
) -> Result<SlashValue, BadSlashArgument> {
    match value.as_str() {
        Some(raw) => handle_arg(cx, key, raw, ty).await,
        None => Ok(SlashValue::from_json(value)),
    }
}

/// Walk a declared type and coerce `raw` against it.
///
/// Union branches are tried left to right and the first success wins. A
/// union containing an optional branch never fails: if every concrete branch
/// fails the result is `SlashValue::Absent`. A union without one fails with
/// `BadSlashArgument` once all branches are exhausted.
pub fn handle_arg<'a>(
    cx: &'a dyn ConverterContext,
    key: &'a str,
    raw: &'a str,
    ty: &'a ParamType,
) -> BoxFuture<'a, Result<SlashValue, BadSlashArgument>> {
    Box::pin(async move {
        match ty {
            ParamType::Union(branches) => {
                let mut optional = false;
                for branch in branches {
                    let candidate = match branch {
                        ParamType::Optional(inner) => {
                            optional = true;
                            inner.as_ref()
                        }
                        other => other,
                    };
                    if let Ok(value) = handle_arg(cx, key, raw, candidate).await {
                        return Ok(value);
                    }
                }
                if optional {
                    Ok(SlashValue::Absent)
                } else {
                    Err(BadSlashArgument::NoValidBranch {
                        key: key.to_owned(),
                    })
                }
            }
            ParamType::Optional(inner) => Ok(handle_arg(cx, key, raw, inner)
                .await
                .unwrap_or(SlashValue::Absent)),
            ParamType::Converter(converter) => converter.convert(cx, raw).await.map_err(|source| {
                BadSlashArgument::ConversionFailed {
                    key: key.to_owned(),
                    source,
                }
            }),
            ParamType::Literal(choice) => {
                if raw == choice.value.to_string() {
                    Ok(choice.value.clone().into())
                } else {
                    Err(BadSlashArgument::NoValidBranch {
                        key: key.to_owned(),
                    })
                }
            }
            ParamType::Primitive(kind) => {
                coerce_primitive(*kind, raw).ok_or_else(|| BadSlashArgument::NoValidBranch {
                    key: key.to_owned(),
                })
            }
            ParamType::Unannotated => Ok(SlashValue::Str(raw.to_owned())),
        }
    })
}

/// Constructor application for primitive kinds.
fn coerce_primitive(kind: PrimitiveKind, raw: &str) -> Option<SlashValue> {
    match kind {
        PrimitiveKind::Str => Some(SlashValue::Str(raw.to_owned())),
        PrimitiveKind::Int => raw.parse::<i64>().ok().map(SlashValue::Int),
        PrimitiveKind::Number => raw.parse::<f64>().ok().map(SlashValue::Num),
        PrimitiveKind::Bool => match raw {
            "true" => Some(SlashValue::Bool(true)),
            "false" => Some(SlashValue::Bool(false)),
            _ => None,
        },
        PrimitiveKind::User
        | PrimitiveKind::Channel
        | PrimitiveKind::Role
        | PrimitiveKind::Mentionable => parse_mention_id(raw).map(SlashValue::Id),
    }
}

/// Extract a snowflake from a mention (`<@123>`, `<@!123>`, `<@&123>`,
/// `<#123>`) or from raw digits.
pub fn parse_mention_id(raw: &str) -> Option<u64> {
    let inner = if raw.starts_with('<') && raw.ends_with('>') {
        raw.trim_start_matches('<')
            .trim_end_matches('>')
            .trim_start_matches('@')
            .trim_start_matches('#')
            .trim_start_matches('!')
            .trim_start_matches('&')
    } else {
        raw
    };
    inner.parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Choice, ChoiceValue};
    use serde_json::json;

    /// Context stub for converters that do not need remote lookups.
    struct DetachedContext;
    impl ConverterContext for DetachedContext {}

    /// Parses an integer and doubles it.
    struct Doubler;

    #[async_trait]
    impl Convert for Doubler {
        async fn convert(
            &self,
            _cx: &dyn ConverterContext,
            raw: &str,
        ) -> Result<SlashValue, Box<dyn std::error::Error + Send + Sync>> {
            let parsed = raw.parse::<i64>()?;
            Ok(SlashValue::Int(parsed * 2))
        }
    }

    /// Always fails, for error-path tests.
    struct Refuser;

    #[async_trait]
    impl Convert for Refuser {
        async fn convert(
            &self,
            _cx: &dyn ConverterContext,
            _raw: &str,
        ) -> Result<SlashValue, Box<dyn std::error::Error + Send + Sync>> {
            Err("refused".into())
        }
    }

    #[tokio::test]
    async fn non_string_values_pass_through_unchanged() {
        let ty = ParamType::converter(Doubler);
        let value = coerce_value(&DetachedContext, "n", &json!(21), &ty)
            .await
            .expect("pass-through");
        assert_eq!(value, SlashValue::Int(21));
    }

    #[tokio::test]
    async fn converter_runs_on_string_values() {
        let ty = ParamType::converter(Doubler);
        let value = coerce_value(&DetachedContext, "n", &json!("21"), &ty)
            .await
            .expect("converted");
        assert_eq!(value, SlashValue::Int(42));
    }

    #[tokio::test]
    async fn union_branches_are_tried_left_to_right() {
        let ty = ParamType::union(vec![
            ParamType::converter(Refuser),
            ParamType::Primitive(PrimitiveKind::Int),
        ]);
        let value = handle_arg(&DetachedContext, "n", "7", &ty)
            .await
            .expect("second branch");
        assert_eq!(value, SlashValue::Int(7));

        // First branch wins when it succeeds.
        let ty = ParamType::union(vec![
            ParamType::converter(Doubler),
            ParamType::Primitive(PrimitiveKind::Int),
        ]);
        let value = handle_arg(&DetachedContext, "n", "7", &ty).await.unwrap();
        assert_eq!(value, SlashValue::Int(14));
    }

    #[tokio::test]
    async fn optional_branch_absorbs_total_failure() {
        let ty = ParamType::union(vec![
            ParamType::converter(Refuser),
            ParamType::optional(ParamType::Primitive(PrimitiveKind::Int)),
        ]);
        let value = handle_arg(&DetachedContext, "n", "not a number", &ty)
            .await
            .expect("optional union never fails");
        assert!(value.is_absent());
    }

    #[tokio::test]
    async fn union_without_optional_fails_when_exhausted() {
        let ty = ParamType::union(vec![
            ParamType::converter(Refuser),
            ParamType::Primitive(PrimitiveKind::Int),
        ]);
        let err = handle_arg(&DetachedContext, "n", "not a number", &ty)
            .await
            .expect_err("no branch matched");
        assert!(matches!(err, BadSlashArgument::NoValidBranch { .. }));
        assert_eq!(err.key(), "n");
    }

    #[tokio::test]
    async fn converter_failure_keeps_the_original_cause() {
        let ty = ParamType::converter(Refuser);
        let err = handle_arg(&DetachedContext, "who", "x", &ty)
            .await
            .expect_err("conversion failed");
        match err {
            BadSlashArgument::ConversionFailed { ref key, ref source } => {
                assert_eq!(key, "who");
                assert_eq!(source.to_string(), "refused");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn literal_coerces_only_its_own_constant() {
        let ty = ParamType::Literal(Choice::named(ChoiceValue::Int(2), "name"));
        let value = handle_arg(&DetachedContext, "bar", "2", &ty).await.unwrap();
        assert_eq!(value, SlashValue::Int(2));
        assert!(handle_arg(&DetachedContext, "bar", "3", &ty).await.is_err());
    }

    #[tokio::test]
    async fn nested_optionals_resolve_through_unions() {
        let ty = ParamType::optional(ParamType::union(vec![
            ParamType::Primitive(PrimitiveKind::Bool),
            ParamType::Primitive(PrimitiveKind::Int),
        ]));
        let value = handle_arg(&DetachedContext, "flag", "true", &ty).await.unwrap();
        assert_eq!(value, SlashValue::Bool(true));
        let value = handle_arg(&DetachedContext, "flag", "xyz", &ty).await.unwrap();
        assert!(value.is_absent());
    }

    #[test]
    fn mention_parsing_handles_all_mention_shapes() {
        assert_eq!(parse_mention_id("<@123456789>"), Some(123456789));
        assert_eq!(parse_mention_id("<@!123456789>"), Some(123456789));
        assert_eq!(parse_mention_id("<@&42>"), Some(42));
        assert_eq!(parse_mention_id("<#42>"), Some(42));
        assert_eq!(parse_mention_id("42"), Some(42));
        assert_eq!(parse_mention_id("not an id"), None);
    }
}
