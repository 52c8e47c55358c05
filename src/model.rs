// model.rs - Data model for slash command descriptors and runtime values
//
// Everything here is built once when a command is declared and is immutable
// afterwards. The registration payload types derive Serialize so the exact
// JSON pushed to Discord can be logged.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use serenity::model::application::command::CommandOptionType;
use serenity::model::id::GuildId;

use crate::convert::Convert;

/// The primitive kinds Discord can represent as option types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrimitiveKind {
    Str,
    Int,
    Bool,
    Number,
    User,
    Channel,
    Role,
    Mentionable,
}

impl PrimitiveKind {
    /// The Discord option type this kind registers as.
    pub fn option_type(self) -> CommandOptionType {
        match self {
            PrimitiveKind::Str => CommandOptionType::String,
            PrimitiveKind::Int => CommandOptionType::Integer,
            PrimitiveKind::Bool => CommandOptionType::Boolean,
            PrimitiveKind::Number => CommandOptionType::Number,
            PrimitiveKind::User => CommandOptionType::User,
            PrimitiveKind::Channel => CommandOptionType::Channel,
            PrimitiveKind::Role => CommandOptionType::Role,
            PrimitiveKind::Mentionable => CommandOptionType::Mentionable,
        }
    }
}

/// A literal constant usable as a choice value. Discord only accepts string,
/// integer and floating-point choice values, so other kinds are
/// unrepresentable here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChoiceValue {
    Str(String),
    Int(i64),
    Number(f64),
}

impl ChoiceValue {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            ChoiceValue::Str(_) => PrimitiveKind::Str,
            ChoiceValue::Int(_) => PrimitiveKind::Int,
            ChoiceValue::Number(_) => PrimitiveKind::Number,
        }
    }
}

impl fmt::Display for ChoiceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoiceValue::Str(s) => f.write_str(s),
            ChoiceValue::Int(i) => write!(f, "{}", i),
            ChoiceValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// One fixed value+label pair restricting an option to a closed set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub name: String,
    pub value: ChoiceValue,
}

impl Choice {
    /// A choice whose display name is the stringified value.
    pub fn new(value: ChoiceValue) -> Self {
        Choice {
            name: value.to_string(),
            value,
        }
    }

    /// A choice with an explicit display label.
    pub fn named(value: ChoiceValue, name: &str) -> Self {
        Choice {
            name: name.to_owned(),
            value,
        }
    }
}

/// Declared type of a single command parameter.
///
/// This is the closed-variant replacement for annotation reflection: each
/// parameter declares its shape exactly once, and everything downstream
/// (inference, registration, coercion) pattern-matches over it.
#[derive(Clone)]
pub enum ParamType {
    /// No declared type; treated as a plain string.
    Unannotated,
    Primitive(PrimitiveKind),
    /// A single literal constant, optionally carrying a display label.
    Literal(Choice),
    /// A type with a coercion capability; always registers as STRING since
    /// real conversion happens after receipt.
    Converter(Arc<dyn Convert>),
    /// The value may be absent; inner failures coerce to absence.
    Optional(Box<ParamType>),
    /// Candidate types tried left to right.
    Union(Vec<ParamType>),
}

impl ParamType {
    pub fn literal(value: ChoiceValue) -> Self {
        ParamType::Literal(Choice::new(value))
    }

    pub fn literal_named(value: ChoiceValue, name: &str) -> Self {
        ParamType::Literal(Choice::named(value, name))
    }

    pub fn converter<C: Convert + 'static>(converter: C) -> Self {
        ParamType::Converter(Arc::new(converter))
    }

    pub fn optional(inner: ParamType) -> Self {
        ParamType::Optional(Box::new(inner))
    }

    pub fn union(branches: Vec<ParamType>) -> Self {
        ParamType::Union(branches)
    }
}

impl fmt::Debug for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Unannotated => f.write_str("Unannotated"),
            ParamType::Primitive(kind) => write!(f, "Primitive({:?})", kind),
            ParamType::Literal(choice) => write!(f, "Literal({:?})", choice),
            ParamType::Converter(_) => f.write_str("Converter(..)"),
            ParamType::Optional(inner) => write!(f, "Optional({:?})", inner),
            ParamType::Union(branches) => write!(f, "Union({:?})", branches),
        }
    }
}

/// Innermost concrete type of a declaration, after unwrapping optional and
/// union layers down to their first concrete branch.
#[derive(Clone)]
pub enum RootType {
    Unannotated,
    Primitive(PrimitiveKind),
    Converter(Arc<dyn Convert>),
}

/// Which servers a command registers against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GuildScope {
    Global,
    Guilds(Vec<GuildId>),
}

impl Default for GuildScope {
    fn default() -> Self {
        GuildScope::Global
    }
}

/// A single named, typed argument exposed on a registered command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionSpec {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub option_type: CommandOptionType,
    pub required: bool,
    pub choices: Vec<Choice>,
}

/// Everything the registration call needs for one command. Built once at
/// declaration time; `name_remap` maps public option names back to the
/// internal parameter names the handler sees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandDescriptor {
    pub name: String,
    pub description: String,
    pub scope: GuildScope,
    pub options: Vec<OptionSpec>,
    pub name_remap: HashMap<String, String>,
}

/// Runtime value of one delivered argument, after any coercion.
#[derive(Clone)]
pub enum SlashValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Num(f64),
    /// A Discord snowflake parsed out of a mention or raw digits.
    Id(u64),
    /// An optional parameter that resolved to nothing.
    Absent,
    /// A converter-produced application type.
    Rich(Arc<dyn Any + Send + Sync>),
}

impl SlashValue {
    /// Wrap a converter output.
    pub fn rich<T: Any + Send + Sync>(value: T) -> Self {
        SlashValue::Rich(Arc::new(value))
    }

    /// Map a wire value onto the runtime shape. Values Discord already parsed
    /// (integers, booleans, numbers) keep their type; anything else stays a
    /// string.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => SlashValue::Str(s.clone()),
            Value::Bool(b) => SlashValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => SlashValue::Int(i),
                None => SlashValue::Num(n.as_f64().unwrap_or_default()),
            },
            Value::Null => SlashValue::Absent,
            other => SlashValue::Str(other.to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SlashValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SlashValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SlashValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SlashValue::Num(n) => Some(*n),
            SlashValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<u64> {
        match self {
            SlashValue::Id(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, SlashValue::Absent)
    }

    /// Recover a converter output by type.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            SlashValue::Rich(value) => Arc::clone(value).downcast::<T>().ok(),
            _ => None,
        }
    }
}

impl From<ChoiceValue> for SlashValue {
    fn from(value: ChoiceValue) -> Self {
        match value {
            ChoiceValue::Str(s) => SlashValue::Str(s),
            ChoiceValue::Int(i) => SlashValue::Int(i),
            ChoiceValue::Number(n) => SlashValue::Num(n),
        }
    }
}

impl PartialEq for SlashValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SlashValue::Str(a), SlashValue::Str(b)) => a == b,
            (SlashValue::Int(a), SlashValue::Int(b)) => a == b,
            (SlashValue::Bool(a), SlashValue::Bool(b)) => a == b,
            (SlashValue::Num(a), SlashValue::Num(b)) => a == b,
            (SlashValue::Id(a), SlashValue::Id(b)) => a == b,
            (SlashValue::Absent, SlashValue::Absent) => true,
            (SlashValue::Rich(a), SlashValue::Rich(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for SlashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlashValue::Str(s) => write!(f, "Str({:?})", s),
            SlashValue::Int(i) => write!(f, "Int({})", i),
            SlashValue::Bool(b) => write!(f, "Bool({})", b),
            SlashValue::Num(n) => write!(f, "Num({})", n),
            SlashValue::Id(id) => write!(f, "Id({})", id),
            SlashValue::Absent => f.write_str("Absent"),
            SlashValue::Rich(_) => f.write_str("Rich(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn choice_name_defaults_to_stringified_value() {
        assert_eq!(Choice::new(ChoiceValue::Int(1)).name, "1");
        assert_eq!(
            Choice::new(ChoiceValue::Str("usability".to_owned())).name,
            "usability"
        );
        assert_eq!(Choice::named(ChoiceValue::Int(2), "name").name, "name");
    }

    #[test]
    fn from_json_keeps_preparsed_types() {
        assert_eq!(SlashValue::from_json(&json!("hi")), SlashValue::Str("hi".to_owned()));
        assert_eq!(SlashValue::from_json(&json!(3)), SlashValue::Int(3));
        assert_eq!(SlashValue::from_json(&json!(2.5)), SlashValue::Num(2.5));
        assert_eq!(SlashValue::from_json(&json!(true)), SlashValue::Bool(true));
    }

    #[test]
    fn rich_values_downcast_by_type() {
        let value = SlashValue::rich(vec![1u64, 2, 3]);
        let got = value.downcast::<Vec<u64>>().expect("downcast");
        assert_eq!(*got, vec![1, 2, 3]);
        assert!(value.downcast::<String>().is_none());
    }
}
