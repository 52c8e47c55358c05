// infer.rs - Option inference
//
// Turns a declared handler signature plus its doc text into the registration
// descriptor Discord needs and the converter table used at invocation time.
// This runs exactly once per command, when the command is built.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serenity::model::application::command::CommandOptionType;

use crate::convert::ConverterTable;
use crate::docstring;
use crate::error::InvalidParameter;
use crate::model::{
    Choice, CommandDescriptor, GuildScope, OptionSpec, ParamType, RootType, SlashValue,
};

/// Placeholder used when neither the doc text nor an override supplies one.
const NO_DESCRIPTION: &str = "No description";

/// Rust's strict and reserved keywords; parameter names colliding with one
/// conventionally carry a trailing underscore.
static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
        "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
        "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true",
        "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final",
        "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
    ]
    .into_iter()
    .collect()
});

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(word)
}

/// One declared handler parameter.
#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: String,
    pub ty: ParamType,
    /// Filled in at dispatch when the caller omits the option; a parameter
    /// with no default is required.
    pub default: Option<SlashValue>,
}

/// Declared shape of a handler: the inference input.
#[derive(Debug, Clone)]
pub struct HandlerSpec {
    pub name: String,
    /// Overrides the doc summary when set.
    pub description: Option<String>,
    pub doc: Option<String>,
    pub scope: GuildScope,
    pub strip_keyword_underscores: bool,
    pub params: Vec<ParamDecl>,
}

/// Unwrap optional/union layers down to the first concrete branch.
pub fn root_type(ty: &ParamType) -> Result<RootType, InvalidParameter> {
    match ty {
        ParamType::Unannotated => Ok(RootType::Unannotated),
        ParamType::Primitive(kind) => Ok(RootType::Primitive(*kind)),
        ParamType::Literal(choice) => Ok(RootType::Primitive(choice.value.kind())),
        ParamType::Converter(converter) => Ok(RootType::Converter(converter.clone())),
        ParamType::Optional(inner) => root_type(inner),
        ParamType::Union(branches) => match branches.first() {
            Some(first) => root_type(first),
            None => Err(InvalidParameter("empty union annotation".to_owned())),
        },
    }
}

/// True iff the declared type is a union whose branches are all literal
/// constants of one shared primitive kind. All branches are checked, not just
/// the first.
pub fn validate_literal_union(ty: &ParamType) -> bool {
    let ParamType::Union(branches) = ty else {
        return false;
    };
    let mut kinds = Vec::with_capacity(branches.len());
    for branch in branches {
        match branch {
            ParamType::Literal(choice) => kinds.push(choice.value.kind()),
            _ => return false,
        }
    }
    match kinds.split_first() {
        Some((first, rest)) => rest.iter().all(|kind| kind == first),
        None => false,
    }
}

/// The Discord option type for a declared parameter type. Converters (or
/// optionals/unions rooted in one) always register as STRING; the wire
/// surface only accepts primitives and real conversion happens after receipt.
pub fn option_type_for(ty: &ParamType) -> Result<CommandOptionType, InvalidParameter> {
    match root_type(ty)? {
        RootType::Unannotated => Ok(CommandOptionType::String),
        RootType::Converter(_) => Ok(CommandOptionType::String),
        RootType::Primitive(kind) => Ok(kind.option_type()),
    }
}

fn unwrap_optional(ty: &ParamType) -> &ParamType {
    match ty {
        ParamType::Optional(inner) => unwrap_optional(inner),
        other => other,
    }
}

/// Reject union shapes with no well-defined meaning: literal choices mixed
/// with a converter, and all-literal unions of heterogeneous constant kinds.
fn check_union_shape(name: &str, ty: &ParamType) -> Result<(), InvalidParameter> {
    let ParamType::Union(branches) = ty else {
        return Ok(());
    };
    let any_literal = branches
        .iter()
        .any(|branch| matches!(branch, ParamType::Literal(_)));
    let any_converter = branches
        .iter()
        .any(|branch| matches!(unwrap_optional(branch), ParamType::Converter(_)));
    if any_literal && any_converter {
        return Err(InvalidParameter(format!(
            "Parameter {} mixes literal choices with a converter",
            name
        )));
    }
    let all_literal = branches
        .iter()
        .all(|branch| matches!(branch, ParamType::Literal(_)));
    if all_literal && !validate_literal_union(ty) {
        return Err(InvalidParameter(format!(
            "Parameter {} declares literal choices of mixed kinds",
            name
        )));
    }
    Ok(())
}

fn literal_choices(ty: &ParamType) -> Vec<Choice> {
    let ParamType::Union(branches) = ty else {
        return Vec::new();
    };
    branches
        .iter()
        .filter_map(|branch| match branch {
            ParamType::Literal(choice) => Some(choice.clone()),
            _ => None,
        })
        .collect()
}

/// Build the registration descriptor and converter table for a handler.
///
/// Options come out in declaration order. Fails with `InvalidParameter` when
/// a parameter's declared type cannot be represented on the wire; this is a
/// programmer error and surfaces at definition time.
pub fn infer(spec: &HandlerSpec) -> Result<(CommandDescriptor, ConverterTable), InvalidParameter> {
    let parsed = spec
        .doc
        .as_deref()
        .map(docstring::parse)
        .unwrap_or_default();

    let description = spec
        .description
        .clone()
        .or_else(|| parsed.short_description.clone())
        .unwrap_or_else(|| NO_DESCRIPTION.to_owned());

    let mut options = Vec::with_capacity(spec.params.len());
    let mut name_remap = std::collections::HashMap::new();
    let mut converters = ConverterTable::new();

    for param in &spec.params {
        // Trailing-underscore names exist to dodge keyword collisions; the
        // public option drops the underscore and the remap recovers the
        // internal name at dispatch.
        let mut public = param.name.as_str();
        if spec.strip_keyword_underscores {
            if let Some(stem) = param.name.strip_suffix('_') {
                if is_keyword(stem) {
                    public = stem;
                    name_remap.insert(stem.to_owned(), param.name.clone());
                }
            }
        }

        let description = parsed
            .params
            .get(public)
            .filter(|text| !text.is_empty())
            .cloned()
            .unwrap_or_else(|| NO_DESCRIPTION.to_owned());

        check_union_shape(public, &param.ty)?;

        let choices;
        let option_type;
        if validate_literal_union(&param.ty) {
            choices = literal_choices(&param.ty);
            option_type = choices[0].value.kind().option_type();
        } else {
            choices = Vec::new();
            option_type = option_type_for(&param.ty)?;
            if matches!(root_type(&param.ty)?, RootType::Converter(_)) {
                converters.insert(public.to_owned(), param.ty.clone());
            }
        }

        log::debug!(
            "inferred option {} for /{}: {:?}, required={}, {} choice(s)",
            public,
            spec.name,
            option_type,
            param.default.is_none(),
            choices.len()
        );

        options.push(OptionSpec {
            name: public.to_owned(),
            description,
            option_type,
            required: param.default.is_none(),
            choices,
        });
    }

    let descriptor = CommandDescriptor {
        name: spec.name.clone(),
        description,
        scope: spec.scope.clone(),
        options,
        name_remap,
    };
    Ok((descriptor, converters))
}
