// lib.rs - slashkit: signature-driven slash command registration for serenity
//
// Declare a handler's parameters once through `SlashCommandBuilder`; the
// option inferencer turns that declaration (plus doc text) into the
// registration descriptor Discord needs, and the registry handles
// registration and per-interaction dispatch, including post-receipt
// coercion of converter-backed options.
//
// Key Features:
// - Option types, choices and requiredness inferred from parameter declarations
// - Doc text supplies command and option descriptions
// - Converter capability for resolving raw strings into richer types
// - Keyword-collision parameter names (`type_`) exposed without the underscore

pub mod context;
pub mod convert;
pub mod docstring;
pub mod error;
pub mod infer;
pub mod model;
pub mod registry;

pub use context::SlashContext;
pub use convert::{coerce_value, handle_arg, parse_mention_id, Convert, ConverterContext, ConverterTable};
pub use error::{BadSlashArgument, CommandResult, InvalidParameter};
pub use infer::{infer, is_keyword, option_type_for, root_type, validate_literal_union, HandlerSpec, ParamDecl};
pub use model::{
    Choice, ChoiceValue, CommandDescriptor, GuildScope, OptionSpec, ParamType, PrimitiveKind,
    RootType, SlashValue,
};
pub use registry::{RegisteredCommand, SlashArgs, SlashCommandBuilder, SlashRegistry};
