// registry.rs - Command builder, registry, registration and dispatch
//
// The builder replaces decorator stacking: it collects a handler plus its
// declared parameters, runs inference once at build time, and hands the
// result to a registry that owns registration with Discord and per-
// interaction dispatch.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serenity::builder::CreateApplicationCommand;
use serenity::client::Context;
use serenity::http::Http;
use serenity::model::application::command::Command;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;

use crate::context::SlashContext;
use crate::convert::{coerce_value, ConverterTable};
use crate::error::{BadSlashArgument, CommandResult, InvalidParameter};
use crate::infer::{infer, HandlerSpec, ParamDecl};
use crate::model::{ChoiceValue, CommandDescriptor, GuildScope, ParamType, SlashValue};

type HandlerFn = Box<dyn Fn(SlashContext, SlashArgs) -> BoxFuture<'static, CommandResult> + Send + Sync>;

/// Delivered arguments, keyed by internal parameter name, after remapping,
/// coercion and default filling.
#[derive(Clone, Debug, Default)]
pub struct SlashArgs {
    values: HashMap<String, SlashValue>,
}

impl SlashArgs {
    pub fn insert(&mut self, name: String, value: SlashValue) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&SlashValue> {
        self.values.get(name)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(SlashValue::as_str)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(SlashValue::as_i64)
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(SlashValue::as_bool)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(SlashValue::as_f64)
    }

    pub fn id(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(SlashValue::as_id)
    }

    /// Recover a converter-produced value by type.
    pub fn rich<T: std::any::Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.get(name).and_then(SlashValue::downcast)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Builder for one slash command; the explicit replacement for
/// decorator-wrapping registration.
pub struct SlashCommandBuilder {
    spec: HandlerSpec,
    handler: HandlerFn,
    notify_on_bad_argument: bool,
}

impl SlashCommandBuilder {
    pub fn new<F, Fut>(name: &str, handler: F) -> Self
    where
        F: Fn(SlashContext, SlashArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CommandResult> + Send + 'static,
    {
        SlashCommandBuilder {
            spec: HandlerSpec {
                name: name.to_owned(),
                description: None,
                doc: None,
                scope: GuildScope::Global,
                strip_keyword_underscores: true,
                params: Vec::new(),
            },
            handler: Box::new(move |cx, args| -> BoxFuture<'static, CommandResult> {
                Box::pin(handler(cx, args))
            }),
            notify_on_bad_argument: false,
        }
    }

    /// Explicit description; overrides the doc summary.
    pub fn description(mut self, description: &str) -> Self {
        self.spec.description = Some(description.to_owned());
        self
    }

    /// Doc text for the command; the first paragraph becomes the command
    /// description and a `Parameters` section supplies option descriptions.
    pub fn doc(mut self, doc: &str) -> Self {
        self.spec.doc = Some(doc.to_owned());
        self
    }

    pub fn scope(mut self, scope: GuildScope) -> Self {
        self.spec.scope = scope;
        self
    }

    /// Whether trailing-underscore keyword parameter names (`type_`) expose
    /// an underscore-free public option name. On by default.
    pub fn strip_keyword_underscores(mut self, strip: bool) -> Self {
        self.spec.strip_keyword_underscores = strip;
        self
    }

    /// Echo coercion failures to the invoking user as an ephemeral reply
    /// before propagating them.
    pub fn notify_on_bad_argument(mut self, notify: bool) -> Self {
        self.notify_on_bad_argument = notify;
        self
    }

    /// Declare a required parameter.
    pub fn param(mut self, name: &str, ty: ParamType) -> Self {
        self.spec.params.push(ParamDecl {
            name: name.to_owned(),
            ty,
            default: None,
        });
        self
    }

    /// Declare an optional parameter filled with `default` when omitted.
    pub fn param_with_default(mut self, name: &str, ty: ParamType, default: SlashValue) -> Self {
        self.spec.params.push(ParamDecl {
            name: name.to_owned(),
            ty,
            default: Some(default),
        });
        self
    }

    /// Run inference and produce the registrable command. Declaration-time
    /// failures surface here.
    pub fn build(self) -> Result<RegisteredCommand, InvalidParameter> {
        let (descriptor, converters) = infer(&self.spec)?;
        let defaults = self
            .spec
            .params
            .iter()
            .filter_map(|param| {
                param
                    .default
                    .clone()
                    .map(|default| (param.name.clone(), default))
            })
            .collect();
        Ok(RegisteredCommand {
            descriptor,
            converters,
            defaults,
            handler: self.handler,
            notify_on_bad_argument: self.notify_on_bad_argument,
        })
    }
}

/// A fully inferred command: descriptor, converter table and handler.
pub struct RegisteredCommand {
    pub descriptor: CommandDescriptor,
    converters: ConverterTable,
    /// Internal parameter name to declared default.
    defaults: HashMap<String, SlashValue>,
    handler: HandlerFn,
    notify_on_bad_argument: bool,
}

impl RegisteredCommand {
    /// Collect the delivered options into handler arguments: remap public
    /// names to internal ones, coerce raw strings listed in the converter
    /// table, and fill declared defaults for anything omitted.
    async fn collect_args(&self, cx: &SlashContext) -> Result<SlashArgs, BadSlashArgument> {
        let mut args = SlashArgs::default();
        for option in &cx.interaction.data.options {
            let public = option.name.as_str();
            let Some(value) = option.value.as_ref() else {
                continue;
            };
            let internal = self
                .descriptor
                .name_remap
                .get(public)
                .map(String::as_str)
                .unwrap_or(public);
            let coerced = match self.converters.get(public) {
                Some(ty) => coerce_value(cx, public, value, ty).await?,
                None => SlashValue::from_json(value),
            };
            args.insert(internal.to_owned(), coerced);
        }
        for (name, default) in &self.defaults {
            if args.get(name).is_none() {
                args.insert(name.clone(), default.clone());
            }
        }
        Ok(args)
    }
}

/// Owns every registered command; pushes descriptors to Discord and routes
/// incoming interactions to their handlers.
#[derive(Default)]
pub struct SlashRegistry {
    commands: HashMap<String, RegisteredCommand>,
}

impl SlashRegistry {
    pub fn new() -> Self {
        SlashRegistry::default()
    }

    pub fn register(&mut self, command: RegisteredCommand) {
        let name = command.descriptor.name.clone();
        if self.commands.insert(name.clone(), command).is_some() {
            log::warn!("replacing previously registered command /{}", name);
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn descriptor(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(name).map(|command| &command.descriptor)
    }

    /// Register every command with Discord. Transport, retries and rate
    /// limiting are serenity's concern.
    pub async fn sync(&self, http: &Http) -> CommandResult {
        for command in self.commands.values() {
            let descriptor = &command.descriptor;
            log::debug!(
                "registering /{}: {}",
                descriptor.name,
                serde_json::to_string(descriptor).unwrap_or_default()
            );
            match &descriptor.scope {
                GuildScope::Global => {
                    Command::create_global_application_command(http, |command| {
                        apply_descriptor(command, descriptor)
                    })
                    .await?;
                }
                GuildScope::Guilds(guilds) => {
                    for guild in guilds {
                        guild
                            .create_application_command(http, |command| {
                                apply_descriptor(command, descriptor)
                            })
                            .await?;
                    }
                }
            }
        }
        log::info!("registered {} slash commands", self.commands.len());
        Ok(())
    }

    /// Route one interaction to its handler.
    ///
    /// Coercion failures are optionally echoed to the user, then propagated;
    /// they are never swallowed.
    pub async fn dispatch(
        &self,
        ctx: &Context,
        interaction: &ApplicationCommandInteraction,
    ) -> CommandResult {
        let name = interaction.data.name.clone();
        let cx = SlashContext::new(ctx.clone(), interaction.clone());
        let Some(command) = self.commands.get(&name) else {
            cx.send(&format!("Unknown slash command: {}", name)).await?;
            return Ok(());
        };

        let args = match command.collect_args(&cx).await {
            Ok(args) => args,
            Err(bad) => {
                if command.notify_on_bad_argument {
                    if let Err(e) = cx.send_ephemeral(&bad.to_string()).await {
                        log::error!("failed to report bad argument for /{}: {}", name, e);
                    }
                }
                return Err(bad.into());
            }
        };

        (command.handler)(cx, args).await
    }
}

/// Copy a descriptor into serenity's registration builder.
fn apply_descriptor<'a>(
    command: &'a mut CreateApplicationCommand,
    descriptor: &CommandDescriptor,
) -> &'a mut CreateApplicationCommand {
    command.name(&descriptor.name).description(&descriptor.description);
    for spec in &descriptor.options {
        command.create_option(|option| {
            option
                .name(&spec.name)
                .description(&spec.description)
                .kind(spec.option_type)
                .required(spec.required);
            for choice in &spec.choices {
                match &choice.value {
                    ChoiceValue::Str(value) => {
                        option.add_string_choice(&choice.name, value);
                    }
                    ChoiceValue::Int(value) => {
                        option.add_int_choice(&choice.name, *value as i32);
                    }
                    ChoiceValue::Number(value) => {
                        option.add_number_choice(&choice.name, *value);
                    }
                }
            }
            option
        });
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PrimitiveKind;
    use serde_json::json;

    async fn noop(_cx: SlashContext, _args: SlashArgs) -> CommandResult {
        Ok(())
    }

    fn rank_command() -> RegisteredCommand {
        SlashCommandBuilder::new("rank", noop)
            .description("Rank and analyze web content")
            .param("url", ParamType::Primitive(PrimitiveKind::Str))
            .param_with_default(
                "analysis_type",
                ParamType::union(vec![
                    ParamType::literal(ChoiceValue::Str("comprehensive".to_owned())),
                    ParamType::literal(ChoiceValue::Str("usability".to_owned())),
                ]),
                SlashValue::Str("comprehensive".to_owned()),
            )
            .build()
            .expect("valid command")
    }

    #[test]
    fn build_runs_inference_and_collects_defaults() {
        let command = rank_command();
        assert_eq!(command.descriptor.name, "rank");
        assert_eq!(command.descriptor.options.len(), 2);
        assert_eq!(command.descriptor.options[1].choices.len(), 2);
        assert_eq!(
            command.defaults["analysis_type"],
            SlashValue::Str("comprehensive".to_owned())
        );
        assert!(command.converters.is_empty());
    }

    #[test]
    fn invalid_declarations_fail_at_build_time() {
        let result = SlashCommandBuilder::new("bad", noop)
            .param("choices", ParamType::union(Vec::new()))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn registry_replaces_commands_by_name() {
        let mut registry = SlashRegistry::new();
        registry.register(rank_command());
        registry.register(rank_command());
        assert_eq!(registry.len(), 1);
        assert!(registry.descriptor("rank").is_some());
        assert!(registry.descriptor("missing").is_none());
    }

    #[test]
    fn descriptors_fill_serenity_builders() {
        let command = rank_command();
        let mut builder = CreateApplicationCommand::default();
        apply_descriptor(&mut builder, &command.descriptor);
        assert_eq!(builder.0.get("name"), Some(&json!("rank")));
        assert_eq!(
            builder.0.get("description"),
            Some(&json!("Rank and analyze web content"))
        );
        let options = builder
            .0
            .get("options")
            .and_then(|options| options.as_array())
            .expect("options array");
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn args_expose_typed_getters() {
        let mut args = SlashArgs::default();
        args.insert("count".to_owned(), SlashValue::Int(3));
        args.insert("who".to_owned(), SlashValue::Id(42));
        assert_eq!(args.integer("count"), Some(3));
        assert_eq!(args.number("count"), Some(3.0));
        assert_eq!(args.id("who"), Some(42));
        assert_eq!(args.string("count"), None);
        assert_eq!(args.len(), 2);
    }
}
