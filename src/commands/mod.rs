// commands/mod.rs - Sample Command Registry
// Declares the sample bot's slash commands and assembles them into a
// slashkit registry. Each module exercises a different part of the
// inference layer.

pub mod echo;    // Plain string option with doc-derived description
pub mod ping;    // No options
pub mod profile; // Converter-backed option with keyword-underscore name
pub mod rank;    // Literal-choice option with a default

use slashkit::{GuildScope, InvalidParameter, SlashRegistry};

/// Build the full sample registry. Declaration-time errors surface here,
/// before the bot connects.
pub fn build_registry(scope: GuildScope) -> Result<SlashRegistry, InvalidParameter> {
    let mut registry = SlashRegistry::new();
    registry.register(ping::command(scope.clone())?);
    registry.register(echo::command(scope.clone())?);
    registry.register(rank::command(scope.clone())?);
    registry.register(profile::command(scope)?);
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_registry_builds_cleanly() {
        let registry = build_registry(GuildScope::Global).expect("all commands valid");
        assert_eq!(registry.len(), 4);
        for name in ["ping", "echo", "rank", "profile"] {
            assert!(registry.descriptor(name).is_some(), "missing /{}", name);
        }
    }
}
