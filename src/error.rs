// error.rs - Error types for declaration-time and invocation-time failures

use thiserror::Error;

/// Result shape shared by slash command handlers.
pub type CommandResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Declaration-time failure: a parameter's declared type cannot be mapped to
/// any Discord option type. Surfaced from `SlashCommandBuilder::build`, never
/// retried.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct InvalidParameter(pub String);

/// Invocation-time failure: coercion of a raw string argument failed for
/// every candidate branch of its declared type. Recoverable per-invocation;
/// dispatch may echo it to the user before propagating it.
#[derive(Debug, Error)]
pub enum BadSlashArgument {
    #[error("Argument {key} is not of any valid type")]
    NoValidBranch { key: String },

    #[error("Failed to convert argument {key}")]
    ConversionFailed {
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl BadSlashArgument {
    /// The option name the failure belongs to.
    pub fn key(&self) -> &str {
        match self {
            BadSlashArgument::NoValidBranch { key } => key,
            BadSlashArgument::ConversionFailed { key, .. } => key,
        }
    }
}
