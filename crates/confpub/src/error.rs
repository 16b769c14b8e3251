//! CLI error types.

use confpub_config::ConfigError;
use confpub_confluence::PublishError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("{0}")]
    Validation(String),
}
