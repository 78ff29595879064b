use config::ConfigError;
use ociclient::RegistryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("{count} image(s) not removed")]
    NotRemoved { count: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Whether the registry rejected our credentials (HTTP 401/403).
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, CliError::Registry(e) if e.is_auth_failure())
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Whether any cause in `err` is the registry rejecting our credentials.
pub fn is_auth_failure(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<CliError>()
            .is_some_and(CliError::is_auth_failure)
            || cause
                .downcast_ref::<RegistryError>()
                .is_some_and(RegistryError::is_auth_failure)
    })
}
