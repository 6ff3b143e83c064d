//! CLI error type and exit codes.

use thiserror::Error;

use inventra_core::CoreError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Config(#[from] inventra_config::ConfigError),

    #[error("not signed in -- run `inventra login` first")]
    NotSignedIn,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Conventional-ish exit codes so scripts can branch on failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Core(CoreError::Auth { .. }) | Self::NotSignedIn => 4,
            Self::Core(CoreError::PermissionDenied { .. } | CoreError::Forbidden) => 5,
            Self::Core(CoreError::NotFound { .. }) => 3,
            Self::Core(CoreError::Validation { .. }) => 2,
            _ => 1,
        }
    }
}
