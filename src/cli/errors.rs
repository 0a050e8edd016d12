use thiserror::Error;

use crate::errors::RegistryError;

/// Domain-specific errors for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Output failed: {message}")]
    Output { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CliError {
    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal {
            message: format!("{err:#}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            // Piping into `head` closes stdout early.
            std::io::ErrorKind::BrokenPipe => Self::Output {
                message: "output closed".to_string(),
            },
            _ => Self::Output {
                message: err.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output {
            message: format!("JSON error: {}", err),
        }
    }
}
