//! Error types shared by the Ventura crates

use thiserror::Error;

/// Result type alias using [`CoreError`]
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while loading configuration or validating core values
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration could not be loaded or deserialized
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// A value failed validation
    #[error("Validation error: {field} - {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// Logging could not be initialized
    #[error("Logging error: {message}")]
    Logging {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let (field, message) = first_field_error(&errors)
            .unwrap_or_else(|| ("unknown".to_string(), errors.to_string()));
        Self::Validation { field, message }
    }
}

/// Walk nested validation errors down to the first failing leaf field
fn first_field_error(errors: &validator::ValidationErrors) -> Option<(String, String)> {
    use validator::ValidationErrorsKind;

    errors.errors().iter().find_map(|(field, kind)| match kind {
        ValidationErrorsKind::Field(errs) => {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref().map(ToString::to_string))
                .unwrap_or_else(|| "invalid value".to_string());
            Some((field.to_string(), message))
        }
        ValidationErrorsKind::Struct(inner) => first_field_error(inner),
        ValidationErrorsKind::List(items) => items.values().find_map(|inner| first_field_error(inner)),
    })
}
