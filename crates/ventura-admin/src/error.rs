//! Error types for the approval workflow

use thiserror::Error;
use ventura_client::ClientError;

/// Result type alias for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Errors raised by the queue, review pages and user directory
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// User input failed validation; nothing was sent
    #[error("{message}")]
    Validation {
        /// Offending field
        field: String,
        /// Message shown next to the field
        message: String,
    },

    /// An action on this item is already being submitted
    #[error("An action on {id} is already in progress")]
    ActionInFlight {
        /// Item identifier
        id: String,
    },

    /// The item is not (or no longer) listed
    #[error("{id} is not in the list")]
    UnknownItem {
        /// Item identifier
        id: String,
    },

    /// The page has not loaded a record to act on
    #[error("Page is not ready: {state}")]
    NotReady {
        /// Current page state
        state: String,
    },

    /// A destructive action was confirmed without being requested first
    #[error("Confirm {action} before continuing")]
    ConfirmationRequired {
        /// Action awaiting confirmation
        action: String,
    },

    /// A route could not be parsed
    #[error("Invalid route {route}: {reason}")]
    InvalidRoute {
        /// The offending route
        route: String,
        /// Why it was rejected
        reason: String,
    },

    /// Backend call failed
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl WorkflowError {
    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an in-flight error
    pub fn in_flight(id: impl Into<String>) -> Self {
        Self::ActionInFlight { id: id.into() }
    }

    /// Create an unknown item error
    pub fn unknown_item(id: impl Into<String>) -> Self {
        Self::UnknownItem { id: id.into() }
    }

    /// Create a not-ready error
    pub fn not_ready(state: impl Into<String>) -> Self {
        Self::NotReady {
            state: state.into(),
        }
    }

    /// Create an invalid route error
    pub fn invalid_route(route: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRoute {
            route: route.into(),
            reason: reason.into(),
        }
    }

    /// Whether the failure came from the backend rather than local checks
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Client(_))
    }

    /// Whether the user has to log in again
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::Client(err) if err.is_auth_failure())
    }

    /// Message suitable for a notice
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for WorkflowError {
    fn from(errors: validator::ValidationErrors) -> Self {
        match ventura_core::CoreError::from(errors) {
            ventura_core::CoreError::Validation { field, message } => {
                Self::Validation { field, message }
            }
            other => Self::validation("input", other.to_string()),
        }
    }
}
