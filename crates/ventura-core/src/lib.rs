//! Core types, configuration and logging for the Ventura admin client

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{CoreError, Result};
pub use types::{
    AdminStats, ApprovalItem, Paginated, PitchDeckSnapshot, ProductId, ProductSummary,
    ProfileDetails, ProfileId, ProfileSummary, ReviewId, ReviewStatus, Role, TokenPair, UserId,
    UserListItem,
};

use config::LoggingConfig;

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over the configured level. The format is
/// `json` for structured output and anything else for human-readable lines.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed or the
/// configured level is not a valid filter directive.
pub fn init_logging(logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level).map_err(|e| CoreError::Logging {
            message: format!("invalid log level '{}': {e}", logging.level),
        })?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if logging.format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| CoreError::Logging {
        message: e.to_string(),
    })
}
