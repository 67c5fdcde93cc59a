//! Typed REST client for the Ventura marketplace backend
//!
//! Wraps the admin, product, profile and auth endpoints behind async service
//! traits. The HTTP implementations share one [`HttpClient`], which attaches
//! the bearer token and transparently refreshes it once on a 401 response.
//! [`mock::MockBackend`] implements every trait in memory for tests.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod admin;
pub mod auth;
pub mod error;
pub mod http;
pub mod mock;
pub mod products;
pub mod profiles;
pub mod tokens;

pub use admin::{AdminService, CreateUserRequest, HttpAdminService, UpdateUserRequest, UserQuery};
pub use auth::{AuthService, HttpAuthService};
pub use error::{ClientError, ClientResult, extract_error_message};
pub use http::{HttpClient, SessionEvent};
pub use products::{HttpProductService, ProductService};
pub use profiles::{HttpProfileService, ProfileService};
pub use tokens::{FileTokenStore, MemoryTokenStore, TokenStore};

use std::sync::Arc;
use ventura_core::Config;

/// The full set of backend services used by the admin workflow
#[derive(Clone)]
pub struct Services {
    /// Moderation, users and stats
    pub admin: Arc<dyn AdminService>,
    /// Product catalogue
    pub products: Arc<dyn ProductService>,
    /// Investor and mentor profiles
    pub profiles: Arc<dyn ProfileService>,
    /// Login and logout
    pub auth: Arc<dyn AuthService>,
}

impl Services {
    /// Build REST-backed services sharing one HTTP client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn http(config: &Config, tokens: Arc<dyn TokenStore>) -> ClientResult<(Self, Arc<HttpClient>)> {
        let http = Arc::new(HttpClient::from_config(config, tokens)?);
        let services = Self {
            admin: Arc::new(HttpAdminService::new(Arc::clone(&http))),
            products: Arc::new(HttpProductService::new(Arc::clone(&http))),
            profiles: Arc::new(HttpProfileService::new(Arc::clone(&http))),
            auth: Arc::new(HttpAuthService::new(Arc::clone(&http))),
        };
        Ok((services, http))
    }

    /// Route every service to a single in-memory backend
    pub fn mock(backend: Arc<mock::MockBackend>) -> Self {
        Self {
            admin: backend.clone(),
            products: backend.clone(),
            profiles: backend.clone(),
            auth: backend,
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
