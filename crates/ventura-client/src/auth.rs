//! Login and logout

use crate::error::{ClientError, ClientResult};
use crate::http::HttpClient;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use ventura_core::TokenPair;

/// Session management
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchange credentials for a token pair and store it
    async fn login(&self, email: &str, password: &str) -> ClientResult<()>;

    /// Discard stored credentials
    async fn logout(&self) -> ClientResult<()>;
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// [`AuthService`] backed by the REST API
#[derive(Debug, Clone)]
pub struct HttpAuthService {
    http: Arc<HttpClient>,
}

impl HttpAuthService {
    /// Create a service on top of a shared HTTP client
    pub const fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> ClientResult<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ClientError::validation("email", "Email is required"));
        }
        if password.is_empty() {
            return Err(ClientError::validation("password", "Password is required"));
        }

        let tokens: TokenPair = self
            .http
            .post_unauthenticated("/auth/login", &LoginRequest { email, password })
            .await?;
        self.http.tokens().store(&tokens)?;
        info!("Logged in");
        Ok(())
    }

    async fn logout(&self) -> ClientResult<()> {
        self.http.clear_session()?;
        info!("Logged out");
        Ok(())
    }
}
