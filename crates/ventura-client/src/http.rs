//! HTTP client for the marketplace REST API
//!
//! Attaches the stored bearer token to every authenticated request and
//! recovers from an expired access token with a single refresh-and-replay
//! cycle. Refreshes are single-flight: concurrent requests that hit 401 at
//! the same time wait for one refresh instead of each exchanging the refresh
//! token on their own.

use crate::error::{ClientError, ClientResult};
use crate::tokens::TokenStore;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, broadcast};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;
use ventura_core::{Config, TokenPair};

/// Path of the token refresh endpoint, relative to the API base
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Session lifecycle notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new access token was obtained
    TokensRefreshed,
    /// Credentials were cleared; the user must log in again
    LoginRequired {
        /// Route to send the user to
        redirect_to: String,
    },
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// A request that can be sent, and replayed after a refresh
#[derive(Debug, Clone)]
struct RequestPlan {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    authenticated: bool,
}

impl RequestPlan {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            authenticated: true,
        }
    }
}

/// HTTP client with bearer authentication and token refresh
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    refresh_lock: Mutex<()>,
    events: broadcast::Sender<SessionEvent>,
    login_route: String,
}

impl HttpClient {
    /// Create a client for `base_url` (including the `/api` prefix)
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self::with_client(client, base_url, tokens))
    }

    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn from_config(config: &Config, tokens: Arc<dyn TokenStore>) -> ClientResult<Self> {
        reqwest::Url::parse(config.api_base())
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", config.api_base())))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.api.request_timeout))
            .connect_timeout(Duration::from_secs(config.api.connect_timeout))
            .user_agent(concat!("ventura-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, config.api_base(), tokens)
            .with_login_route(config.auth.login_route.clone()))
    }

    /// Create a client around an existing `reqwest::Client`
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            refresh_lock: Mutex::new(()),
            events,
            login_route: "/login".to_string(),
        }
    }

    /// Set the route announced in [`SessionEvent::LoginRequired`]
    #[must_use]
    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    /// API base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Token store used by this client
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Subscribe to session lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Whether credentials are currently stored
    ///
    /// # Errors
    ///
    /// Returns an error if the token store cannot be read.
    pub fn is_authenticated(&self) -> ClientResult<bool> {
        Ok(self.tokens.load()?.is_some())
    }

    /// GET a JSON resource
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.execute(RequestPlan::new(Method::GET, path)).await?;
        Ok(response.json().await?)
    }

    /// GET a JSON resource with query parameters
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let mut plan = RequestPlan::new(Method::GET, path);
        plan.query = query
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect();
        let response = self.execute(plan).await?;
        Ok(response.json().await?)
    }

    /// POST a JSON body and decode the JSON response
    pub async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let mut plan = RequestPlan::new(Method::POST, path);
        plan.body = Some(serde_json::to_value(body)?);
        let response = self.execute(plan).await?;
        Ok(response.json().await?)
    }

    /// POST a JSON body, ignoring the response payload
    pub async fn post_discard<B: Serialize + Sync>(&self, path: &str, body: &B) -> ClientResult<()> {
        let mut plan = RequestPlan::new(Method::POST, path);
        plan.body = Some(serde_json::to_value(body)?);
        self.execute(plan).await?;
        Ok(())
    }

    /// POST without a body, ignoring the response payload
    pub async fn post_empty(&self, path: &str) -> ClientResult<()> {
        self.execute(RequestPlan::new(Method::POST, path)).await?;
        Ok(())
    }

    /// POST to an endpoint that does not require a bearer token
    pub async fn post_unauthenticated<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let mut plan = RequestPlan::new(Method::POST, path);
        plan.body = Some(serde_json::to_value(body)?);
        plan.authenticated = false;
        let response = self.execute(plan).await?;
        Ok(response.json().await?)
    }

    /// PATCH a JSON body and decode the JSON response
    pub async fn patch<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let mut plan = RequestPlan::new(Method::PATCH, path);
        plan.body = Some(serde_json::to_value(body)?);
        let response = self.execute(plan).await?;
        Ok(response.json().await?)
    }

    /// DELETE a resource
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.execute(RequestPlan::new(Method::DELETE, path)).await?;
        Ok(())
    }

    /// Send a request, refreshing the access token once on 401
    async fn execute(&self, plan: RequestPlan) -> ClientResult<Response> {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "http_request",
            method = %plan.method,
            path = %plan.path,
            request_id = %request_id
        );

        async move {
            let sent_with = if plan.authenticated {
                self.tokens.access_token()?
            } else {
                None
            };

            let response = self.dispatch(&plan, sent_with.as_deref(), request_id).await?;
            if response.status() != StatusCode::UNAUTHORIZED || !plan.authenticated {
                return Self::check(response).await;
            }

            debug!("Access token rejected, attempting refresh");
            let access = match self.refresh_access(sent_with.as_deref()).await {
                Ok(access) => access,
                Err(err) => {
                    warn!(error = %err, "Token refresh failed, ending session");
                    self.end_session()?;
                    return Err(ClientError::SessionExpired);
                }
            };

            let replayed = self.dispatch(&plan, Some(&access), request_id).await?;
            if replayed.status() == StatusCode::UNAUTHORIZED {
                warn!("Request still unauthorized after refresh, ending session");
                self.end_session()?;
                return Err(ClientError::SessionExpired);
            }

            Self::check(replayed).await
        }
        .instrument(span)
        .await
    }

    async fn dispatch(
        &self,
        plan: &RequestPlan,
        access: Option<&str>,
        request_id: Uuid,
    ) -> ClientResult<Response> {
        let url = format!("{}{}", self.base_url, plan.path);
        let mut request = self
            .client
            .request(plan.method.clone(), &url)
            .header(REQUEST_ID_HEADER, request_id.to_string());

        if !plan.query.is_empty() {
            request = request.query(&plan.query);
        }
        if let Some(body) = &plan.body {
            request = request.json(body);
        }
        if let Some(token) = access {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        debug!(status = response.status().as_u16(), "Response received");
        Ok(response)
    }

    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::http(status, &body))
    }

    /// Obtain a fresh access token
    ///
    /// `stale` is the token the failed request was sent with. If the stored
    /// token differs once the refresh lock is held, another request already
    /// refreshed and its token is reused.
    async fn refresh_access(&self, stale: Option<&str>) -> ClientResult<String> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(current) = self.tokens.access_token()?
            && Some(current.as_str()) != stale
        {
            debug!("Token refreshed by a concurrent request, reusing it");
            return Ok(current);
        }

        let refresh = self
            .tokens
            .refresh_token()?
            .ok_or(ClientError::SessionExpired)?;

        let url = format!("{}{}", self.base_url, REFRESH_PATH);
        let response = self
            .client
            .post(&url)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
            .json(&RefreshRequest { refresh: &refresh })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::RefreshRejected {
                status: response.status().as_u16(),
            });
        }

        let body: RefreshResponse = response.json().await?;
        let tokens = TokenPair {
            access: body.access,
            refresh: body.refresh.unwrap_or(refresh),
        };
        self.tokens.store(&tokens)?;
        info!("Access token refreshed");
        let _ = self.events.send(SessionEvent::TokensRefreshed);

        Ok(tokens.access)
    }

    /// Clear credentials and announce that a login is required
    fn end_session(&self) -> ClientResult<()> {
        self.tokens.clear()?;
        let _ = self.events.send(SessionEvent::LoginRequired {
            redirect_to: self.login_route.clone(),
        });
        Ok(())
    }

    /// Log out locally by discarding stored credentials
    ///
    /// # Errors
    ///
    /// Returns an error if the token store cannot be cleared.
    pub fn clear_session(&self) -> ClientResult<()> {
        self.tokens.clear()
    }
}

/// Encode a single path segment, e.g. an identifier
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
