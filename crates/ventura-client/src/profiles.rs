//! Role profile endpoints used to side-load full profiles on review pages

use crate::error::{ClientError, ClientResult};
use crate::http::{HttpClient, segment};
use async_trait::async_trait;
use std::sync::Arc;
use ventura_core::{ProfileDetails, Role};

/// Read access to investor and mentor profiles
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Fetch an investor profile
    async fn investor(&self, profile_id: &str) -> ClientResult<ProfileDetails>;

    /// Fetch a mentor profile
    async fn mentor(&self, profile_id: &str) -> ClientResult<ProfileDetails>;

    /// Fetch the profile for `role`
    ///
    /// Only investors and mentors have a profile endpoint; any other role
    /// yields [`ClientError::NotFound`].
    async fn profile(&self, role: Role, profile_id: &str) -> ClientResult<ProfileDetails> {
        match role {
            Role::Investor => self.investor(profile_id).await,
            Role::Mentor => self.mentor(profile_id).await,
            other => Err(ClientError::not_found(format!(
                "{} profile {profile_id}",
                other.as_str().to_ascii_lowercase()
            ))),
        }
    }
}

/// [`ProfileService`] backed by the REST API
#[derive(Debug, Clone)]
pub struct HttpProfileService {
    http: Arc<HttpClient>,
}

impl HttpProfileService {
    /// Create a service on top of a shared HTTP client
    pub const fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ProfileService for HttpProfileService {
    async fn investor(&self, profile_id: &str) -> ClientResult<ProfileDetails> {
        self.http
            .get(&format!("/investors/{}", segment(profile_id)))
            .await
    }

    async fn mentor(&self, profile_id: &str) -> ClientResult<ProfileDetails> {
        self.http
            .get(&format!("/mentors/{}", segment(profile_id)))
            .await
    }
}
