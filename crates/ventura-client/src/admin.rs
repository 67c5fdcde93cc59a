//! Admin REST endpoints: moderation reviews, user management and stats

use crate::error::{ClientError, ClientResult};
use crate::http::{HttpClient, segment};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;
use ventura_core::{AdminStats, ApprovalItem, Paginated, Role, UserListItem};

/// Admin operations used by the moderation workflow
///
/// Read endpoints degrade a 404 to an empty result, since the backend may not
/// have deployed them yet. Mutating endpoints surface a 404 as
/// [`ClientError::EndpointUnavailable`].
#[async_trait]
pub trait AdminService: Send + Sync {
    /// List reviews awaiting a decision, optionally for a single role
    ///
    /// Never fails: any error is logged and an empty list returned.
    async fn pending_approvals(&self, role: Option<Role>) -> Vec<ApprovalItem>;

    /// Fetch a single review
    async fn review_detail(&self, review_id: &str) -> ClientResult<ApprovalItem>;

    /// Approve a pending review
    async fn approve_profile(&self, review_id: &str) -> ClientResult<()>;

    /// Reject a pending review with a non-blank reason
    async fn reject_profile(&self, review_id: &str, reason: &str) -> ClientResult<()>;

    /// List users
    async fn users(&self, query: &UserQuery) -> ClientResult<Paginated<UserListItem>>;

    /// Fetch a single user
    async fn user(&self, user_id: &str) -> ClientResult<UserListItem>;

    /// Create a user account
    async fn create_user(&self, request: &CreateUserRequest) -> ClientResult<UserListItem>;

    /// Partially update a user account
    async fn update_user(
        &self,
        user_id: &str,
        request: &UpdateUserRequest,
    ) -> ClientResult<UserListItem>;

    /// Delete a user account
    async fn delete_user(&self, user_id: &str) -> ClientResult<()>;

    /// Fetch dashboard counters
    async fn stats(&self) -> ClientResult<AdminStats>;
}

/// Filters for the user listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserQuery {
    /// Restrict to one role
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Free-text search on name and email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Restrict to active or inactive accounts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// 1-based page number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl UserQuery {
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(role) = self.role {
            pairs.push(("role", role.as_str().to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            pairs.push(("search", search.to_string()));
        }
        if let Some(active) = self.is_active {
            pairs.push(("is_active", active.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }
}

/// Payload for creating a user
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateUserRequest {
    /// Login email
    #[validate(email)]
    pub email: String,
    /// Display name
    #[validate(length(min = 1, max = 150))]
    pub full_name: String,
    /// Account role
    pub role: Role,
    /// Initial password
    #[validate(length(min = 8))]
    pub password: String,
}

/// Partial update of a user; unset fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateUserRequest {
    /// New display name
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 150))]
    pub full_name: Option<String>,
    /// New email
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    /// Enable or disable login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    /// Update that only toggles the active flag
    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize)]
struct RejectBody<'a> {
    reason: &'a str,
}

/// The pending endpoint answers either a bare list or a paginated envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReviewList {
    Plain(Vec<ApprovalItem>),
    Paged(Paginated<ApprovalItem>),
}

impl ReviewList {
    fn into_items(self) -> Vec<ApprovalItem> {
        match self {
            Self::Plain(items) => items,
            Self::Paged(page) => page.results,
        }
    }
}

/// [`AdminService`] backed by the REST API
#[derive(Debug, Clone)]
pub struct HttpAdminService {
    http: Arc<HttpClient>,
}

impl HttpAdminService {
    /// Create a service on top of a shared HTTP client
    pub const fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    fn unavailable_on_404(err: ClientError, endpoint: &str) -> ClientError {
        if err.is_not_found() {
            ClientError::endpoint_unavailable(endpoint)
        } else {
            err
        }
    }
}

#[async_trait]
impl AdminService for HttpAdminService {
    #[instrument(skip(self))]
    async fn pending_approvals(&self, role: Option<Role>) -> Vec<ApprovalItem> {
        let query: Vec<(&str, String)> = role
            .map(|role| vec![("type", role.as_str().to_string())])
            .unwrap_or_default();

        match self
            .http
            .get_with_query::<ReviewList>("/reviews/pending", &query)
            .await
        {
            Ok(list) => {
                let items = list.into_items();
                debug!(count = items.len(), "Loaded pending approvals");
                items
            }
            Err(err) if err.is_not_found() => {
                debug!("Pending reviews endpoint not available");
                Vec::new()
            }
            Err(err) => {
                warn!(error = %err, "Failed to load pending approvals");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self))]
    async fn review_detail(&self, review_id: &str) -> ClientResult<ApprovalItem> {
        let path = format!("/reviews/{}", segment(review_id));
        self.http.get(&path).await.map_err(|err| {
            if err.is_not_found() {
                ClientError::not_found(format!("Review {review_id}"))
            } else {
                err
            }
        })
    }

    #[instrument(skip(self))]
    async fn approve_profile(&self, review_id: &str) -> ClientResult<()> {
        let path = format!("/reviews/{}/approve", segment(review_id));
        self.http
            .post_empty(&path)
            .await
            .map_err(|err| Self::unavailable_on_404(err, "Approval"))?;
        info!(review_id, "Review approved");
        Ok(())
    }

    #[instrument(skip(self, reason))]
    async fn reject_profile(&self, review_id: &str, reason: &str) -> ClientResult<()> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ClientError::validation(
                "reason",
                "Please provide a reason for rejection",
            ));
        }

        let path = format!("/reviews/{}/reject", segment(review_id));
        self.http
            .post_discard(&path, &RejectBody { reason })
            .await
            .map_err(|err| Self::unavailable_on_404(err, "Rejection"))?;
        info!(review_id, "Review rejected");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn users(&self, query: &UserQuery) -> ClientResult<Paginated<UserListItem>> {
        match self
            .http
            .get_with_query("/admin/users", &query.to_pairs())
            .await
        {
            Err(err) if err.is_not_found() => {
                debug!("User listing endpoint not available");
                Ok(Paginated::default())
            }
            other => other,
        }
    }

    async fn user(&self, user_id: &str) -> ClientResult<UserListItem> {
        self.http
            .get(&format!("/admin/users/{}", segment(user_id)))
            .await
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn create_user(&self, request: &CreateUserRequest) -> ClientResult<UserListItem> {
        request.validate()?;
        let user: UserListItem = self.http.post("/admin/users", request).await?;
        info!(user_id = %user.id, "User created");
        Ok(user)
    }

    #[instrument(skip(self, request))]
    async fn update_user(
        &self,
        user_id: &str,
        request: &UpdateUserRequest,
    ) -> ClientResult<UserListItem> {
        request.validate()?;
        self.http
            .patch(&format!("/admin/users/{}", segment(user_id)), request)
            .await
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: &str) -> ClientResult<()> {
        self.http
            .delete(&format!("/admin/users/{}", segment(user_id)))
            .await?;
        info!(user_id, "User deleted");
        Ok(())
    }

    async fn stats(&self) -> ClientResult<AdminStats> {
        self.http.get("/admin/stats").await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_user_query_pairs_skip_blank_search() {
        let query = UserQuery {
            role: Some(Role::Mentor),
            search: Some("   ".to_string()),
            is_active: Some(false),
            page: Some(2),
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("role", "MENTOR".to_string()),
                ("is_active", "false".to_string()),
                ("page", "2".to_string()),
            ]
        );
        assert!(UserQuery::default().to_pairs().is_empty());
    }

    #[test]
    fn test_create_user_request_validation() {
        let mut request = CreateUserRequest {
            email: "not-an-email".to_string(),
            full_name: "Grace".to_string(),
            role: Role::Mentor,
            password: "correct horse".to_string(),
        };
        let err = ClientError::from(request.validate().unwrap_err());
        assert!(matches!(err, ClientError::Validation { ref field, .. } if field == "email"));

        request.email = "grace@example.com".to_string();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_user_active_only_serializes_flag() {
        let body = serde_json::to_value(UpdateUserRequest::active(true)).unwrap();
        assert_eq!(body, serde_json::json!({"is_active": true}));
    }

    #[test]
    fn test_review_list_accepts_both_shapes() {
        let item = serde_json::json!({
            "id": "R1", "user_id": "U1", "role": "MENTOR",
            "submitted_at": "2024-03-15T14:25:30Z"
        });
        let plain: ReviewList = serde_json::from_value(serde_json::json!([item.clone()])).unwrap();
        assert_eq!(plain.into_items().len(), 1);

        let paged: ReviewList = serde_json::from_value(serde_json::json!({
            "count": 1, "next": null, "previous": null, "results": [item]
        }))
        .unwrap();
        assert_eq!(paged.into_items()[0].id, "R1");
    }
}
