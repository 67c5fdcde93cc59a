//! In-memory marketplace backend for testing
//!
//! [`MockBackend`] implements every service trait against shared in-memory
//! state, records each call that would have reached the network and can be
//! told to fail specific calls with a given status.

use crate::admin::{AdminService, CreateUserRequest, UpdateUserRequest, UserQuery};
use crate::auth::AuthService;
use crate::error::{ClientError, ClientResult};
use crate::products::ProductService;
use crate::profiles::ProfileService;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;
use ventura_core::{
    AdminStats, ApprovalItem, Paginated, ProductSummary, ProfileDetails, ReviewStatus, Role,
    UserListItem,
};

/// Backend calls recorded by [`MockBackend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockCall {
    /// `GET /reviews/pending`
    PendingApprovals,
    /// `GET /reviews/{id}`
    ReviewDetail,
    /// `POST /reviews/{id}/approve`
    Approve,
    /// `POST /reviews/{id}/reject`
    Reject,
    /// `GET /admin/users`
    Users,
    /// `GET /admin/users/{id}`
    User,
    /// `POST /admin/users`
    CreateUser,
    /// `PATCH /admin/users/{id}`
    UpdateUser,
    /// `DELETE /admin/users/{id}`
    DeleteUser,
    /// `GET /admin/stats`
    Stats,
    /// `GET /admin/products`
    Products,
    /// `DELETE /admin/products/{id}`
    DeleteProduct,
    /// `GET /investors/{id}` or `GET /mentors/{id}`
    Profile,
    /// `POST /auth/login`
    Login,
    /// Local logout
    Logout,
}

#[derive(Debug, Default)]
struct MockState {
    reviews: Vec<ApprovalItem>,
    users: Vec<UserListItem>,
    products: Vec<ProductSummary>,
    profiles: HashMap<String, ProfileDetails>,
    stats: AdminStats,
    credentials: Option<(String, String)>,
    logged_in: bool,
}

/// In-memory backend implementing all service traits
#[derive(Debug, Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
    calls: Mutex<Vec<MockCall>>,
    failures: Mutex<HashMap<MockCall, (u16, String)>>,
    delay: Option<Duration>,
}

impl MockBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed reviews; `pending_approvals` in the stats follows the pending count
    #[must_use]
    pub fn with_reviews(self, reviews: Vec<ApprovalItem>) -> Self {
        {
            let mut state = self.state.lock();
            state.stats.pending_approvals = reviews
                .iter()
                .filter(|review| review.status == ReviewStatus::Pending)
                .count() as u64;
            state.reviews = reviews;
        }
        self
    }

    /// Seed users
    #[must_use]
    pub fn with_users(self, users: Vec<UserListItem>) -> Self {
        self.state.lock().users = users;
        self
    }

    /// Seed products
    #[must_use]
    pub fn with_products(self, products: Vec<ProductSummary>) -> Self {
        self.state.lock().products = products;
        self
    }

    /// Seed a role profile by id
    #[must_use]
    pub fn with_profile(self, profile_id: impl Into<String>, profile: ProfileDetails) -> Self {
        self.state.lock().profiles.insert(profile_id.into(), profile);
        self
    }

    /// Seed dashboard counters
    #[must_use]
    pub fn with_stats(self, stats: AdminStats) -> Self {
        self.state.lock().stats = stats;
        self
    }

    /// Accept a single email/password pair on login
    #[must_use]
    pub fn with_credentials(self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.state.lock().credentials = Some((email.into(), password.into()));
        self
    }

    /// Delay every call, to observe in-flight states
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make `call` fail with `status` until [`Self::clear_failure`]
    #[must_use]
    pub fn with_failure(self, call: MockCall, status: u16, message: impl Into<String>) -> Self {
        self.fail(call, status, message);
        self
    }

    /// Make `call` fail with `status` from now on
    pub fn fail(&self, call: MockCall, status: u16, message: impl Into<String>) {
        self.failures.lock().insert(call, (status, message.into()));
    }

    /// Let `call` succeed again
    pub fn clear_failure(&self, call: MockCall) {
        self.failures.lock().remove(&call);
    }

    /// Number of times `call` was made
    pub fn call_count(&self, call: MockCall) -> usize {
        self.calls.lock().iter().filter(|c| **c == call).count()
    }

    /// Total number of calls made
    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    /// Current status of a review
    pub fn review_status(&self, review_id: &str) -> Option<ReviewStatus> {
        self.state
            .lock()
            .reviews
            .iter()
            .find(|review| review.id == review_id)
            .map(|review| review.status)
    }

    /// Whether a product still exists
    pub fn has_product(&self, product_id: &str) -> bool {
        self.state
            .lock()
            .products
            .iter()
            .any(|product| product.id == product_id)
    }

    /// Whether a login succeeded and no logout followed
    pub fn is_logged_in(&self) -> bool {
        self.state.lock().logged_in
    }

    /// Record a call and return the injected failure, if any
    async fn record(&self, call: MockCall) -> ClientResult<()> {
        self.calls.lock().push(call);
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }
        let failure = self.failures.lock().get(&call).cloned();
        match failure {
            Some((status, message)) => Err(ClientError::Http { status, message }),
            None => Ok(()),
        }
    }

    fn unavailable_on_404(err: ClientError, endpoint: &str) -> ClientError {
        if err.is_not_found() {
            ClientError::endpoint_unavailable(endpoint)
        } else {
            err
        }
    }

    fn decide(&self, review_id: &str, status: ReviewStatus, reason: Option<&str>) -> ClientResult<()> {
        let mut state = self.state.lock();
        let review = state
            .reviews
            .iter_mut()
            .find(|review| review.id == review_id)
            .ok_or_else(|| ClientError::not_found(format!("Review {review_id}")))?;

        if review.status.is_terminal() {
            return Err(ClientError::Http {
                status: 400,
                message: "Review already processed".to_string(),
            });
        }
        review.status = status;
        review.reviewed_at = Some(Utc::now());
        review.rejection_reason = reason.map(str::to_string);

        state.stats.pending_approvals = state.stats.pending_approvals.saturating_sub(1);
        match status {
            ReviewStatus::Approved => state.stats.approved_profiles += 1,
            ReviewStatus::Rejected => state.stats.rejected_profiles += 1,
            ReviewStatus::Pending => {}
        }
        Ok(())
    }

    fn find_user(state: &MockState, user_id: &str) -> ClientResult<usize> {
        state
            .users
            .iter()
            .position(|user| user.id == user_id)
            .ok_or_else(|| ClientError::not_found(format!("User {user_id}")))
    }
}

#[async_trait]
impl AdminService for MockBackend {
    async fn pending_approvals(&self, role: Option<Role>) -> Vec<ApprovalItem> {
        if self.record(MockCall::PendingApprovals).await.is_err() {
            return Vec::new();
        }
        self.state
            .lock()
            .reviews
            .iter()
            .filter(|review| review.status == ReviewStatus::Pending)
            .filter(|review| role.is_none_or(|role| review.role == role))
            .cloned()
            .collect()
    }

    async fn review_detail(&self, review_id: &str) -> ClientResult<ApprovalItem> {
        self.record(MockCall::ReviewDetail).await.map_err(|err| {
            if err.is_not_found() {
                ClientError::not_found(format!("Review {review_id}"))
            } else {
                err
            }
        })?;
        self.state
            .lock()
            .reviews
            .iter()
            .find(|review| review.id == review_id)
            .cloned()
            .ok_or_else(|| ClientError::not_found(format!("Review {review_id}")))
    }

    async fn approve_profile(&self, review_id: &str) -> ClientResult<()> {
        self.record(MockCall::Approve)
            .await
            .map_err(|err| Self::unavailable_on_404(err, "Approval"))?;
        self.decide(review_id, ReviewStatus::Approved, None)
    }

    async fn reject_profile(&self, review_id: &str, reason: &str) -> ClientResult<()> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ClientError::validation(
                "reason",
                "Please provide a reason for rejection",
            ));
        }
        self.record(MockCall::Reject)
            .await
            .map_err(|err| Self::unavailable_on_404(err, "Rejection"))?;
        self.decide(review_id, ReviewStatus::Rejected, Some(reason))
    }

    async fn users(&self, query: &UserQuery) -> ClientResult<Paginated<UserListItem>> {
        match self.record(MockCall::Users).await {
            Err(err) if err.is_not_found() => return Ok(Paginated::default()),
            other => other?,
        }
        let needle = query
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_default();
        let results: Vec<UserListItem> = self
            .state
            .lock()
            .users
            .iter()
            .filter(|user| query.role.is_none_or(|role| user.role == role))
            .filter(|user| query.is_active.is_none_or(|active| user.is_active == active))
            .filter(|user| {
                needle.is_empty()
                    || user.email.to_lowercase().contains(&needle)
                    || user.full_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        Ok(Paginated {
            count: results.len() as u64,
            next: None,
            previous: None,
            results,
        })
    }

    async fn user(&self, user_id: &str) -> ClientResult<UserListItem> {
        self.record(MockCall::User).await?;
        let state = self.state.lock();
        let index = Self::find_user(&state, user_id)?;
        Ok(state.users[index].clone())
    }

    async fn create_user(&self, request: &CreateUserRequest) -> ClientResult<UserListItem> {
        validator::Validate::validate(request)?;
        self.record(MockCall::CreateUser).await?;
        let mut state = self.state.lock();
        if state.users.iter().any(|user| user.email == request.email) {
            return Err(ClientError::Http {
                status: 400,
                message: "email: user with this email already exists.".to_string(),
            });
        }
        let user = UserListItem {
            id: format!("U{}", state.users.len() + 1),
            email: request.email.clone(),
            full_name: request.full_name.clone(),
            role: request.role,
            is_active: true,
            is_email_verified: false,
            date_joined: Utc::now(),
            venture_profile: None,
            investor_profile: None,
            mentor_profile: None,
        };
        state.users.push(user.clone());
        state.stats.total_users += 1;
        Ok(user)
    }

    async fn update_user(
        &self,
        user_id: &str,
        request: &UpdateUserRequest,
    ) -> ClientResult<UserListItem> {
        validator::Validate::validate(request)?;
        self.record(MockCall::UpdateUser).await?;
        let mut state = self.state.lock();
        let index = Self::find_user(&state, user_id)?;
        let user = &mut state.users[index];
        if let Some(full_name) = &request.full_name {
            user.full_name.clone_from(full_name);
        }
        if let Some(email) = &request.email {
            user.email.clone_from(email);
        }
        if let Some(is_active) = request.is_active {
            user.is_active = is_active;
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, user_id: &str) -> ClientResult<()> {
        self.record(MockCall::DeleteUser).await?;
        let mut state = self.state.lock();
        let index = Self::find_user(&state, user_id)?;
        state.users.remove(index);
        state.stats.total_users = state.stats.total_users.saturating_sub(1);
        Ok(())
    }

    async fn stats(&self) -> ClientResult<AdminStats> {
        self.record(MockCall::Stats).await?;
        Ok(self.state.lock().stats)
    }
}

#[async_trait]
impl ProductService for MockBackend {
    async fn products(&self) -> ClientResult<Vec<ProductSummary>> {
        match self.record(MockCall::Products).await {
            Err(err) if err.is_not_found() => return Ok(Vec::new()),
            other => other?,
        }
        Ok(self.state.lock().products.clone())
    }

    async fn delete_product(&self, product_id: &str) -> ClientResult<()> {
        self.record(MockCall::DeleteProduct).await?;
        let mut state = self.state.lock();
        let before = state.products.len();
        state.products.retain(|product| product.id != product_id);
        if state.products.len() == before {
            return Err(ClientError::not_found(format!("Product {product_id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileService for MockBackend {
    async fn investor(&self, profile_id: &str) -> ClientResult<ProfileDetails> {
        self.record(MockCall::Profile).await?;
        self.state
            .lock()
            .profiles
            .get(profile_id)
            .cloned()
            .ok_or_else(|| ClientError::not_found(format!("investor profile {profile_id}")))
    }

    async fn mentor(&self, profile_id: &str) -> ClientResult<ProfileDetails> {
        self.record(MockCall::Profile).await?;
        self.state
            .lock()
            .profiles
            .get(profile_id)
            .cloned()
            .ok_or_else(|| ClientError::not_found(format!("mentor profile {profile_id}")))
    }
}

#[async_trait]
impl AuthService for MockBackend {
    async fn login(&self, email: &str, password: &str) -> ClientResult<()> {
        self.record(MockCall::Login).await?;
        let mut state = self.state.lock();
        let accepted = state
            .credentials
            .as_ref()
            .is_some_and(|(e, p)| e == email.trim() && p == password);
        if !accepted {
            return Err(ClientError::Http {
                status: 401,
                message: "No active account found with the given credentials".to_string(),
            });
        }
        state.logged_in = true;
        Ok(())
    }

    async fn logout(&self) -> ClientResult<()> {
        self.record(MockCall::Logout).await?;
        self.state.lock().logged_in = false;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn review(id: &str, role: Role) -> ApprovalItem {
        ApprovalItem {
            id: id.to_string(),
            user_id: format!("U-{id}"),
            product_id: None,
            profile_id: None,
            role,
            status: ReviewStatus::Pending,
            submitted_at: Utc.with_ymd_and_hms(2024, 3, 15, 14, 25, 30).unwrap(),
            reviewed_at: None,
            rejection_reason: None,
            user_name: None,
            user_email: None,
            pitch_deck: ventura_core::PitchDeckSnapshot::default(),
            profile_data: None,
        }
    }

    #[tokio::test]
    async fn test_mock_approve_updates_state_and_stats() {
        let backend = MockBackend::new()
            .with_reviews(vec![review("R1", Role::Investor), review("R2", Role::Mentor)]);

        backend.approve_profile("R1").await.unwrap();

        assert_eq!(backend.review_status("R1"), Some(ReviewStatus::Approved));
        let stats = backend.stats().await.unwrap();
        assert_eq!(stats.pending_approvals, 1);
        assert_eq!(stats.approved_profiles, 1);
        assert_eq!(backend.pending_approvals(None).await.len(), 1);
    }

    #[tokio::test]
    async fn test_mock_failure_mapping() {
        let backend = MockBackend::new()
            .with_reviews(vec![review("R1", Role::Investor)])
            .with_failure(MockCall::Approve, 404, "Not found")
            .with_failure(MockCall::PendingApprovals, 500, "boom");

        let err = backend.approve_profile("R1").await.unwrap_err();
        assert_eq!(err.to_string(), "Approval endpoint not available");
        assert!(backend.pending_approvals(None).await.is_empty());

        backend.clear_failure(MockCall::Approve);
        backend.approve_profile("R1").await.unwrap();
        assert_eq!(backend.call_count(MockCall::Approve), 2);
    }

    #[tokio::test]
    async fn test_mock_blank_reason_is_not_recorded() {
        let backend = MockBackend::new().with_reviews(vec![review("R1", Role::Mentor)]);

        assert!(backend.reject_profile("R1", "  ").await.is_err());
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_mock_profile_dispatch_by_role() {
        let backend = MockBackend::new().with_profile(
            "INV-1",
            ProfileDetails {
                organization_name: Some("Northwind".to_string()),
                ..ProfileDetails::default()
            },
        );

        assert!(backend.profile(Role::Investor, "INV-1").await.is_ok());
        assert!(backend.profile(Role::Venture, "INV-1").await.unwrap_err().is_not_found());
        assert_eq!(backend.call_count(MockCall::Profile), 1);
    }
}
