//! Admin, product and profile endpoints against a mock server

#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use ventura_client::{
    AdminService, ClientError, CreateUserRequest, HttpAdminService, HttpClient,
    HttpProductService, HttpProfileService, MemoryTokenStore, ProductService, ProfileService,
    UpdateUserRequest, UserQuery,
};
use ventura_core::{Role, TokenPair};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http(server: &MockServer) -> Arc<HttpClient> {
    let store = MemoryTokenStore::with_tokens(TokenPair {
        access: "a1".to_string(),
        refresh: "r1".to_string(),
    });
    Arc::new(HttpClient::new(format!("{}/api", server.uri()), Arc::new(store)).unwrap())
}

fn review_json(id: &str, role: &str) -> serde_json::Value {
    json!({
        "id": id,
        "user_id": format!("U-{id}"),
        "role": role,
        "status": "PENDING",
        "submitted_at": "2024-03-15T14:25:30Z"
    })
}

fn user_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "email": "grace@example.com",
        "full_name": "Grace Hopper",
        "role": "MENTOR",
        "is_active": true,
        "is_email_verified": true,
        "date_joined": "2024-01-02T08:00:00Z",
        "mentor_profile": {"id": "M-1", "status": "APPROVED"}
    })
}

#[tokio::test]
async fn test_pending_approvals_missing_endpoint_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews/pending"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let admin = HttpAdminService::new(http(&server));
    assert!(admin.pending_approvals(None).await.is_empty());
}

#[tokio::test]
async fn test_pending_approvals_server_error_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews/pending"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let admin = HttpAdminService::new(http(&server));
    assert!(admin.pending_approvals(Some(Role::Venture)).await.is_empty());
}

#[tokio::test]
async fn test_pending_approvals_passes_role_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews/pending"))
        .and(query_param("type", "MENTOR"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([review_json("R3", "MENTOR")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let admin = HttpAdminService::new(http(&server));
    let items = admin.pending_approvals(Some(Role::Mentor)).await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].role, Role::Mentor);
}

#[tokio::test]
async fn test_review_detail_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews/R404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&server)
        .await;

    let admin = HttpAdminService::new(http(&server));
    let err = admin.review_detail("R404").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Review R404 not found");
}

#[tokio::test]
async fn test_approve_missing_endpoint_is_user_facing_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/reviews/R1/approve"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let admin = HttpAdminService::new(http(&server));
    let err = admin.approve_profile("R1").await.unwrap_err();

    assert!(matches!(err, ClientError::EndpointUnavailable { .. }));
    assert_eq!(err.user_message(), "Approval endpoint not available");
}

#[tokio::test]
async fn test_approve_error_message_is_extracted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/reviews/R1/approve"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Review already processed"})),
        )
        .mount(&server)
        .await;

    let admin = HttpAdminService::new(http(&server));
    let err = admin.approve_profile("R1").await.unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.user_message(), "Review already processed");
}

#[tokio::test]
async fn test_reject_sends_trimmed_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/reviews/R2/reject"))
        .and(body_json(json!({"reason": "Deck is incomplete"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "REJECTED"})))
        .expect(1)
        .mount(&server)
        .await;

    let admin = HttpAdminService::new(http(&server));
    admin
        .reject_profile("R2", "  Deck is incomplete ")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_reject_blank_reason_sends_nothing() {
    let server = MockServer::start().await;
    let admin = HttpAdminService::new(http(&server));

    let err = admin.reject_profile("R2", " \t ").await.unwrap_err();

    assert!(matches!(err, ClientError::Validation { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reject_missing_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/reviews/R2/reject"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let admin = HttpAdminService::new(http(&server));
    let err = admin.reject_profile("R2", "Spam").await.unwrap_err();
    assert_eq!(err.to_string(), "Rejection endpoint not available");
}

#[tokio::test]
async fn test_users_listing_and_update() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/users"))
        .and(query_param("role", "MENTOR"))
        .and(query_param("search", "grace"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1, "next": null, "previous": null, "results": [user_json("U7")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/admin/users/U7"))
        .and(body_json(json!({"is_active": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json({
            let mut user = user_json("U7");
            user["is_active"] = json!(false);
            user
        }))
        .expect(1)
        .mount(&server)
        .await;

    let admin = HttpAdminService::new(http(&server));
    let page = admin
        .users(&UserQuery {
            role: Some(Role::Mentor),
            search: Some("grace".to_string()),
            ..UserQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.results[0].mentor_profile.as_ref().unwrap().id, "M-1");

    let updated = admin
        .update_user("U7", &UpdateUserRequest::active(false))
        .await
        .unwrap();
    assert!(!updated.is_active);
}

fn create_request(email: &str) -> CreateUserRequest {
    CreateUserRequest {
        email: email.to_string(),
        full_name: "Grace Hopper".to_string(),
        role: Role::Mentor,
        password: "correct-horse".to_string(),
    }
}

#[tokio::test]
async fn test_create_user_posts_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/users"))
        .and(body_json(json!({
            "email": "grace@example.com",
            "full_name": "Grace Hopper",
            "role": "MENTOR",
            "password": "correct-horse"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(user_json("U9")))
        .expect(1)
        .mount(&server)
        .await;

    let admin = HttpAdminService::new(http(&server));
    let user = admin
        .create_user(&create_request("grace@example.com"))
        .await
        .unwrap();

    assert_eq!(user.id, "U9");
    assert_eq!(user.role, Role::Mentor);
}

#[tokio::test]
async fn test_create_user_invalid_email_sends_nothing() {
    let server = MockServer::start().await;

    let admin = HttpAdminService::new(http(&server));
    let err = admin
        .create_user(&create_request("not-an-email"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Validation { ref field, .. } if field == "email"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_users_missing_endpoint_is_empty_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/users"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let admin = HttpAdminService::new(http(&server));
    let page = admin.users(&UserQuery::default()).await.unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn test_delete_product_and_listing() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/admin/products/P9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/products"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let products = HttpProductService::new(http(&server));
    products.delete_product("P9").await.unwrap();
    assert!(products.products().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_dispatches_by_role() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/investors/INV-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "INV-1",
            "organization_name": "Northwind Capital",
            "check_size_min": "25000.00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let profiles = HttpProfileService::new(http(&server));
    let investor = profiles.profile(Role::Investor, "INV-1").await.unwrap();
    assert_eq!(investor.organization_name.as_deref(), Some("Northwind Capital"));

    let err = profiles.profile(Role::Venture, "V-1").await.unwrap_err();
    assert!(err.is_not_found());
}
