//! End-to-end approval workflow against the in-memory backend

#![allow(clippy::unwrap_used)]

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use ventura_admin::{
    Action, ActionSet, AdminDashboard, AdminRoute, ApprovalQueue, EMPTY_MESSAGE, ItemState,
    NOT_FOUND_MESSAGE, PageState, PendingAction, PitchDeckReviewPage, PitchDeckRoute, ProfileReviewPage,
    ProfileSource, RejectForm, StatsStore, WorkflowError,
};
use ventura_client::mock::{MockBackend, MockCall};
use ventura_core::{AdminStats, ApprovalItem, PitchDeckSnapshot, ProfileDetails, ReviewStatus, Role};

fn review(id: &str, role: Role, name: &str) -> ApprovalItem {
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
        user_name: Some(name.to_string()),
        user_email: Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
        pitch_deck: PitchDeckSnapshot::default(),
        profile_data: None,
    }
}

fn pitch_deck(id: &str, product_id: &str) -> ApprovalItem {
    let mut item = review(id, Role::Venture, "Ada Founder");
    item.product_id = Some(product_id.to_string());
    item.pitch_deck.product_name = Some("Acme Robotics".to_string());
    item
}

fn backend() -> MockBackend {
    let mut investor = review("R1", Role::Investor, "Ian Investor");
    investor.profile_id = Some("INV-1".to_string());
    investor.profile_data = Some(ProfileDetails {
        organization_name: Some("Northwind Capital".to_string()),
        bio: Some("Short bio".to_string()),
        ..ProfileDetails::default()
    });

    MockBackend::new()
        .with_reviews(vec![
            investor,
            pitch_deck("R2", "P9"),
            review("R3", Role::Mentor, "Grace Hopper"),
            review("R4", Role::Mentor, "Alan Turing"),
        ])
        .with_stats(AdminStats {
            pending_approvals: 4,
            approved_profiles: 10,
            rejected_profiles: 2,
            ..AdminStats::default()
        })
        .with_profile(
            "INV-1",
            ProfileDetails {
                bio: Some("Full bio".to_string()),
                check_size_min: Some(25_000_i64.into()),
                ..ProfileDetails::default()
            },
        )
        .with_products(vec![ventura_core::ProductSummary {
            id: "P9".to_string(),
            name: "Acme Robotics".to_string(),
            user_id: Some("U-R2".to_string()),
            status: Some(ReviewStatus::Pending),
            industry: None,
            created_at: None,
        }])
}

async fn loaded_dashboard(backend: &MockBackend) -> AdminDashboard {
    let mut dashboard = AdminDashboard::new(StatsStore::default());
    dashboard.load(backend).await;
    dashboard
}

#[tokio::test]
async fn test_pitch_deck_rows_offer_delete() {
    let backend = backend();
    let dashboard = loaded_dashboard(&backend).await;

    for row in dashboard.queue().visible() {
        let expected = if row.item.product_id.is_some() {
            ActionSet::PitchDeck
        } else {
            ActionSet::Profile
        };
        assert_eq!(row.actions, expected);
        assert_eq!(
            row.actions.allows(Action::DeleteProduct),
            row.item.product_id.is_some()
        );
    }
}

#[tokio::test]
async fn test_blank_rejection_reason_never_reaches_backend() {
    let backend = backend();
    let mut dashboard = loaded_dashboard(&backend).await;
    let calls_before = backend.call_count(MockCall::Reject);

    for reason in ["", "   ", "\t\n"] {
        let err = dashboard
            .queue_mut()
            .reject(&backend, "R3", RejectForm::new(reason))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation { .. }));
    }

    assert_eq!(backend.call_count(MockCall::Reject), calls_before);
    assert_eq!(dashboard.queue().state("R3"), Some(&ItemState::Idle));
}

#[tokio::test]
async fn test_approve_removes_item_and_updates_stats() {
    let backend = backend();
    let mut dashboard = loaded_dashboard(&backend).await;
    let mut cards = dashboard.subscribe();
    let before = dashboard.stats().current();

    dashboard.queue_mut().approve(&backend, "R3").await.unwrap();

    assert!(dashboard.queue().item("R3").is_none());
    assert_eq!(backend.review_status("R3"), Some(ReviewStatus::Approved));
    let after = dashboard.stats().current();
    assert_eq!(after.approved_profiles, before.approved_profiles + 1);
    assert_eq!(after.pending_approvals, before.pending_approvals - 1);
    assert!(cards.has_changed().unwrap());
    assert_eq!(
        dashboard.queue().notice().unwrap().message,
        "Review approved"
    );
}

#[tokio::test]
async fn test_pending_never_negative_when_stats_are_stale() {
    let backend = backend().with_stats(AdminStats::default());
    let mut dashboard = loaded_dashboard(&backend).await;

    dashboard
        .queue_mut()
        .reject(&backend, "R4", RejectForm::new("Incomplete profile"))
        .await
        .unwrap();

    let stats = dashboard.stats().current();
    assert_eq!(stats.pending_approvals, 0);
    assert_eq!(stats.rejected_profiles, 1);
}

#[tokio::test]
async fn test_missing_approval_endpoint_keeps_item() {
    let backend = backend().with_failure(MockCall::Approve, 404, "Not found");
    let mut dashboard = loaded_dashboard(&backend).await;

    let err = dashboard.queue_mut().approve(&backend, "R1").await.unwrap_err();

    assert_eq!(err.user_message(), "Approval endpoint not available");
    assert!(matches!(
        dashboard.queue().state("R1"),
        Some(ItemState::Failed { .. })
    ));
    assert_eq!(dashboard.stats().current().approved_profiles, 10);
}

#[tokio::test]
async fn test_mentor_filter_and_unmatched_search() {
    let backend = backend();
    let mut dashboard = loaded_dashboard(&backend).await;
    let queue = dashboard.queue_mut();

    queue.set_role(Some(Role::Mentor));
    let roles: Vec<Role> = queue.visible().iter().map(|row| row.item.role).collect();
    assert_eq!(roles, vec![Role::Mentor, Role::Mentor]);

    queue.set_search("nobody-matches-this");
    assert!(queue.visible().is_empty());
    assert_eq!(queue.empty_message(), Some(EMPTY_MESSAGE));
    assert_eq!(EMPTY_MESSAGE, "No pending approvals");
}

#[tokio::test]
async fn test_concurrent_actions_on_one_item_are_refused() {
    let backend = backend();
    let stats = StatsStore::default();
    let mut queue = ApprovalQueue::new(stats.clone());
    queue.load(&backend).await;

    let action = queue.begin_approve("R2").unwrap();
    assert!(matches!(
        queue.begin_approve("R2"),
        Err(WorkflowError::ActionInFlight { .. })
    ));

    let outcome = action.execute(&backend).await;
    queue.complete(&action, outcome).unwrap();

    assert_eq!(backend.call_count(MockCall::Approve), 1);
    assert_eq!(stats.current().approved_profiles, 1);
}

#[tokio::test]
async fn test_profile_review_not_found() {
    let backend = backend();
    let route = AdminRoute::parse("/dashboard/admin/profile-review?reviewId=R404").unwrap();
    let mut page = ProfileReviewPage::from_route(&route, StatsStore::default()).unwrap();

    page.load(&backend, &backend).await;

    assert!(page.state().is_not_found());
    assert_eq!(page.not_found_message(), Some(NOT_FOUND_MESSAGE));
    assert_eq!(NOT_FOUND_MESSAGE, "Review not found");
    assert!(matches!(
        page.approve(&backend).await,
        Err(WorkflowError::NotReady { .. })
    ));
}

#[tokio::test]
async fn test_profile_review_failing_fetch_is_not_found() {
    let backend = backend().with_failure(MockCall::ReviewDetail, 500, "Internal error");
    let mut page = ProfileReviewPage::new("R1", StatsStore::default());

    page.load(&backend, &backend).await;

    assert_eq!(page.not_found_message(), Some("Review not found"));
}

#[tokio::test]
async fn test_profile_review_merges_side_loaded_profile() {
    let backend = backend();
    let stats = StatsStore::new(AdminStats {
        pending_approvals: 1,
        ..AdminStats::default()
    });
    let mut page = ProfileReviewPage::new("R1", stats.clone());

    page.load(&backend, &backend).await;

    let data = page.state().ready().unwrap();
    assert_eq!(data.source, ProfileSource::Fetched);
    assert_eq!(data.profile.bio.as_deref(), Some("Full bio"));
    assert_eq!(
        data.profile.organization_name.as_deref(),
        Some("Northwind Capital")
    );

    let notice = page.approve(&backend).await.unwrap();
    assert_eq!(notice.message, "Profile approved successfully");
    assert!(matches!(page.state(), PageState::Closed(_)));
    assert_eq!(stats.current().pending_approvals, 0);
    assert_eq!(stats.current().approved_profiles, 1);
}

#[tokio::test]
async fn test_profile_review_falls_back_to_embedded_snapshot() {
    let backend = backend().with_failure(MockCall::Profile, 500, "down");
    let mut page = ProfileReviewPage::new("R1", StatsStore::default());

    page.load(&backend, &backend).await;

    let data = page.state().ready().unwrap();
    assert_eq!(data.source, ProfileSource::Embedded);
    assert_eq!(data.profile.bio.as_deref(), Some("Short bio"));
}

#[tokio::test]
async fn test_profile_reject_failure_keeps_page_open() {
    let backend = backend().with_failure(MockCall::Reject, 404, "Not found");
    let mut page = ProfileReviewPage::new("R1", StatsStore::default());
    page.load(&backend, &backend).await;

    let err = page
        .reject(&backend, RejectForm::new("Not a fit"))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Rejection endpoint not available");
    assert_eq!(page.error(), Some("Rejection endpoint not available"));
    assert!(page.state().ready().is_some());
}

#[tokio::test]
async fn test_pitch_deck_review_falls_back_to_pending_scan() {
    let backend = backend().with_failure(MockCall::ReviewDetail, 404, "Not found");
    let mut page = PitchDeckReviewPage::new(PitchDeckRoute::new("R2"), StatsStore::default());

    page.load(&backend).await;

    let data = page.state().ready().unwrap();
    assert_eq!(data.product_id, "P9");
    assert_eq!(backend.call_count(MockCall::PendingApprovals), 1);
}

#[tokio::test]
async fn test_pitch_deck_review_takes_product_from_route() {
    let mut item = review("R5", Role::Venture, "Lin Founder");
    item.product_id = None;
    let backend = MockBackend::new().with_reviews(vec![item]);
    let route = AdminRoute::parse(
        "/dashboard/admin/pitch-deck-review?reviewId=R5&productId=P5&productName=Lin%20Labs",
    )
    .unwrap();
    let mut page = PitchDeckReviewPage::from_route(&route, StatsStore::default()).unwrap();

    page.load(&backend).await;

    let data = page.state().ready().unwrap();
    assert_eq!(data.product_id, "P5");
    assert_eq!(data.item.pitch_deck.product_name.as_deref(), Some("Lin Labs"));
}

#[tokio::test]
async fn test_pitch_deck_page_refuses_profile_review() {
    let backend = backend();
    let route = PitchDeckRoute {
        product_id: Some("P9".to_string()),
        ..PitchDeckRoute::new("R1")
    };
    let mut page = PitchDeckReviewPage::new(route, StatsStore::default());

    page.load(&backend).await;

    assert_eq!(page.not_found_message(), Some(NOT_FOUND_MESSAGE));
    assert!(page.request_delete().is_err());
    assert!(page.confirm_delete(&backend).await.is_err());
    assert_eq!(backend.call_count(MockCall::DeleteProduct), 0);
    assert!(backend.has_product("P9"));
}

#[tokio::test]
async fn test_pitch_deck_review_keeps_its_own_product() {
    let backend = backend();
    let route = PitchDeckRoute {
        product_id: Some("P-OTHER".to_string()),
        ..PitchDeckRoute::new("R2")
    };
    let mut page = PitchDeckReviewPage::new(route, StatsStore::default());

    page.load(&backend).await;

    let data = page.state().ready().unwrap();
    assert_eq!(data.product_id, "P9");
    assert_eq!(data.item.product_id.as_deref(), Some("P9"));
}

#[tokio::test]
async fn test_decision_reaches_backend_without_loaded_queue() {
    let backend = backend().with_failure(MockCall::PendingApprovals, 404, "Not found");
    let stats = StatsStore::new(AdminStats {
        pending_approvals: 4,
        ..AdminStats::default()
    });

    let notice = PendingAction::approve("R1")
        .submit(&backend, &stats)
        .await
        .unwrap();

    assert_eq!(notice.message, "Review approved successfully");
    assert_eq!(backend.call_count(MockCall::Approve), 1);
    assert_eq!(backend.call_count(MockCall::PendingApprovals), 0);
    assert_eq!(backend.review_status("R1"), Some(ReviewStatus::Approved));
    assert_eq!(stats.current().pending_approvals, 3);
    assert_eq!(stats.current().approved_profiles, 1);

    let notice = PendingAction::reject("R3", RejectForm::new("  Not a fit  "))
        .unwrap()
        .submit(&backend, &stats)
        .await
        .unwrap();
    assert_eq!(notice.message, "Review rejected successfully");
    assert_eq!(stats.current().rejected_profiles, 1);
}

#[tokio::test]
async fn test_decision_for_unknown_review_reports_backend_error() {
    let backend = backend();
    let stats = StatsStore::new(AdminStats {
        pending_approvals: 4,
        ..AdminStats::default()
    });

    let err = PendingAction::approve("R99")
        .submit(&backend, &stats)
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Client(_)));
    assert_eq!(backend.call_count(MockCall::Approve), 1);
    assert_eq!(stats.current().pending_approvals, 4);
}

#[tokio::test]
async fn test_pitch_deck_review_without_product_is_not_found() {
    let backend = MockBackend::new().with_reviews(vec![review("R6", Role::Venture, "No Deck")]);
    let mut page = PitchDeckReviewPage::new(PitchDeckRoute::new("R6"), StatsStore::default());

    page.load(&backend).await;

    assert_eq!(page.not_found_message(), Some(NOT_FOUND_MESSAGE));
}

#[tokio::test]
async fn test_pitch_deck_delete_requires_confirmation() {
    let backend = backend();
    let stats = StatsStore::new(AdminStats {
        pending_approvals: 4,
        ..AdminStats::default()
    });
    let mut page = PitchDeckReviewPage::new(PitchDeckRoute::new("R2"), stats.clone());
    page.load(&backend).await;

    assert!(matches!(
        page.confirm_delete(&backend).await,
        Err(WorkflowError::ConfirmationRequired { .. })
    ));
    assert_eq!(backend.call_count(MockCall::DeleteProduct), 0);

    page.request_delete().unwrap();
    page.cancel_delete();
    assert!(!page.is_delete_requested());
    assert!(page.confirm_delete(&backend).await.is_err());

    page.request_delete().unwrap();
    let notice = page.confirm_delete(&backend).await.unwrap();

    assert_eq!(notice.message, "Product deleted successfully");
    assert!(!backend.has_product("P9"));
    assert_eq!(stats.current().pending_approvals, 4);
    assert!(page.state().closed_notice().is_some());
}

#[tokio::test]
async fn test_pitch_deck_approve_updates_shared_stats() {
    let backend = backend();
    let stats = StatsStore::new(AdminStats {
        pending_approvals: 2,
        ..AdminStats::default()
    });
    let dashboard = AdminDashboard::new(stats.clone());
    let mut page = PitchDeckReviewPage::new(PitchDeckRoute::new("R2"), stats);
    page.load(&backend).await;

    let notice = page.approve(&backend).await.unwrap();

    assert_eq!(notice.message, "Pitch deck approved successfully");
    assert_eq!(dashboard.cards()[0].value, 1);
    assert_eq!(dashboard.cards()[1].value, 1);
}
