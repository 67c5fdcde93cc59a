//! Approval queue
//!
//! Lists pending reviews, filters them by search text and role, and drives
//! approve/reject decisions. Each item carries its own submission state so a
//! second action cannot be dispatched while one is in flight, and a failed
//! action leaves the item in place for a retry.
//!
//! Actions are split in three steps so that no borrow of the queue is held
//! while the request runs:
//!
//! 1. [`ApprovalQueue::begin_approve`] / [`ApprovalQueue::begin_reject`] mark
//!    the item as submitting and return a detached [`PendingAction`].
//! 2. [`PendingAction::execute`] performs the REST call.
//! 3. [`ApprovalQueue::complete`] applies the outcome.
//!
//! [`ApprovalQueue::approve`] and [`ApprovalQueue::reject`] run all three.

use crate::error::{WorkflowError, WorkflowResult};
use crate::notice::Notice;
use crate::routes::AdminRoute;
use crate::stats::{Decision, StatsStore};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use validator::{Validate, ValidationError};
use ventura_client::{AdminService, ClientResult};
use ventura_core::{ApprovalItem, ReviewId, Role};

/// Shown when no item passes the filter
pub const EMPTY_MESSAGE: &str = "No pending approvals";

/// Submission state of a queue item
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ItemState {
    /// Awaiting a decision
    #[default]
    Idle,
    /// A decision is being sent
    Submitting(Decision),
    /// The last decision failed; the item can be retried
    Failed {
        /// Decision that failed
        decision: Decision,
        /// Error message for the operator
        message: String,
    },
}

impl ItemState {
    /// Whether a request for this item is in flight
    pub const fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting(_))
    }
}

/// Something the operator can do with a queue row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Open the detail page
    View,
    /// Approve the review
    Approve,
    /// Reject the review with a reason
    Reject,
    /// Delete the product behind a pitch deck
    DeleteProduct,
}

/// Actions offered for a kind of review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSet {
    /// Investor or mentor profile
    Profile,
    /// Venture pitch deck
    PitchDeck,
}

impl ActionSet {
    /// Action set for an item; pitch decks are recognised by their product id
    pub const fn for_item(item: &ApprovalItem) -> Self {
        if item.is_pitch_deck() {
            Self::PitchDeck
        } else {
            Self::Profile
        }
    }

    /// Actions in display order
    pub const fn actions(self) -> &'static [Action] {
        match self {
            Self::Profile => &[Action::View, Action::Approve, Action::Reject],
            Self::PitchDeck => &[
                Action::View,
                Action::Approve,
                Action::Reject,
                Action::DeleteProduct,
            ],
        }
    }

    /// Whether `action` is offered
    pub fn allows(self, action: Action) -> bool {
        self.actions().contains(&action)
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Please provide a reason for rejection".into());
        return Err(error);
    }
    Ok(())
}

/// Rejection reason entered by the operator
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RejectForm {
    /// Free-text reason; must contain more than whitespace
    #[validate(
        custom(function = "not_blank"),
        length(max = 1000, message = "Reason must be at most 1000 characters")
    )]
    pub reason: String,
}

impl RejectForm {
    /// Form holding `reason`
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Validate and return the trimmed reason
    pub fn into_reason(self) -> WorkflowResult<String> {
        self.validate()?;
        Ok(self.reason.trim().to_string())
    }
}

/// A decision detached from the queue, ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    review_id: ReviewId,
    decision: Decision,
    reason: Option<String>,
}

impl PendingAction {
    /// Approval of `review_id`
    pub fn approve(review_id: impl Into<ReviewId>) -> Self {
        Self {
            review_id: review_id.into(),
            decision: Decision::Approve,
            reason: None,
        }
    }

    /// Rejection of `review_id`; fails on a blank reason
    pub fn reject(review_id: impl Into<ReviewId>, form: RejectForm) -> WorkflowResult<Self> {
        Ok(Self {
            review_id: review_id.into(),
            decision: Decision::Reject,
            reason: Some(form.into_reason()?),
        })
    }

    /// Review this action targets
    pub fn review_id(&self) -> &str {
        &self.review_id
    }

    /// Decision being sent
    pub const fn decision(&self) -> Decision {
        self.decision
    }

    /// Send the decision and record it in `stats` on success
    ///
    /// Works without a loaded queue, so the backend reports its own errors
    /// for unknown or already decided reviews.
    pub async fn submit(
        &self,
        admin: &dyn AdminService,
        stats: &StatsStore,
    ) -> WorkflowResult<Notice> {
        crate::review::submit_decision(admin, stats, self, "Review").await
    }

    /// Send the decision to the backend
    pub async fn execute(&self, admin: &dyn AdminService) -> ClientResult<()> {
        match self.decision {
            Decision::Approve => admin.approve_profile(&self.review_id).await,
            Decision::Reject => {
                admin
                    .reject_profile(&self.review_id, self.reason.as_deref().unwrap_or_default())
                    .await
            }
        }
    }
}

/// Search text and role filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueFilter {
    /// Case-insensitive substring of the submitter's name or email
    pub search: String,
    /// Exact role match
    pub role: Option<Role>,
}

impl QueueFilter {
    /// Whether `item` passes both the search and the role filter
    pub fn matches(&self, item: &ApprovalItem) -> bool {
        if self.role.is_some_and(|role| item.role != role) {
            return false;
        }

        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [item.user_name.as_deref(), item.user_email.as_deref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone)]
struct QueueEntry {
    item: ApprovalItem,
    state: ItemState,
}

/// A visible queue row
#[derive(Debug, Clone, PartialEq)]
pub struct QueueRow<'a> {
    /// The pending review
    pub item: &'a ApprovalItem,
    /// Submission state
    pub state: &'a ItemState,
    /// Actions offered
    pub actions: ActionSet,
    /// Detail page to open for [`Action::View`] and [`Action::DeleteProduct`]
    pub route: AdminRoute,
}

/// Pending reviews awaiting an admin decision
#[derive(Debug)]
pub struct ApprovalQueue {
    entries: Vec<QueueEntry>,
    filter: QueueFilter,
    stats: StatsStore,
    notice: Option<Notice>,
}

impl ApprovalQueue {
    /// Empty queue reporting decisions to `stats`
    pub const fn new(stats: StatsStore) -> Self {
        Self {
            entries: Vec::new(),
            filter: QueueFilter {
                search: String::new(),
                role: None,
            },
            stats,
            notice: None,
        }
    }

    /// Replace the items with the backend's pending list
    ///
    /// Items still present keep an in-flight or failed state.
    #[instrument(skip_all)]
    pub async fn load(&mut self, admin: &dyn AdminService) {
        let items = admin.pending_approvals(None).await;
        self.replace(items);
    }

    /// Replace the items directly
    pub fn replace(&mut self, items: Vec<ApprovalItem>) {
        let previous = std::mem::take(&mut self.entries);
        self.entries = items
            .into_iter()
            .filter(|item| !item.status.is_terminal())
            .map(|item| {
                let state = previous
                    .iter()
                    .find(|entry| entry.item.id == item.id)
                    .map(|entry| entry.state.clone())
                    .unwrap_or_default();
                QueueEntry { item, state }
            })
            .collect();
        debug!(count = self.entries.len(), "Approval queue loaded");
    }

    /// Current filter
    pub const fn filter(&self) -> &QueueFilter {
        &self.filter
    }

    /// Set the search text
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
    }

    /// Set or clear the role filter
    pub const fn set_role(&mut self, role: Option<Role>) {
        self.filter.role = role;
    }

    /// Number of loaded items, ignoring the filter
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no items are loaded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loaded item by review id
    pub fn item(&self, review_id: &str) -> Option<&ApprovalItem> {
        self.entry(review_id).map(|entry| &entry.item)
    }

    /// Submission state by review id
    pub fn state(&self, review_id: &str) -> Option<&ItemState> {
        self.entry(review_id).map(|entry| &entry.state)
    }

    /// Rows passing the current filter, in backend order
    pub fn visible(&self) -> Vec<QueueRow<'_>> {
        self.entries
            .iter()
            .filter(|entry| self.filter.matches(&entry.item))
            .map(|entry| QueueRow {
                item: &entry.item,
                state: &entry.state,
                actions: ActionSet::for_item(&entry.item),
                route: AdminRoute::for_item(&entry.item),
            })
            .collect()
    }

    /// Placeholder text when the filtered list is empty
    pub fn empty_message(&self) -> Option<&'static str> {
        self.visible().is_empty().then_some(EMPTY_MESSAGE)
    }

    /// Notice from the last completed action
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Mark an item as being approved
    pub fn begin_approve(&mut self, review_id: &str) -> WorkflowResult<PendingAction> {
        self.begin(PendingAction::approve(review_id))
    }

    /// Mark an item as being rejected
    ///
    /// A blank reason fails validation and leaves the item untouched.
    pub fn begin_reject(&mut self, review_id: &str, form: RejectForm) -> WorkflowResult<PendingAction> {
        if self.entry(review_id).is_none() {
            return Err(WorkflowError::unknown_item(review_id));
        }
        let action = PendingAction::reject(review_id, form)?;
        self.begin(action)
    }

    fn begin(&mut self, action: PendingAction) -> WorkflowResult<PendingAction> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.item.id == action.review_id)
            .ok_or_else(|| WorkflowError::unknown_item(&action.review_id))?;

        if entry.state.is_submitting() {
            return Err(WorkflowError::in_flight(&action.review_id));
        }
        entry.state = ItemState::Submitting(action.decision);
        Ok(action)
    }

    /// Apply the backend's answer to a previously begun action
    ///
    /// On success the item leaves the queue and the stats store is updated.
    /// On failure the item stays, marked failed, and the error is returned.
    pub fn complete(&mut self, action: &PendingAction, outcome: ClientResult<()>) -> WorkflowResult<()> {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.item.id == action.review_id);

        match outcome {
            Ok(()) => {
                if let Some(index) = position {
                    self.entries.remove(index);
                }
                self.stats.resolve(action.decision);
                info!(review_id = %action.review_id, decision = ?action.decision, "Review resolved");
                self.notice = Some(Notice::success(format!(
                    "Review {}",
                    action.decision.past_tense()
                )));
                Ok(())
            }
            Err(err) => {
                let message = err.user_message();
                warn!(review_id = %action.review_id, error = %err, "Review decision failed");
                if let Some(index) = position {
                    self.entries[index].state = ItemState::Failed {
                        decision: action.decision,
                        message: message.clone(),
                    };
                }
                self.notice = Some(Notice::error(message));
                Err(err.into())
            }
        }
    }

    /// Approve an item and apply the outcome
    pub async fn approve(&mut self, admin: &dyn AdminService, review_id: &str) -> WorkflowResult<()> {
        let action = self.begin_approve(review_id)?;
        let outcome = action.execute(admin).await;
        self.complete(&action, outcome)
    }

    /// Reject an item and apply the outcome
    pub async fn reject(
        &mut self,
        admin: &dyn AdminService,
        review_id: &str,
        form: RejectForm,
    ) -> WorkflowResult<()> {
        let action = self.begin_reject(review_id, form)?;
        let outcome = action.execute(admin).await;
        self.complete(&action, outcome)
    }

    fn entry(&self, review_id: &str) -> Option<&QueueEntry> {
        self.entries.iter().find(|entry| entry.item.id == review_id)
    }
}
