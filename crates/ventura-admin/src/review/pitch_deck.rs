//! Venture pitch-deck review page

use super::{NOT_FOUND_MESSAGE, PageState, submit_decision};
use crate::error::{WorkflowError, WorkflowResult};
use crate::notice::Notice;
use crate::queue::{PendingAction, RejectForm};
use crate::routes::{AdminRoute, PitchDeckRoute};
use crate::stats::StatsStore;
use tracing::{debug, info, instrument, warn};
use ventura_client::{AdminService, ProductService};
use ventura_core::{ApprovalItem, ProductId, Role};

/// Loaded pitch-deck review
#[derive(Debug, Clone, PartialEq)]
pub struct PitchDeckReviewData {
    /// The review, with route parameters filling its gaps
    pub item: ApprovalItem,
    /// Product under review
    pub product_id: ProductId,
}

/// Review page for a venture's pitch deck
///
/// Besides approve and reject, the operator can delete the product. Deletion
/// takes two steps: [`Self::request_delete`] arms it and
/// [`Self::confirm_delete`] performs it.
#[derive(Debug)]
pub struct PitchDeckReviewPage {
    route: PitchDeckRoute,
    state: PageState<PitchDeckReviewData>,
    delete_requested: bool,
    error: Option<String>,
    stats: StatsStore,
}

impl PitchDeckReviewPage {
    /// Page for the given route parameters, not yet loaded
    pub const fn new(route: PitchDeckRoute, stats: StatsStore) -> Self {
        Self {
            route,
            state: PageState::Loading,
            delete_requested: false,
            error: None,
            stats,
        }
    }

    /// Page addressed by a pitch-deck-review route
    pub fn from_route(route: &AdminRoute, stats: StatsStore) -> WorkflowResult<Self> {
        match route {
            AdminRoute::PitchDeckReview(params) => Ok(Self::new(params.clone(), stats)),
            other => Err(WorkflowError::invalid_route(
                other.to_url(),
                "not a pitch-deck review page",
            )),
        }
    }

    /// Review shown by this page
    pub fn review_id(&self) -> &str {
        &self.route.review_id
    }

    /// Current page state
    pub const fn state(&self) -> &PageState<PitchDeckReviewData> {
        &self.state
    }

    /// Error from the last failed action
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a delete awaits confirmation
    pub const fn is_delete_requested(&self) -> bool {
        self.delete_requested
    }

    /// Message to show instead of the page body
    pub const fn not_found_message(&self) -> Option<&'static str> {
        if self.state.is_not_found() {
            Some(NOT_FOUND_MESSAGE)
        } else {
            None
        }
    }

    /// Load the review
    ///
    /// Fetches the review by id. If that fails, the venture pending list is
    /// scanned for it, since older backends only expose the list. The page
    /// ends up [`PageState::NotFound`] when neither source has the review, the
    /// review is not a venture's, or no product id is known for it. The
    /// review's own product id takes precedence over the route's.
    #[instrument(skip_all, fields(review_id = %self.route.review_id))]
    pub async fn load(&mut self, admin: &dyn AdminService) {
        self.state = PageState::Loading;
        self.delete_requested = false;
        self.error = None;

        let item = match admin.review_detail(&self.route.review_id).await {
            Ok(item) => Some(item),
            Err(err) => {
                debug!(error = %err, "Direct review fetch failed, scanning pending list");
                admin
                    .pending_approvals(Some(Role::Venture))
                    .await
                    .into_iter()
                    .find(|item| item.id == self.route.review_id)
            }
        };

        let Some(mut item) = item else {
            warn!("Pitch-deck review not found");
            self.state = PageState::NotFound;
            return;
        };
        if item.role != Role::Venture {
            warn!(role = %item.role, "Review is not a venture pitch deck");
            self.state = PageState::NotFound;
            return;
        }

        self.fill_from_route(&mut item);
        let Some(product_id) = item.product_id.clone() else {
            warn!("Pitch-deck review has no product");
            self.state = PageState::NotFound;
            return;
        };

        self.state = PageState::Ready(PitchDeckReviewData { item, product_id });
    }

    fn fill_from_route(&self, item: &mut ApprovalItem) {
        if item.product_id.is_none() {
            item.product_id.clone_from(&self.route.product_id);
        }
        if item.pitch_deck.product_name.is_none() {
            item.pitch_deck.product_name.clone_from(&self.route.product_name);
        }
        if item.user_name.is_none() {
            item.user_name.clone_from(&self.route.user_name);
        }
        if item.user_email.is_none() {
            item.user_email.clone_from(&self.route.user_email);
        }
    }

    /// Approve the pitch deck and close the page
    pub async fn approve(&mut self, admin: &dyn AdminService) -> WorkflowResult<Notice> {
        self.ensure_ready()?;
        let action = PendingAction::approve(self.route.review_id.clone());
        self.finish(submit_decision(admin, &self.stats, &action, "Pitch deck").await)
    }

    /// Reject the pitch deck with a reason and close the page
    pub async fn reject(
        &mut self,
        admin: &dyn AdminService,
        form: RejectForm,
    ) -> WorkflowResult<Notice> {
        self.ensure_ready()?;
        let action = PendingAction::reject(self.route.review_id.clone(), form)?;
        self.finish(submit_decision(admin, &self.stats, &action, "Pitch deck").await)
    }

    /// Arm product deletion
    pub fn request_delete(&mut self) -> WorkflowResult<()> {
        self.ensure_ready()?;
        self.delete_requested = true;
        Ok(())
    }

    /// Disarm product deletion
    pub const fn cancel_delete(&mut self) {
        self.delete_requested = false;
    }

    /// Delete the product after [`Self::request_delete`]
    ///
    /// Review counters are not affected.
    pub async fn confirm_delete(&mut self, products: &dyn ProductService) -> WorkflowResult<Notice> {
        let product_id = match &self.state {
            PageState::Ready(data) => data.product_id.clone(),
            other => return Err(WorkflowError::not_ready(other.label())),
        };
        if !self.delete_requested {
            return Err(WorkflowError::ConfirmationRequired {
                action: "product deletion".to_string(),
            });
        }
        self.delete_requested = false;

        match products.delete_product(&product_id).await {
            Ok(()) => {
                info!(product_id = %product_id, "Product deleted from review page");
                self.finish(Ok(Notice::success("Product deleted successfully")))
            }
            Err(err) => self.finish(Err(err.into())),
        }
    }

    fn ensure_ready(&self) -> WorkflowResult<()> {
        match self.state {
            PageState::Ready(_) => Ok(()),
            ref other => Err(WorkflowError::not_ready(other.label())),
        }
    }

    fn finish(&mut self, outcome: WorkflowResult<Notice>) -> WorkflowResult<Notice> {
        match outcome {
            Ok(notice) => {
                self.error = None;
                self.state = PageState::Closed(notice.clone());
                Ok(notice)
            }
            Err(err) => {
                self.error = Some(err.user_message());
                Err(err)
            }
        }
    }
}
