//! Investor and mentor profile review page

use super::{NOT_FOUND_MESSAGE, PageState, submit_decision};
use crate::error::{WorkflowError, WorkflowResult};
use crate::notice::Notice;
use crate::queue::{PendingAction, RejectForm};
use crate::routes::AdminRoute;
use crate::stats::StatsStore;
use tracing::{debug, instrument, warn};
use ventura_client::{AdminService, ProfileService};
use ventura_core::{ApprovalItem, ProfileDetails, ReviewId};

/// Where the displayed profile fields came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSource {
    /// Full profile fetched from the role endpoint, gaps filled from the review
    Fetched,
    /// Only the snapshot embedded in the review
    Embedded,
}

/// Loaded review with its merged profile
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileReviewData {
    /// The review
    pub item: ApprovalItem,
    /// Profile fields to display
    pub profile: ProfileDetails,
    /// Origin of `profile`
    pub source: ProfileSource,
}

/// Review page for an investor or mentor profile
#[derive(Debug)]
pub struct ProfileReviewPage {
    review_id: ReviewId,
    state: PageState<ProfileReviewData>,
    error: Option<String>,
    stats: StatsStore,
}

impl ProfileReviewPage {
    /// Page for `review_id`, not yet loaded
    pub fn new(review_id: impl Into<ReviewId>, stats: StatsStore) -> Self {
        Self {
            review_id: review_id.into(),
            state: PageState::Loading,
            error: None,
            stats,
        }
    }

    /// Page addressed by a profile-review route
    pub fn from_route(route: &AdminRoute, stats: StatsStore) -> WorkflowResult<Self> {
        match route {
            AdminRoute::ProfileReview { review_id } => Ok(Self::new(review_id.clone(), stats)),
            other => Err(WorkflowError::invalid_route(
                other.to_url(),
                "not a profile review page",
            )),
        }
    }

    /// Review shown by this page
    pub fn review_id(&self) -> &str {
        &self.review_id
    }

    /// Current page state
    pub const fn state(&self) -> &PageState<ProfileReviewData> {
        &self.state
    }

    /// Error from the last failed action
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Message to show instead of the page body
    pub const fn not_found_message(&self) -> Option<&'static str> {
        if self.state.is_not_found() {
            Some(NOT_FOUND_MESSAGE)
        } else {
            None
        }
    }

    /// Fetch the review, then side-load the full profile
    ///
    /// Any failure to fetch the review leaves the page in
    /// [`PageState::NotFound`]. A failed side-load falls back to the snapshot
    /// embedded in the review.
    #[instrument(skip_all, fields(review_id = %self.review_id))]
    pub async fn load(&mut self, admin: &dyn AdminService, profiles: &dyn ProfileService) {
        self.state = PageState::Loading;
        self.error = None;

        let item = match admin.review_detail(&self.review_id).await {
            Ok(item) => item,
            Err(err) => {
                warn!(error = %err, "Failed to load review");
                self.state = PageState::NotFound;
                return;
            }
        };

        let embedded = item.profile_data.clone().unwrap_or_default();
        let fetched = match item.profile_id.as_deref() {
            Some(profile_id) => match profiles.profile(item.role, profile_id).await {
                Ok(profile) => Some(profile),
                Err(err) => {
                    debug!(error = %err, "Profile side-load failed, using embedded snapshot");
                    None
                }
            },
            None => None,
        };

        let (profile, source) = match fetched {
            Some(profile) => (profile.merged_over(embedded), ProfileSource::Fetched),
            None => (embedded, ProfileSource::Embedded),
        };
        self.state = PageState::Ready(ProfileReviewData {
            item,
            profile,
            source,
        });
    }

    /// Approve the review and close the page
    pub async fn approve(&mut self, admin: &dyn AdminService) -> WorkflowResult<Notice> {
        self.ensure_ready()?;
        let action = PendingAction::approve(self.review_id.clone());
        self.finish(submit_decision(admin, &self.stats, &action, "Profile").await)
    }

    /// Reject the review with a reason and close the page
    ///
    /// A blank reason fails validation without contacting the backend.
    pub async fn reject(
        &mut self,
        admin: &dyn AdminService,
        form: RejectForm,
    ) -> WorkflowResult<Notice> {
        self.ensure_ready()?;
        let action = PendingAction::reject(self.review_id.clone(), form)?;
        self.finish(submit_decision(admin, &self.stats, &action, "Profile").await)
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
