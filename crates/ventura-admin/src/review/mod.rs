//! Review detail pages
//!
//! Both pages share the same lifecycle: they start [`PageState::Loading`],
//! become [`PageState::Ready`] or [`PageState::NotFound`] after loading, and
//! close with a notice once the operator's action succeeds. A failed action
//! keeps the page open with the error shown.

mod pitch_deck;
mod profile;

pub use pitch_deck::{PitchDeckReviewData, PitchDeckReviewPage};
pub use profile::{ProfileReviewData, ProfileReviewPage, ProfileSource};

use crate::error::WorkflowResult;
use crate::notice::Notice;
use crate::queue::PendingAction;
use crate::stats::StatsStore;
use tracing::{info, warn};
use ventura_client::AdminService;

/// Shown when the review cannot be loaded
pub const NOT_FOUND_MESSAGE: &str = "Review not found";

/// Lifecycle of a detail page
#[derive(Debug, Clone, PartialEq)]
pub enum PageState<T> {
    /// Fetch in progress
    Loading,
    /// Record loaded
    Ready(T),
    /// Record could not be loaded
    NotFound,
    /// Action completed; the page should close showing the notice
    Closed(Notice),
}

impl<T> PageState<T> {
    /// Short name of the state, for logs and errors
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready(_) => "ready",
            Self::NotFound => "not found",
            Self::Closed(_) => "closed",
        }
    }

    /// Loaded record, if ready
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }

    /// Whether loading failed
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Closing notice, once an action succeeded
    pub const fn closed_notice(&self) -> Option<&Notice> {
        match self {
            Self::Closed(notice) => Some(notice),
            _ => None,
        }
    }
}

/// Send a decision and record it in the stats store on success
pub(crate) async fn submit_decision(
    admin: &dyn AdminService,
    stats: &StatsStore,
    action: &PendingAction,
    subject: &str,
) -> WorkflowResult<Notice> {
    match action.execute(admin).await {
        Ok(()) => {
            stats.resolve(action.decision());
            info!(review_id = action.review_id(), decision = ?action.decision(), "Review resolved");
            Ok(Notice::success(format!(
                "{subject} {} successfully",
                action.decision().past_tense()
            )))
        }
        Err(err) => {
            warn!(review_id = action.review_id(), error = %err, "Review decision failed");
            Err(err.into())
        }
    }
}
