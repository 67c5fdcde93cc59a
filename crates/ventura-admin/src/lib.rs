//! Approval workflow for the Ventura marketplace admin area
//!
//! Headless view-models for the admin dashboard: the approval queue, the
//! profile and pitch-deck review pages, the user directory and the shared
//! stats store. Each view owns its state and talks to the backend through the
//! service traits of [`ventura_client`], so the same logic drives the CLI and
//! the tests (against [`ventura_client::mock::MockBackend`]).

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod dashboard;
pub mod error;
pub mod notice;
pub mod queue;
pub mod review;
pub mod routes;
pub mod stats;
pub mod users;

pub use dashboard::{AdminDashboard, StatCard};
pub use error::{WorkflowError, WorkflowResult};
pub use notice::{Notice, NoticeLevel};
pub use queue::{
    Action, ActionSet, ApprovalQueue, EMPTY_MESSAGE, ItemState, PendingAction, QueueFilter,
    QueueRow, RejectForm,
};
pub use review::{
    NOT_FOUND_MESSAGE, PageState, PitchDeckReviewData, PitchDeckReviewPage, ProfileReviewData,
    ProfileReviewPage, ProfileSource,
};
pub use routes::{AdminRoute, PitchDeckRoute};
pub use stats::{Decision, StatsStore};
pub use users::{UserDirectory, UserViewPage};
