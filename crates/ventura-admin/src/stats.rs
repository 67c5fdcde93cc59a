//! Shared dashboard counters
//!
//! [`StatsStore`] is the single owner of the [`AdminStats`] shown across the
//! admin views. Views report resolved reviews to it and subscribe to changes
//! instead of holding their own copies.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};
use ventura_client::AdminService;
use ventura_core::AdminStats;

/// Outcome of an admin decision on a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Review approved
    Approve,
    /// Review rejected
    Reject,
}

impl Decision {
    /// Past-tense verb for notices
    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Approve => "approved",
            Self::Reject => "rejected",
        }
    }
}

/// Apply a confirmed decision to a set of counters
///
/// The pending count never goes below zero.
pub const fn apply_decision(mut stats: AdminStats, decision: Decision) -> AdminStats {
    stats.pending_approvals = stats.pending_approvals.saturating_sub(1);
    match decision {
        Decision::Approve => stats.approved_profiles = stats.approved_profiles.saturating_add(1),
        Decision::Reject => stats.rejected_profiles = stats.rejected_profiles.saturating_add(1),
    }
    stats
}

/// Watch-backed store of dashboard counters
///
/// Cloning yields another handle onto the same counters.
#[derive(Debug, Clone)]
pub struct StatsStore {
    tx: Arc<watch::Sender<AdminStats>>,
}

impl Default for StatsStore {
    fn default() -> Self {
        Self::new(AdminStats::default())
    }
}

impl StatsStore {
    /// Create a store seeded with `initial`
    pub fn new(initial: AdminStats) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Current counters
    pub fn current(&self) -> AdminStats {
        *self.tx.borrow()
    }

    /// Receive every subsequent change
    pub fn subscribe(&self) -> watch::Receiver<AdminStats> {
        self.tx.subscribe()
    }

    /// Record a review resolved after the backend confirmed it
    pub fn resolve(&self, decision: Decision) {
        self.tx.send_modify(|stats| *stats = apply_decision(*stats, decision));
        debug!(?decision, "Stats updated after review decision");
    }

    /// Replace the counters wholesale
    pub fn set(&self, stats: AdminStats) {
        self.tx.send_replace(stats);
    }

    /// Re-fetch counters from the backend
    ///
    /// On failure the last known counters are kept and returned.
    pub async fn refresh(&self, admin: &dyn AdminService) -> AdminStats {
        match admin.stats().await {
            Ok(stats) => {
                self.set(stats);
                stats
            }
            Err(err) => {
                warn!(error = %err, "Failed to refresh admin stats, keeping last values");
                self.current()
            }
        }
    }
}
