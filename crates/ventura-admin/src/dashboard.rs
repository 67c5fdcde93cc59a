//! Admin dashboard: counters plus the approval queue

use crate::queue::ApprovalQueue;
use crate::stats::StatsStore;
use tokio::sync::watch;
use ventura_client::AdminService;
use ventura_core::AdminStats;

/// A labelled counter shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatCard {
    /// Card title
    pub label: &'static str,
    /// Counter value
    pub value: u64,
}

/// Dashboard cards in display order
pub const fn stat_cards(stats: &AdminStats) -> [StatCard; 7] {
    [
        StatCard {
            label: "Pending approvals",
            value: stats.pending_approvals,
        },
        StatCard {
            label: "Approved",
            value: stats.approved_profiles,
        },
        StatCard {
            label: "Rejected",
            value: stats.rejected_profiles,
        },
        StatCard {
            label: "Total users",
            value: stats.total_users,
        },
        StatCard {
            label: "Ventures",
            value: stats.total_ventures,
        },
        StatCard {
            label: "Investors",
            value: stats.total_investors,
        },
        StatCard {
            label: "Mentors",
            value: stats.total_mentors,
        },
    ]
}

/// The admin landing view
///
/// The queue and the cards read the same [`StatsStore`], so a decision taken
/// in the queue (or on a review page sharing the store) shows up in the cards
/// without a reload.
#[derive(Debug)]
pub struct AdminDashboard {
    stats: StatsStore,
    queue: ApprovalQueue,
}

impl AdminDashboard {
    /// Dashboard backed by `stats`
    pub fn new(stats: StatsStore) -> Self {
        Self {
            queue: ApprovalQueue::new(stats.clone()),
            stats,
        }
    }

    /// Fetch counters and pending reviews concurrently
    pub async fn load(&mut self, admin: &dyn AdminService) {
        let (_, items) = tokio::join!(self.stats.refresh(admin), admin.pending_approvals(None));
        self.queue.replace(items);
    }

    /// Shared stats store
    pub const fn stats(&self) -> &StatsStore {
        &self.stats
    }

    /// Follow counter changes
    pub fn subscribe(&self) -> watch::Receiver<AdminStats> {
        self.stats.subscribe()
    }

    /// Current cards
    pub fn cards(&self) -> [StatCard; 7] {
        stat_cards(&self.stats.current())
    }

    /// The approval queue
    pub const fn queue(&self) -> &ApprovalQueue {
        &self.queue
    }

    /// The approval queue, for actions
    pub const fn queue_mut(&mut self) -> &mut ApprovalQueue {
        &mut self.queue
    }
}
