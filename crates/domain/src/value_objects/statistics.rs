use serde::Serialize;

/// Aggregate job counts for the admin dashboard. `total_cost_cents` only sums
/// succeeded jobs since cost is set on success.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct JobStatistics {
    pub queued: i64,
    pub running: i64,
    pub succeeded: i64,
    pub failed: i64,
    pub total_cost_cents: i64,
}
