use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::value_objects::enums::counter_types::CounterType;

/// Snapshot of one usage tier at check time. `reset_at` is derived from the
/// period start and is only used for user-facing messaging.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TierStatus {
    pub count: i32,
    pub limit: i32,
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub per_minute: TierStatus,
    pub per_day: TierStatus,
    pub blocked_by: Option<CounterType>,
}
