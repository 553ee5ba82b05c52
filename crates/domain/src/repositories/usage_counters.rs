use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::value_objects::enums::counter_types::CounterType;

/// Counters are keyed by `(user_id, counter_type, period_start)`; exactly one
/// row exists per key, created lazily on first touch in a period.
#[automock]
#[async_trait]
pub trait UsageCounterRepository {
    /// Returns the current count for the period, materializing a zero row if
    /// none exists yet.
    async fn fetch_or_create(
        &self,
        user_id: Uuid,
        counter_type: CounterType,
        period_start: DateTime<Utc>,
    ) -> Result<i32>;

    /// Atomic upsert increment of the period's counter.
    async fn increment(
        &self,
        user_id: Uuid,
        counter_type: CounterType,
        period_start: DateTime<Utc>,
    ) -> Result<()>;
}
