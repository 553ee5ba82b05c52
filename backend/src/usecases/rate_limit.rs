use anyhow::Result;
use chrono::{DateTime, Duration, DurationRound, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use domain::{
    repositories::usage_counters::UsageCounterRepository,
    value_objects::{
        enums::counter_types::CounterType,
        usage::{RateLimitDecision, TierStatus},
    },
};

pub const PER_MINUTE_LIMIT: i32 = 5;
pub const PER_DAY_LIMIT: i32 = 50;

/// Two-tier generation throttle backed by per-period counter rows. The check
/// and the later increment are separate statements; concurrent requests in the
/// same period can both pass the check, which is accepted.
pub struct RateLimitUseCase<U>
where
    U: UsageCounterRepository + Send + Sync + 'static,
{
    usage_counter_repo: Arc<U>,
}

impl<U> RateLimitUseCase<U>
where
    U: UsageCounterRepository + Send + Sync + 'static,
{
    pub fn new(usage_counter_repo: Arc<U>) -> Self {
        Self { usage_counter_repo }
    }

    pub async fn check_all_rate_limits(&self, user_id: Uuid) -> RateLimitDecision {
        let now = Utc::now();
        let per_minute = self.check_tier(user_id, CounterType::PerMinute, now).await;
        let per_day = self.check_tier(user_id, CounterType::PerDay, now).await;

        // Minute tier is reported first when both are exhausted.
        let blocked_by = if per_minute.count >= per_minute.limit {
            Some(CounterType::PerMinute)
        } else if per_day.count >= per_day.limit {
            Some(CounterType::PerDay)
        } else {
            None
        };

        if let Some(tier) = blocked_by {
            debug!(
                %user_id,
                blocked_by = %tier,
                minute_count = per_minute.count,
                day_count = per_day.count,
                "rate_limit: request denied"
            );
        }

        RateLimitDecision {
            allowed: blocked_by.is_none(),
            per_minute,
            per_day,
            blocked_by,
        }
    }

    /// Called on the success path only; failed generations never count.
    pub async fn record_generation_usage(&self, user_id: Uuid) -> Result<()> {
        let now = Utc::now();

        for counter_type in [CounterType::PerMinute, CounterType::PerDay] {
            self.usage_counter_repo
                .increment(user_id, counter_type, period_start(counter_type, now))
                .await?;
        }

        Ok(())
    }

    async fn check_tier(
        &self,
        user_id: Uuid,
        counter_type: CounterType,
        now: DateTime<Utc>,
    ) -> TierStatus {
        let period = period_start(counter_type, now);
        let limit = tier_limit(counter_type);
        let reset_at = period + period_length(counter_type);

        let count = match self
            .usage_counter_repo
            .fetch_or_create(user_id, counter_type, period)
            .await
        {
            Ok(count) => count,
            Err(err) => {
                // Fail open: availability wins over strict enforcement.
                warn!(
                    %user_id,
                    counter_type = %counter_type,
                    error = ?err,
                    "rate_limit: counter read failed, allowing request"
                );
                0
            }
        };

        TierStatus {
            count,
            limit,
            reset_at,
        }
    }
}

pub fn period_start(counter_type: CounterType, now: DateTime<Utc>) -> DateTime<Utc> {
    now.duration_trunc(period_length(counter_type)).unwrap_or(now)
}

fn period_length(counter_type: CounterType) -> Duration {
    match counter_type {
        CounterType::PerMinute => Duration::minutes(1),
        CounterType::PerDay => Duration::days(1),
    }
}

fn tier_limit(counter_type: CounterType) -> i32 {
    match counter_type {
        CounterType::PerMinute => PER_MINUTE_LIMIT,
        CounterType::PerDay => PER_DAY_LIMIT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use domain::repositories::usage_counters::MockUsageCounterRepository;

    fn stub_counts(minute_count: i32, day_count: i32) -> MockUsageCounterRepository {
        let mut usage_counter_repo = MockUsageCounterRepository::new();

        usage_counter_repo
            .expect_fetch_or_create()
            .withf(|_, counter_type, _| *counter_type == CounterType::PerMinute)
            .returning(move |_, _, _| Ok(minute_count));
        usage_counter_repo
            .expect_fetch_or_create()
            .withf(|_, counter_type, _| *counter_type == CounterType::PerDay)
            .returning(move |_, _, _| Ok(day_count));

        usage_counter_repo
    }

    #[tokio::test]
    async fn allows_request_under_both_limits() {
        let usecase = RateLimitUseCase::new(Arc::new(stub_counts(PER_MINUTE_LIMIT - 1, 10)));

        let decision = usecase.check_all_rate_limits(Uuid::new_v4()).await;

        assert!(decision.allowed);
        assert_eq!(decision.blocked_by, None);
        assert_eq!(decision.per_minute.count, PER_MINUTE_LIMIT - 1);
        assert_eq!(decision.per_minute.limit, PER_MINUTE_LIMIT);
    }

    #[tokio::test]
    async fn blocks_when_minute_limit_reached() {
        let usecase = RateLimitUseCase::new(Arc::new(stub_counts(PER_MINUTE_LIMIT, 3)));

        let decision = usecase.check_all_rate_limits(Uuid::new_v4()).await;

        assert!(!decision.allowed);
        assert_eq!(decision.blocked_by, Some(CounterType::PerMinute));
    }

    #[tokio::test]
    async fn blocks_on_day_limit_with_fresh_minute() {
        let usecase = RateLimitUseCase::new(Arc::new(stub_counts(0, PER_DAY_LIMIT)));

        let decision = usecase.check_all_rate_limits(Uuid::new_v4()).await;

        assert!(!decision.allowed);
        assert_eq!(decision.blocked_by, Some(CounterType::PerDay));
    }

    #[tokio::test]
    async fn minute_tier_reported_before_day_tier() {
        let usecase =
            RateLimitUseCase::new(Arc::new(stub_counts(PER_MINUTE_LIMIT + 2, PER_DAY_LIMIT + 2)));

        let decision = usecase.check_all_rate_limits(Uuid::new_v4()).await;

        assert_eq!(decision.blocked_by, Some(CounterType::PerMinute));
    }

    #[tokio::test]
    async fn fails_open_when_counter_store_errors() {
        let mut usage_counter_repo = MockUsageCounterRepository::new();
        usage_counter_repo
            .expect_fetch_or_create()
            .returning(|_, _, _| Err(anyhow!("connection refused")));

        let usecase = RateLimitUseCase::new(Arc::new(usage_counter_repo));
        let decision = usecase.check_all_rate_limits(Uuid::new_v4()).await;

        assert!(decision.allowed);
        assert_eq!(decision.blocked_by, None);
    }

    #[tokio::test]
    async fn records_usage_on_both_tiers() {
        let user_id = Uuid::new_v4();
        let mut usage_counter_repo = MockUsageCounterRepository::new();

        usage_counter_repo
            .expect_increment()
            .withf(move |uid, counter_type, _| {
                *uid == user_id && *counter_type == CounterType::PerMinute
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        usage_counter_repo
            .expect_increment()
            .withf(move |uid, counter_type, _| {
                *uid == user_id && *counter_type == CounterType::PerDay
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let usecase = RateLimitUseCase::new(Arc::new(usage_counter_repo));
        usecase.record_generation_usage(user_id).await.unwrap();
    }

    #[test]
    fn periods_floor_to_minute_and_utc_day() {
        let now = Utc::now();

        let minute_floor = period_start(CounterType::PerMinute, now);
        assert_eq!(minute_floor.timestamp() % 60, 0);
        assert!(minute_floor <= now && now - minute_floor < Duration::minutes(1));

        let day_floor = period_start(CounterType::PerDay, now);
        assert_eq!(day_floor.timestamp() % 86_400, 0);
        assert!(day_floor <= now && now - day_floor < Duration::days(1));
    }

    #[tokio::test]
    async fn reset_is_one_period_after_the_floor() {
        let usecase = RateLimitUseCase::new(Arc::new(stub_counts(0, 0)));

        let decision = usecase.check_all_rate_limits(Uuid::new_v4()).await;

        let minute_window = decision.per_minute.reset_at
            - period_start(CounterType::PerMinute, decision.per_minute.reset_at - Duration::seconds(1));
        assert_eq!(minute_window, Duration::minutes(1));
        let day_window = decision.per_day.reset_at
            - period_start(CounterType::PerDay, decision.per_day.reset_at - Duration::seconds(1));
        assert_eq!(day_window, Duration::days(1));
    }
}
