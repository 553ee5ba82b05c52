use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::usage_counters::InsertUsageCounterEntity,
    repositories::usage_counters::UsageCounterRepository,
    schema::usage_counters,
    value_objects::enums::counter_types::CounterType,
};

pub struct UsageCounterPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UsageCounterPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UsageCounterRepository for UsageCounterPostgres {
    async fn fetch_or_create(
        &self,
        user_id: Uuid,
        counter_type: CounterType,
        period_start: DateTime<Utc>,
    ) -> Result<i32> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        insert_into(usage_counters::table)
            .values(&InsertUsageCounterEntity {
                user_id,
                counter_type: counter_type.to_string(),
                period_start,
                count: 0,
            })
            .on_conflict((
                usage_counters::user_id,
                usage_counters::counter_type,
                usage_counters::period_start,
            ))
            .do_nothing()
            .execute(&mut conn)?;

        let current = usage_counters::table
            .filter(usage_counters::user_id.eq(user_id))
            .filter(usage_counters::counter_type.eq(counter_type.to_string()))
            .filter(usage_counters::period_start.eq(period_start))
            .select(usage_counters::count)
            .first::<i32>(&mut conn)?;

        Ok(current)
    }

    async fn increment(
        &self,
        user_id: Uuid,
        counter_type: CounterType,
        period_start: DateTime<Utc>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Single-statement upsert: concurrent increments in the same period
        // cannot lose updates.
        insert_into(usage_counters::table)
            .values(&InsertUsageCounterEntity {
                user_id,
                counter_type: counter_type.to_string(),
                period_start,
                count: 1,
            })
            .on_conflict((
                usage_counters::user_id,
                usage_counters::counter_type,
                usage_counters::period_start,
            ))
            .do_update()
            .set(usage_counters::count.eq(usage_counters::count + 1))
            .execute(&mut conn)?;

        Ok(())
    }
}
