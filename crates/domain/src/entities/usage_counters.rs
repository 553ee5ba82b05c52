use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::usage_counters;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = usage_counters)]
pub struct UsageCounterEntity {
    pub id: i64,
    pub user_id: Uuid,
    pub counter_type: String,
    pub period_start: DateTime<Utc>,
    pub count: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = usage_counters)]
pub struct InsertUsageCounterEntity {
    pub user_id: Uuid,
    pub counter_type: String,
    pub period_start: DateTime<Utc>,
    pub count: i32,
}
