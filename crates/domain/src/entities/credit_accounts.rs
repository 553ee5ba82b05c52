use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::credit_accounts;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = credit_accounts)]
#[diesel(primary_key(user_id))]
pub struct CreditAccountEntity {
    pub user_id: Uuid,
    pub balance_cents: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = credit_accounts)]
pub struct InsertCreditAccountEntity {
    pub user_id: Uuid,
    pub balance_cents: i32,
    pub updated_at: DateTime<Utc>,
}
