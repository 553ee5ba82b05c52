use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::credit_accounts::InsertCreditAccountEntity,
    repositories::credits::CreditRepository,
    schema::credit_accounts,
};

pub struct CreditPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CreditPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CreditRepository for CreditPostgres {
    async fn balance(&self, user_id: Uuid) -> Result<i32> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let balance = credit_accounts::table
            .filter(credit_accounts::user_id.eq(user_id))
            .select(credit_accounts::balance_cents)
            .first::<i32>(&mut conn)
            .optional()?;

        Ok(balance.unwrap_or(0))
    }

    async fn grant(&self, user_id: Uuid, amount_cents: i32) -> Result<i32> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let new_balance = insert_into(credit_accounts::table)
            .values(&InsertCreditAccountEntity {
                user_id,
                balance_cents: amount_cents,
                updated_at: Utc::now(),
            })
            .on_conflict(credit_accounts::user_id)
            .do_update()
            .set((
                credit_accounts::balance_cents
                    .eq(credit_accounts::balance_cents + amount_cents),
                credit_accounts::updated_at.eq(Utc::now()),
            ))
            .returning(credit_accounts::balance_cents)
            .get_result::<i32>(&mut conn)?;

        Ok(new_balance)
    }

    async fn deduct(&self, user_id: Uuid, amount_cents: i32) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // The balance guard lives in the WHERE clause so two concurrent
        // deductions cannot drive the account negative.
        let updated = update(
            credit_accounts::table
                .filter(credit_accounts::user_id.eq(user_id))
                .filter(credit_accounts::balance_cents.ge(amount_cents)),
        )
        .set((
            credit_accounts::balance_cents.eq(credit_accounts::balance_cents - amount_cents),
            credit_accounts::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(updated > 0)
    }
}
