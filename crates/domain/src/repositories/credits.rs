use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

#[automock]
#[async_trait]
pub trait CreditRepository {
    /// Missing accounts read as a zero balance.
    async fn balance(&self, user_id: Uuid) -> Result<i32>;

    /// Tops up the account and returns the new balance.
    async fn grant(&self, user_id: Uuid, amount_cents: i32) -> Result<i32>;

    /// Guarded deduction; returns false when the balance is insufficient.
    async fn deduct(&self, user_id: Uuid, amount_cents: i32) -> Result<bool>;
}
