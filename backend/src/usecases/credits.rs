use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use domain::repositories::credits::CreditRepository;

#[derive(Debug, Error)]
pub enum CreditError {
    #[error("grant amount must be positive")]
    InvalidAmount,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub struct CreditUseCase<C>
where
    C: CreditRepository + Send + Sync + 'static,
{
    credit_repo: Arc<C>,
}

impl<C> CreditUseCase<C>
where
    C: CreditRepository + Send + Sync + 'static,
{
    pub fn new(credit_repo: Arc<C>) -> Self {
        Self { credit_repo }
    }

    pub async fn balance(&self, user_id: Uuid) -> Result<i32, CreditError> {
        self.credit_repo.balance(user_id).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "credits: failed to load balance");
            CreditError::Internal(err)
        })
    }

    /// Service-role top-up; deductions happen only inside the generation
    /// success path.
    pub async fn grant(&self, user_id: Uuid, amount_cents: i32) -> Result<i32, CreditError> {
        if amount_cents <= 0 {
            warn!(%user_id, amount_cents, "credits: rejected non-positive grant");
            return Err(CreditError::InvalidAmount);
        }

        let new_balance = self
            .credit_repo
            .grant(user_id, amount_cents)
            .await
            .map_err(|err| {
                error!(%user_id, amount_cents, db_error = ?err, "credits: grant failed");
                CreditError::Internal(err)
            })?;

        info!(%user_id, amount_cents, new_balance, "credits: granted");
        Ok(new_balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::repositories::credits::MockCreditRepository;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn grant_rejects_non_positive_amounts() {
        let usecase = CreditUseCase::new(Arc::new(MockCreditRepository::new()));

        let err = usecase.grant(Uuid::new_v4(), 0).await.unwrap_err();
        assert!(matches!(err, CreditError::InvalidAmount));
    }

    #[tokio::test]
    async fn grant_returns_new_balance() {
        let user_id = Uuid::new_v4();

        let mut credit_repo = MockCreditRepository::new();
        credit_repo
            .expect_grant()
            .with(eq(user_id), eq(500))
            .returning(|_, amount| Ok(amount + 100));

        let usecase = CreditUseCase::new(Arc::new(credit_repo));
        let balance = usecase.grant(user_id, 500).await.unwrap();

        assert_eq!(balance, 600);
    }
}
