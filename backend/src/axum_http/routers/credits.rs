use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::axum_http::error_responses::AppError;
use crate::usecases::credits::CreditUseCase;
use domain::repositories::credits::CreditRepository;
use infra::postgres::{
    postgres_connection::PgPoolSquad, repositories::credits::CreditPostgres,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let credit_repository = CreditPostgres::new(Arc::clone(&db_pool));
    let credit_usecase = CreditUseCase::new(Arc::new(credit_repository));

    Router::new()
        .route("/", get(balance))
        .with_state(Arc::new(credit_usecase))
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance_cents: i32,
}

pub async fn balance<C>(
    State(credit_usecase): State<Arc<CreditUseCase<C>>>,
    auth: AuthUser,
) -> Result<Json<BalanceResponse>, AppError>
where
    C: CreditRepository + Send + Sync + 'static,
{
    let balance_cents = credit_usecase.balance(auth.user_id).await?;

    Ok(Json(BalanceResponse { balance_cents }))
}
