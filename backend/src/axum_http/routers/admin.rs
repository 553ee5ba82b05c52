use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::axum_http::error_responses::AppError;
use crate::usecases::{admin_stats::AdminStatsUseCase, credits::CreditUseCase};
use domain::{
    repositories::{credits::CreditRepository, generation_jobs::GenerationJobRepository},
    value_objects::statistics::JobStatistics,
};
use infra::postgres::{
    postgres_connection::PgPoolSquad,
    repositories::{credits::CreditPostgres, generation_jobs::GenerationJobPostgres},
};

pub struct AdminState<J, C>
where
    J: GenerationJobRepository + Send + Sync + 'static,
    C: CreditRepository + Send + Sync + 'static,
{
    pub stats: AdminStatsUseCase<J>,
    pub credits: CreditUseCase<C>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let job_repository = GenerationJobPostgres::new(Arc::clone(&db_pool));
    let credit_repository = CreditPostgres::new(Arc::clone(&db_pool));
    let state = AdminState {
        stats: AdminStatsUseCase::new(Arc::new(job_repository)),
        credits: CreditUseCase::new(Arc::new(credit_repository)),
    };

    Router::new()
        .route("/statistics", get(statistics))
        .route("/credits/grant", post(grant_credits))
        .with_state(Arc::new(state))
}

#[derive(Debug, Deserialize)]
pub struct GrantCreditsRequest {
    pub user_id: Uuid,
    pub amount_cents: i32,
}

#[derive(Debug, Serialize)]
pub struct GrantCreditsResponse {
    pub user_id: Uuid,
    pub balance_cents: i32,
}

pub async fn statistics<J, C>(
    State(state): State<Arc<AdminState<J, C>>>,
    auth: AuthUser,
) -> Result<Json<JobStatistics>, AppError>
where
    J: GenerationJobRepository + Send + Sync + 'static,
    C: CreditRepository + Send + Sync + 'static,
{
    auth.require_service_role()?;

    let statistics = state.stats.job_statistics().await.map_err(AppError::Internal)?;

    Ok(Json(statistics))
}

pub async fn grant_credits<J, C>(
    State(state): State<Arc<AdminState<J, C>>>,
    auth: AuthUser,
    Json(request): Json<GrantCreditsRequest>,
) -> Result<Json<GrantCreditsResponse>, AppError>
where
    J: GenerationJobRepository + Send + Sync + 'static,
    C: CreditRepository + Send + Sync + 'static,
{
    auth.require_service_role()?;

    let balance_cents = state
        .credits
        .grant(request.user_id, request.amount_cents)
        .await?;

    Ok(Json(GrantCreditsResponse {
        user_id: request.user_id,
        balance_cents,
    }))
}
