use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::axum_http::error_responses::AppError;
use crate::usecases::job_status::JobStatusUseCase;
use domain::{
    repositories::generation_jobs::GenerationJobRepository,
    value_objects::generation_jobs::GenerationJobModel,
};
use infra::postgres::{
    postgres_connection::PgPoolSquad, repositories::generation_jobs::GenerationJobPostgres,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let job_repository = GenerationJobPostgres::new(Arc::clone(&db_pool));
    let job_status_usecase = JobStatusUseCase::new(Arc::new(job_repository));

    Router::new()
        .route("/:job_id", get(get_job))
        .with_state(Arc::new(job_status_usecase))
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub job: GenerationJobModel,
}

pub async fn get_job<J>(
    State(job_status_usecase): State<Arc<JobStatusUseCase<J>>>,
    auth: AuthUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobResponse>, AppError>
where
    J: GenerationJobRepository + Send + Sync + 'static,
{
    let job = job_status_usecase.get_job(auth.user_id, job_id).await?;

    Ok(Json(JobResponse { job }))
}
