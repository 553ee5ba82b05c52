use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use crate::auth::AuthUser;
use crate::axum_http::error_responses::AppError;
use crate::usecases::{
    generation::{GenerateRequest, GenerateResponse, GenerationUseCase, ImageEditGateway},
    rate_limit::RateLimitUseCase,
};
use domain::repositories::{
    assets::AssetRepository, credits::CreditRepository,
    generation_jobs::GenerationJobRepository, storage::StorageClient,
    usage_counters::UsageCounterRepository,
};
use infra::{
    image_api::ImageEditClient,
    postgres::{
        postgres_connection::PgPoolSquad,
        repositories::{
            assets::AssetPostgres, credits::CreditPostgres,
            generation_jobs::GenerationJobPostgres, usage_counters::UsageCounterPostgres,
        },
    },
    storages::supabase_storage::SupabaseStorageClient,
};

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    storage: Arc<SupabaseStorageClient>,
    image_client: Arc<ImageEditClient>,
    cost_cents: i32,
) -> Router {
    let job_repository = GenerationJobPostgres::new(Arc::clone(&db_pool));
    let asset_repository = AssetPostgres::new(Arc::clone(&db_pool));
    let usage_counter_repository = UsageCounterPostgres::new(Arc::clone(&db_pool));
    let credit_repository = CreditPostgres::new(Arc::clone(&db_pool));
    let rate_limiter = RateLimitUseCase::new(Arc::new(usage_counter_repository));
    let generation_usecase = GenerationUseCase::new(
        Arc::new(job_repository),
        Arc::new(asset_repository),
        Arc::new(rate_limiter),
        Arc::new(credit_repository),
        storage,
        image_client,
        cost_cents,
    );

    Router::new()
        .route("/", post(generate))
        .with_state(Arc::new(generation_usecase))
}

/// Answers 202 with the queued job; the worker picks it up from there and the
/// client polls `/jobs/{id}` until it goes terminal.
pub async fn generate<J, A, U, C, St, G>(
    State(generation_usecase): State<Arc<GenerationUseCase<J, A, U, C, St, G>>>,
    auth: AuthUser,
    Json(request): Json<GenerateRequest>,
) -> Result<impl IntoResponse, AppError>
where
    J: GenerationJobRepository + Send + Sync + 'static,
    A: AssetRepository + Send + Sync + 'static,
    U: UsageCounterRepository + Send + Sync + 'static,
    C: CreditRepository + Send + Sync + 'static,
    St: StorageClient + Send + Sync + 'static,
    G: ImageEditGateway + Send + Sync + 'static,
{
    let job = generation_usecase
        .request_generation(auth.user_id, request)
        .await?;

    Ok((StatusCode::ACCEPTED, Json(GenerateResponse { job })))
}
