pub mod config;
pub mod services;

use anyhow::Result;
use backend::usecases::{generation::GenerationUseCase, rate_limit::RateLimitUseCase};
use infra::{
    image_api::{ImageApiConfig, ImageEditClient},
    postgres::{
        postgres_connection,
        repositories::{
            assets::AssetPostgres, credits::CreditPostgres,
            generation_jobs::GenerationJobPostgres, usage_counters::UsageCounterPostgres,
        },
    },
    storages::supabase_storage::{SupabaseStorageClient, SupabaseStorageConfig},
};
use std::{sync::Arc, time::Duration};
use tracing::info;

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    backend::observability::init_observability("worker")?;

    let config = config::config_loader::load()?;
    info!("ENV has been loaded");

    let postgres_pool = Arc::new(postgres_connection::establish_connection(
        &config.database.url,
    )?);
    info!("Postgres connection has been established");

    let storage = Arc::new(
        SupabaseStorageClient::new(SupabaseStorageConfig {
            endpoint: config.storage.endpoint.clone(),
            region: config.storage.region.clone(),
            bucket: config.storage.bucket.clone(),
            access_key: config.storage.access_key.clone(),
            secret_key: config.storage.secret_key.clone(),
        })
        .await?,
    );

    let image_client = Arc::new(ImageEditClient::new(ImageApiConfig {
        endpoint: config.image_api.endpoint.clone(),
        api_key: config.image_api.api_key.clone(),
        model: config.image_api.model.clone(),
    })?);

    let job_repository = GenerationJobPostgres::new(Arc::clone(&postgres_pool));
    let asset_repository = AssetPostgres::new(Arc::clone(&postgres_pool));
    let usage_counter_repository = UsageCounterPostgres::new(Arc::clone(&postgres_pool));
    let credit_repository = CreditPostgres::new(Arc::clone(&postgres_pool));
    let rate_limiter = RateLimitUseCase::new(Arc::new(usage_counter_repository));

    let generation_usecase = GenerationUseCase::new(
        Arc::new(job_repository),
        Arc::new(asset_repository),
        Arc::new(rate_limiter),
        Arc::new(credit_repository),
        storage,
        image_client,
        config.generation.cost_cents,
    );

    services::worker_loop::run_worker_loop(
        Arc::new(generation_usecase),
        Duration::from_secs(config.worker.poll_interval_secs),
    )
    .await
}
