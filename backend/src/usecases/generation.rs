use anyhow::{Result as AnyResult, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use domain::{
    entities::{assets::InsertAssetEntity, generation_jobs::GenerationJobEntity},
    repositories::{
        assets::AssetRepository, credits::CreditRepository,
        generation_jobs::GenerationJobRepository, storage::StorageClient,
        usage_counters::UsageCounterRepository,
    },
    value_objects::{
        enums::{
            asset_kinds::AssetKind, counter_types::CounterType,
            generation_modes::GenerationMode,
        },
        generation_jobs::{GenerationJobModel, InsertGenerationJobModel},
        prompts::{GenerationInputs, PromptPayload},
    },
};
use infra::image_api::ImageEditClient;

use crate::usecases::{prompt_builder, rate_limit::RateLimitUseCase};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageEditGateway: Send + Sync {
    async fn edit(&self, image: Vec<u8>, mime_type: &str, prompt: &str) -> AnyResult<Vec<u8>>;
}

#[async_trait]
impl ImageEditGateway for ImageEditClient {
    async fn edit(&self, image: Vec<u8>, mime_type: &str, prompt: &str) -> AnyResult<Vec<u8>> {
        ImageEditClient::edit(self, image, mime_type, prompt).await
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid generation mode: {0}")]
    InvalidMode(String),
    #[error("product_description is required")]
    MissingDescription,
    #[error("input asset not found")]
    InputAssetNotFound,
    #[error("input asset belongs to another user")]
    NotOwner,
    #[error("asset is not an uploaded input")]
    NotAnInput,
    #[error("insufficient credit balance")]
    InsufficientCredits,
    #[error("generation rate limit exceeded")]
    RateLimited {
        blocked_by: CounterType,
        reset_at: DateTime<Utc>,
    },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub input_asset_id: Uuid,
    pub mode: String,
    #[serde(flatten)]
    pub inputs: GenerationInputs,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub job: GenerationJobModel,
}

/// Drives a job through `queued -> running -> succeeded | failed`. The request
/// half runs in the HTTP handler and only enqueues; the processing half runs
/// in the worker and owns the single outbound image call.
pub struct GenerationUseCase<J, A, U, C, St, G>
where
    J: GenerationJobRepository + Send + Sync + 'static,
    A: AssetRepository + Send + Sync + 'static,
    U: UsageCounterRepository + Send + Sync + 'static,
    C: CreditRepository + Send + Sync + 'static,
    St: StorageClient + Send + Sync + 'static,
    G: ImageEditGateway + Send + Sync + 'static,
{
    job_repo: Arc<J>,
    asset_repo: Arc<A>,
    rate_limiter: Arc<RateLimitUseCase<U>>,
    credit_repo: Arc<C>,
    storage: Arc<St>,
    image_gateway: Arc<G>,
    cost_cents: i32,
}

impl<J, A, U, C, St, G> GenerationUseCase<J, A, U, C, St, G>
where
    J: GenerationJobRepository + Send + Sync + 'static,
    A: AssetRepository + Send + Sync + 'static,
    U: UsageCounterRepository + Send + Sync + 'static,
    C: CreditRepository + Send + Sync + 'static,
    St: StorageClient + Send + Sync + 'static,
    G: ImageEditGateway + Send + Sync + 'static,
{
    pub fn new(
        job_repo: Arc<J>,
        asset_repo: Arc<A>,
        rate_limiter: Arc<RateLimitUseCase<U>>,
        credit_repo: Arc<C>,
        storage: Arc<St>,
        image_gateway: Arc<G>,
        cost_cents: i32,
    ) -> Self {
        Self {
            job_repo,
            asset_repo,
            rate_limiter,
            credit_repo,
            storage,
            image_gateway,
            cost_cents,
        }
    }

    /// Validates the request, checks credits and rate limits, builds the
    /// prompt, and enqueues the job. Returns the queued job for the caller's
    /// 202-style response.
    pub async fn request_generation(
        &self,
        user_id: Uuid,
        request: GenerateRequest,
    ) -> Result<GenerationJobModel, GenerationError> {
        let request_id = Uuid::new_v4();
        info!(
            %user_id,
            %request_id,
            input_asset_id = %request.input_asset_id,
            mode = %request.mode,
            "generation: request received"
        );

        let mode = GenerationMode::from_str(&request.mode).ok_or_else(|| {
            warn!(%user_id, %request_id, mode = %request.mode, "generation: invalid mode");
            GenerationError::InvalidMode(request.mode.clone())
        })?;

        if request.inputs.product_description.trim().is_empty() {
            warn!(%user_id, %request_id, "generation: missing product description");
            return Err(GenerationError::MissingDescription);
        }

        let asset = self
            .asset_repo
            .find_by_id(request.input_asset_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %request_id,
                    db_error = ?err,
                    "generation: failed to load input asset"
                );
                GenerationError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(
                    %user_id,
                    %request_id,
                    input_asset_id = %request.input_asset_id,
                    "generation: input asset not found"
                );
                GenerationError::InputAssetNotFound
            })?;

        if asset.user_id != user_id {
            warn!(
                %user_id,
                %request_id,
                asset_owner = %asset.user_id,
                "generation: input asset owned by another user"
            );
            return Err(GenerationError::NotOwner);
        }

        match AssetKind::from_str(&asset.kind) {
            Some(AssetKind::Input) => {}
            Some(AssetKind::Output) | None => {
                warn!(
                    %user_id,
                    %request_id,
                    kind = %asset.kind,
                    "generation: asset is not an uploaded input"
                );
                return Err(GenerationError::NotAnInput);
            }
        }

        let balance = self.credit_repo.balance(user_id).await.map_err(|err| {
            error!(
                %user_id,
                %request_id,
                db_error = ?err,
                "generation: failed to load credit balance"
            );
            GenerationError::Internal(err)
        })?;
        if balance < self.cost_cents {
            warn!(
                %user_id,
                %request_id,
                balance,
                cost_cents = self.cost_cents,
                "generation: insufficient credits"
            );
            return Err(GenerationError::InsufficientCredits);
        }

        let decision = self.rate_limiter.check_all_rate_limits(user_id).await;
        if !decision.allowed {
            let blocked_by = decision.blocked_by.unwrap_or(CounterType::PerMinute);
            let reset_at = match blocked_by {
                CounterType::PerMinute => decision.per_minute.reset_at,
                CounterType::PerDay => decision.per_day.reset_at,
            };
            warn!(
                %user_id,
                %request_id,
                blocked_by = %blocked_by,
                %reset_at,
                "generation: rate limited"
            );
            return Err(GenerationError::RateLimited {
                blocked_by,
                reset_at,
            });
        }

        let built = prompt_builder::build_prompt(mode, &request.inputs);
        let prompt_payload = serde_json::to_value(&built.payload)
            .map_err(|err| GenerationError::Internal(err.into()))?;

        let job = self
            .job_repo
            .create(
                InsertGenerationJobModel {
                    user_id,
                    project_id: asset.project_id,
                    mode,
                    input_asset_id: asset.id,
                    prompt: built.prompt,
                    prompt_payload,
                    request_id,
                }
                .to_entity(),
            )
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %request_id,
                    db_error = ?err,
                    "generation: failed to enqueue job"
                );
                GenerationError::Internal(err)
            })?;

        info!(%user_id, %request_id, job_id = %job.id, "generation: job enqueued");

        GenerationJobModel::from_entity(job).map_err(GenerationError::Internal)
    }

    /// Worker entry point: claims and processes the oldest queued job.
    /// Returns false when the queue is empty.
    pub async fn process_next_job(&self) -> AnyResult<bool> {
        let Some(job) = self.job_repo.find_next_queued().await? else {
            return Ok(false);
        };

        self.process_job(job).await?;
        Ok(true)
    }

    pub async fn process_job(&self, job: GenerationJobEntity) -> AnyResult<()> {
        let claimed = self.job_repo.mark_running(job.id).await?;
        if !claimed {
            // Another worker won the row, or the job already reached a
            // terminal status.
            info!(job_id = %job.id, "generation: job not claimable, skipping");
            return Ok(());
        }

        info!(
            job_id = %job.id,
            user_id = %job.user_id,
            request_id = %job.request_id,
            mode = %job.mode,
            "generation: job running"
        );

        match self.run_generation(&job).await {
            Ok(output_asset_id) => {
                info!(
                    job_id = %job.id,
                    request_id = %job.request_id,
                    %output_asset_id,
                    "generation: job succeeded"
                );
            }
            Err(err) => {
                error!(
                    job_id = %job.id,
                    request_id = %job.request_id,
                    error = ?err,
                    "generation: job failed"
                );

                let marked = self
                    .job_repo
                    .mark_failed(job.id, failure_payload(&job, &err))
                    .await?;
                if !marked {
                    warn!(job_id = %job.id, "generation: failed job was already terminal");
                }
            }
        }

        Ok(())
    }

    async fn run_generation(&self, job: &GenerationJobEntity) -> AnyResult<Uuid> {
        let input_asset_id = job
            .input_asset_id
            .ok_or_else(|| anyhow!("input asset was deleted before processing"))?;

        let asset = self
            .asset_repo
            .find_by_id(input_asset_id)
            .await?
            .ok_or_else(|| anyhow!("input asset row no longer exists"))?;

        let input_bytes = self.storage.download(&asset.storage_path).await?;

        // The long pole: one outbound call, no internal retry. Provider
        // rate-limit and quota failures terminate the job as failed.
        let output_bytes = self
            .image_gateway
            .edit(input_bytes, &asset.mime_type, &job.prompt)
            .await?;

        let output_asset_id = Uuid::new_v4();
        let object_key = format!("{}/{}/{}.png", job.user_id, job.project_id, output_asset_id);
        self.storage
            .upload(&object_key, output_bytes, "image/png")
            .await?;

        let prompt_version = serde_json::from_value::<PromptPayload>(job.prompt_payload.clone())
            .ok()
            .map(|payload| payload.prompt_version);

        self.asset_repo
            .create(InsertAssetEntity {
                id: output_asset_id,
                user_id: job.user_id,
                project_id: job.project_id,
                kind: AssetKind::Output.to_string(),
                mode: Some(job.mode.clone()),
                source_asset_id: Some(asset.id),
                prompt_version,
                prompt_payload: Some(job.prompt_payload.clone()),
                storage_path: object_key,
                mime_type: "image/png".to_string(),
                width: None,
                height: None,
                created_at: Utc::now(),
            })
            .await?;

        // Credits and usage counters move on success only; a failed
        // generation costs the seller nothing.
        let deducted = self.credit_repo.deduct(job.user_id, self.cost_cents).await?;
        if !deducted {
            warn!(
                job_id = %job.id,
                user_id = %job.user_id,
                "generation: balance fell below cost after enqueue"
            );
        }

        if let Err(err) = self.rate_limiter.record_generation_usage(job.user_id).await {
            warn!(
                job_id = %job.id,
                user_id = %job.user_id,
                error = ?err,
                "generation: failed to record usage counters"
            );
        }

        let completed = self
            .job_repo
            .mark_succeeded(job.id, self.cost_cents)
            .await?;
        if !completed {
            warn!(job_id = %job.id, "generation: succeeded job was no longer running");
        }

        Ok(output_asset_id)
    }
}

fn failure_payload(job: &GenerationJobEntity, err: &anyhow::Error) -> String {
    // The error chain can carry provider response bodies; cap it before
    // persisting.
    let detail: String = format!("{:#}", err).chars().take(2000).collect();

    serde_json::json!({
        "message": err.to_string(),
        "detail": detail,
        "mode": job.mode,
        "user_id": job.user_id,
        "job_id": job.id,
        "request_id": job.request_id,
        "occurred_at": Utc::now(),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{
        entities::assets::AssetEntity,
        entities::generation_jobs::InsertGenerationJobEntity,
        repositories::{
            assets::MockAssetRepository, credits::MockCreditRepository,
            generation_jobs::MockGenerationJobRepository, storage::MockStorageClient,
            usage_counters::MockUsageCounterRepository,
        },
        value_objects::enums::job_statuses::JobStatus,
    };
    use mockall::predicate::eq;

    const COST_CENTS: i32 = 4;

    type TestUseCase = GenerationUseCase<
        MockGenerationJobRepository,
        MockAssetRepository,
        MockUsageCounterRepository,
        MockCreditRepository,
        MockStorageClient,
        MockImageEditGateway,
    >;

    struct Mocks {
        job_repo: MockGenerationJobRepository,
        asset_repo: MockAssetRepository,
        usage_counter_repo: MockUsageCounterRepository,
        credit_repo: MockCreditRepository,
        storage: MockStorageClient,
        image_gateway: MockImageEditGateway,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                job_repo: MockGenerationJobRepository::new(),
                asset_repo: MockAssetRepository::new(),
                usage_counter_repo: MockUsageCounterRepository::new(),
                credit_repo: MockCreditRepository::new(),
                storage: MockStorageClient::new(),
                image_gateway: MockImageEditGateway::new(),
            }
        }

        fn into_usecase(self) -> TestUseCase {
            GenerationUseCase::new(
                Arc::new(self.job_repo),
                Arc::new(self.asset_repo),
                Arc::new(RateLimitUseCase::new(Arc::new(self.usage_counter_repo))),
                Arc::new(self.credit_repo),
                Arc::new(self.storage),
                Arc::new(self.image_gateway),
                COST_CENTS,
            )
        }
    }

    fn input_asset(user_id: Uuid) -> AssetEntity {
        AssetEntity {
            id: Uuid::new_v4(),
            user_id,
            project_id: Uuid::new_v4(),
            kind: "input".to_string(),
            mode: None,
            source_asset_id: None,
            prompt_version: None,
            prompt_payload: None,
            storage_path: format!("{}/input.jpg", user_id),
            mime_type: "image/jpeg".to_string(),
            width: Some(1024),
            height: Some(1024),
            created_at: Utc::now(),
        }
    }

    fn queued_job(user_id: Uuid, input_asset_id: Uuid) -> GenerationJobEntity {
        let now = Utc::now();
        GenerationJobEntity {
            id: Uuid::new_v4(),
            user_id,
            project_id: Uuid::new_v4(),
            status: JobStatus::Queued.to_string(),
            mode: "main_white".to_string(),
            input_asset_id: Some(input_asset_id),
            prompt: "Professional e-commerce product photo".to_string(),
            prompt_payload: serde_json::json!({}),
            request_id: Uuid::new_v4(),
            error: None,
            cost_cents: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn job_entity_from_insert(entity: InsertGenerationJobEntity) -> GenerationJobEntity {
        GenerationJobEntity {
            id: entity.id,
            user_id: entity.user_id,
            project_id: entity.project_id,
            status: entity.status,
            mode: entity.mode,
            input_asset_id: entity.input_asset_id,
            prompt: entity.prompt,
            prompt_payload: entity.prompt_payload,
            request_id: entity.request_id,
            error: entity.error,
            cost_cents: entity.cost_cents,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }

    fn asset_entity_from_insert(entity: InsertAssetEntity) -> AssetEntity {
        AssetEntity {
            id: entity.id,
            user_id: entity.user_id,
            project_id: entity.project_id,
            kind: entity.kind,
            mode: entity.mode,
            source_asset_id: entity.source_asset_id,
            prompt_version: entity.prompt_version,
            prompt_payload: entity.prompt_payload,
            storage_path: entity.storage_path,
            mime_type: entity.mime_type,
            width: entity.width,
            height: entity.height,
            created_at: entity.created_at,
        }
    }

    fn generate_request(input_asset_id: Uuid, mode: &str) -> GenerateRequest {
        GenerateRequest {
            input_asset_id,
            mode: mode.to_string(),
            inputs: GenerationInputs {
                product_description: "wireless headphones".to_string(),
                ..GenerationInputs::default()
            },
        }
    }

    fn allow_rate_limits(mocks: &mut Mocks) {
        mocks
            .usage_counter_repo
            .expect_fetch_or_create()
            .returning(|_, _, _| Ok(0));
    }

    #[tokio::test]
    async fn request_enqueues_job_in_queued_status() {
        let user_id = Uuid::new_v4();
        let asset = input_asset(user_id);
        let asset_id = asset.id;

        let mut mocks = Mocks::new();
        allow_rate_limits(&mut mocks);
        mocks
            .asset_repo
            .expect_find_by_id()
            .with(eq(asset_id))
            .returning(move |_| {
                let asset = asset.clone();
                Ok(Some(asset))
            });
        mocks
            .credit_repo
            .expect_balance()
            .with(eq(user_id))
            .returning(|_| Ok(100));
        mocks
            .job_repo
            .expect_create()
            .times(1)
            .withf(move |entity| {
                entity.status == "queued"
                    && entity.input_asset_id == Some(asset_id)
                    && entity.cost_cents == 0
                    && entity.prompt.contains("pure white background")
            })
            .returning(|entity| Ok(job_entity_from_insert(entity)));

        let job = mocks
            .into_usecase()
            .request_generation(user_id, generate_request(asset_id, "main_white"))
            .await
            .unwrap();

        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.mode, GenerationMode::MainWhite);
        assert_eq!(job.input_asset_id, Some(asset_id));
        assert_eq!(job.cost_cents, 0);
    }

    #[tokio::test]
    async fn request_rejects_unknown_mode() {
        let err = Mocks::new()
            .into_usecase()
            .request_generation(Uuid::new_v4(), generate_request(Uuid::new_v4(), "hero_shot"))
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::InvalidMode(mode) if mode == "hero_shot"));
    }

    #[tokio::test]
    async fn request_rejects_foreign_asset_without_leaking_it() {
        let owner = Uuid::new_v4();
        let caller = Uuid::new_v4();
        let asset = input_asset(owner);
        let asset_id = asset.id;

        let mut mocks = Mocks::new();
        mocks
            .asset_repo
            .expect_find_by_id()
            .returning(move |_| {
                let asset = asset.clone();
                Ok(Some(asset))
            });

        let err = mocks
            .into_usecase()
            .request_generation(caller, generate_request(asset_id, "lifestyle"))
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::NotOwner));
    }

    #[tokio::test]
    async fn request_requires_credit_balance() {
        let user_id = Uuid::new_v4();
        let asset = input_asset(user_id);
        let asset_id = asset.id;

        let mut mocks = Mocks::new();
        mocks
            .asset_repo
            .expect_find_by_id()
            .returning(move |_| {
                let asset = asset.clone();
                Ok(Some(asset))
            });
        mocks
            .credit_repo
            .expect_balance()
            .returning(|_| Ok(COST_CENTS - 1));

        let err = mocks
            .into_usecase()
            .request_generation(user_id, generate_request(asset_id, "main_white"))
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::InsufficientCredits));
    }

    #[tokio::test]
    async fn request_denied_when_minute_window_is_spent() {
        let user_id = Uuid::new_v4();
        let asset = input_asset(user_id);
        let asset_id = asset.id;

        let mut mocks = Mocks::new();
        mocks
            .asset_repo
            .expect_find_by_id()
            .returning(move |_| {
                let asset = asset.clone();
                Ok(Some(asset))
            });
        mocks
            .credit_repo
            .expect_balance()
            .returning(|_| Ok(100));
        mocks
            .usage_counter_repo
            .expect_fetch_or_create()
            .withf(|_, counter_type, _| *counter_type == CounterType::PerMinute)
            .returning(|_, _, _| Ok(crate::usecases::rate_limit::PER_MINUTE_LIMIT));
        mocks
            .usage_counter_repo
            .expect_fetch_or_create()
            .withf(|_, counter_type, _| *counter_type == CounterType::PerDay)
            .returning(|_, _, _| Ok(2));

        let err = mocks
            .into_usecase()
            .request_generation(user_id, generate_request(asset_id, "main_white"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GenerationError::RateLimited {
                blocked_by: CounterType::PerMinute,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn processing_creates_one_linked_output_and_consumes_usage() {
        let user_id = Uuid::new_v4();
        let asset = input_asset(user_id);
        let input_asset_id = asset.id;
        let job = queued_job(user_id, input_asset_id);
        let job_id = job.id;

        let mut mocks = Mocks::new();
        mocks
            .job_repo
            .expect_mark_running()
            .with(eq(job_id))
            .times(1)
            .returning(|_| Ok(true));
        mocks
            .asset_repo
            .expect_find_by_id()
            .with(eq(input_asset_id))
            .returning(move |_| {
                let asset = asset.clone();
                Ok(Some(asset))
            });
        mocks
            .storage
            .expect_download()
            .returning(|_| Ok(vec![1, 2, 3]));
        mocks
            .image_gateway
            .expect_edit()
            .times(1)
            .returning(|_, _, _| Ok(vec![9, 9, 9]));
        mocks
            .storage
            .expect_upload()
            .withf(|object_key, _, content_type| {
                object_key.ends_with(".png") && content_type == "image/png"
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        mocks
            .asset_repo
            .expect_create()
            .times(1)
            .withf(move |entity| {
                entity.kind == "output"
                    && entity.source_asset_id == Some(input_asset_id)
                    && entity.mode.as_deref() == Some("main_white")
            })
            .returning(|entity| Ok(asset_entity_from_insert(entity)));
        mocks
            .credit_repo
            .expect_deduct()
            .with(eq(user_id), eq(COST_CENTS))
            .times(1)
            .returning(|_, _| Ok(true));
        mocks
            .usage_counter_repo
            .expect_increment()
            .times(2)
            .returning(|_, _, _| Ok(()));
        mocks
            .job_repo
            .expect_mark_succeeded()
            .with(eq(job_id), eq(COST_CENTS))
            .times(1)
            .returning(|_, _| Ok(true));

        mocks.into_usecase().process_job(job).await.unwrap();
    }

    #[tokio::test]
    async fn provider_failure_marks_job_failed_without_spending_anything() {
        let user_id = Uuid::new_v4();
        let asset = input_asset(user_id);
        let input_asset_id = asset.id;
        let job = queued_job(user_id, input_asset_id);
        let job_id = job.id;
        let request_id = job.request_id;

        let mut mocks = Mocks::new();
        mocks
            .job_repo
            .expect_mark_running()
            .returning(|_| Ok(true));
        mocks
            .asset_repo
            .expect_find_by_id()
            .returning(move |_| {
                let asset = asset.clone();
                Ok(Some(asset))
            });
        mocks
            .storage
            .expect_download()
            .returning(|_| Ok(vec![1, 2, 3]));
        mocks
            .image_gateway
            .expect_edit()
            .returning(|_, _, _| Err(anyhow!("image api returned 429: quota exhausted")));
        // No deduct, increment, upload, or mark_succeeded expectations: any
        // spend on the failure path panics the mock.
        mocks
            .job_repo
            .expect_mark_failed()
            .withf(move |id, error| {
                *id == job_id
                    && error.contains("quota exhausted")
                    && error.contains(&request_id.to_string())
            })
            .times(1)
            .returning(|_, _| Ok(true));

        mocks.into_usecase().process_job(job).await.unwrap();
    }

    #[tokio::test]
    async fn lost_claim_is_a_no_op() {
        let job = queued_job(Uuid::new_v4(), Uuid::new_v4());

        let mut mocks = Mocks::new();
        mocks
            .job_repo
            .expect_mark_running()
            .returning(|_| Ok(false));

        mocks.into_usecase().process_job(job).await.unwrap();
    }
}
