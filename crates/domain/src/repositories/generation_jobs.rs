use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::generation_jobs::{GenerationJobEntity, InsertGenerationJobEntity};
use crate::value_objects::statistics::JobStatistics;

/// Every status transition is a guarded update: a `false` return means the row
/// was not in the expected source state (already claimed, or terminal).
#[automock]
#[async_trait]
pub trait GenerationJobRepository {
    async fn create(
        &self,
        insert_job_entity: InsertGenerationJobEntity,
    ) -> Result<GenerationJobEntity>;

    async fn find_by_id(&self, job_id: Uuid) -> Result<Option<GenerationJobEntity>>;

    async fn find_next_queued(&self) -> Result<Option<GenerationJobEntity>>;

    async fn mark_running(&self, job_id: Uuid) -> Result<bool>;

    async fn mark_succeeded(&self, job_id: Uuid, cost_cents: i32) -> Result<bool>;

    async fn mark_failed(&self, job_id: Uuid, error: String) -> Result<bool>;

    async fn job_statistics(&self) -> Result<JobStatistics>;
}
