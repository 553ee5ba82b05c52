use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use domain::{
    repositories::generation_jobs::GenerationJobRepository,
    value_objects::generation_jobs::GenerationJobModel,
};

#[derive(Debug, Error)]
pub enum JobStatusError {
    #[error("job not found")]
    NotFound,
    #[error("job belongs to another user")]
    Forbidden,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Read-only job lookup for client polling; no transitions happen here.
pub struct JobStatusUseCase<J>
where
    J: GenerationJobRepository + Send + Sync + 'static,
{
    job_repo: Arc<J>,
}

impl<J> JobStatusUseCase<J>
where
    J: GenerationJobRepository + Send + Sync + 'static,
{
    pub fn new(job_repo: Arc<J>) -> Self {
        Self { job_repo }
    }

    pub async fn get_job(
        &self,
        caller_id: Uuid,
        job_id: Uuid,
    ) -> Result<GenerationJobModel, JobStatusError> {
        let job = self
            .job_repo
            .find_by_id(job_id)
            .await
            .map_err(|err| {
                error!(%job_id, db_error = ?err, "job_status: failed to load job");
                JobStatusError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%caller_id, %job_id, "job_status: job not found");
                JobStatusError::NotFound
            })?;

        // Ownership check happens before anything from the row is returned.
        if job.user_id != caller_id {
            warn!(%caller_id, %job_id, owner = %job.user_id, "job_status: ownership mismatch");
            return Err(JobStatusError::Forbidden);
        }

        GenerationJobModel::from_entity(job).map_err(JobStatusError::Internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::{
        entities::generation_jobs::GenerationJobEntity,
        repositories::generation_jobs::MockGenerationJobRepository,
        value_objects::enums::job_statuses::JobStatus,
    };
    use mockall::predicate::eq;

    fn sample_job(user_id: Uuid) -> GenerationJobEntity {
        let now = Utc::now();
        GenerationJobEntity {
            id: Uuid::new_v4(),
            user_id,
            project_id: Uuid::new_v4(),
            status: "succeeded".to_string(),
            mode: "lifestyle".to_string(),
            input_asset_id: Some(Uuid::new_v4()),
            prompt: "Lifestyle marketing photo".to_string(),
            prompt_payload: serde_json::json!({}),
            request_id: Uuid::new_v4(),
            error: None,
            cost_cents: 4,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn owner_reads_job() {
        let user_id = Uuid::new_v4();
        let job = sample_job(user_id);
        let job_id = job.id;

        let mut job_repo = MockGenerationJobRepository::new();
        job_repo
            .expect_find_by_id()
            .with(eq(job_id))
            .returning(move |_| {
                let job = job.clone();
                Ok(Some(job))
            });

        let usecase = JobStatusUseCase::new(Arc::new(job_repo));
        let model = usecase.get_job(user_id, job_id).await.unwrap();

        assert_eq!(model.status, JobStatus::Succeeded);
        assert_eq!(model.cost_cents, 4);
    }

    #[tokio::test]
    async fn foreign_caller_gets_forbidden_not_contents() {
        let owner = Uuid::new_v4();
        let job = sample_job(owner);
        let job_id = job.id;

        let mut job_repo = MockGenerationJobRepository::new();
        job_repo.expect_find_by_id().returning(move |_| {
            let job = job.clone();
            Ok(Some(job))
        });

        let usecase = JobStatusUseCase::new(Arc::new(job_repo));
        let err = usecase.get_job(Uuid::new_v4(), job_id).await.unwrap_err();

        assert!(matches!(err, JobStatusError::Forbidden));
    }

    #[tokio::test]
    async fn missing_job_is_not_found() {
        let mut job_repo = MockGenerationJobRepository::new();
        job_repo
            .expect_find_by_id()
            .returning(|_| Ok(None));

        let usecase = JobStatusUseCase::new(Arc::new(job_repo));
        let err = usecase
            .get_job(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, JobStatusError::NotFound));
    }
}
