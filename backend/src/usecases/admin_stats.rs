use anyhow::Result;
use std::sync::Arc;
use tracing::error;

use domain::{
    repositories::generation_jobs::GenerationJobRepository,
    value_objects::statistics::JobStatistics,
};

/// Dashboard aggregates over every user's jobs; callers must hold the service
/// role (enforced at the router).
pub struct AdminStatsUseCase<J>
where
    J: GenerationJobRepository + Send + Sync + 'static,
{
    job_repo: Arc<J>,
}

impl<J> AdminStatsUseCase<J>
where
    J: GenerationJobRepository + Send + Sync + 'static,
{
    pub fn new(job_repo: Arc<J>) -> Self {
        Self { job_repo }
    }

    pub async fn job_statistics(&self) -> Result<JobStatistics> {
        self.job_repo.job_statistics().await.map_err(|err| {
            error!(db_error = ?err, "admin_stats: failed to aggregate jobs");
            err
        })
    }
}
