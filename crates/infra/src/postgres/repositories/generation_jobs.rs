use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, dsl::count_star, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::generation_jobs::{GenerationJobEntity, InsertGenerationJobEntity},
    repositories::generation_jobs::GenerationJobRepository,
    schema::generation_jobs,
    value_objects::{enums::job_statuses::JobStatus, statistics::JobStatistics},
};

pub struct GenerationJobPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl GenerationJobPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl GenerationJobRepository for GenerationJobPostgres {
    async fn create(
        &self,
        insert_job_entity: InsertGenerationJobEntity,
    ) -> Result<GenerationJobEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(generation_jobs::table)
            .values(&insert_job_entity)
            .returning(GenerationJobEntity::as_returning())
            .get_result::<GenerationJobEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_id(&self, job_id: Uuid) -> Result<Option<GenerationJobEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = generation_jobs::table
            .filter(generation_jobs::id.eq(job_id))
            .select(GenerationJobEntity::as_select())
            .first::<GenerationJobEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_next_queued(&self) -> Result<Option<GenerationJobEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = generation_jobs::table
            .filter(generation_jobs::status.eq(JobStatus::Queued.to_string()))
            .order(generation_jobs::created_at.asc())
            .select(GenerationJobEntity::as_select())
            .first::<GenerationJobEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn mark_running(&self, job_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Doubles as the worker's claim: only one caller wins the queued row.
        let updated = update(
            generation_jobs::table
                .filter(generation_jobs::id.eq(job_id))
                .filter(generation_jobs::status.eq(JobStatus::Queued.to_string())),
        )
        .set((
            generation_jobs::status.eq(JobStatus::Running.to_string()),
            generation_jobs::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(updated > 0)
    }

    async fn mark_succeeded(&self, job_id: Uuid, cost_cents: i32) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(
            generation_jobs::table
                .filter(generation_jobs::id.eq(job_id))
                .filter(generation_jobs::status.eq(JobStatus::Running.to_string())),
        )
        .set((
            generation_jobs::status.eq(JobStatus::Succeeded.to_string()),
            generation_jobs::cost_cents.eq(cost_cents),
            generation_jobs::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(updated > 0)
    }

    async fn mark_failed(&self, job_id: Uuid, error: String) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Guarded against terminal rows: a succeeded or failed job stays put.
        let updated = update(
            generation_jobs::table
                .filter(generation_jobs::id.eq(job_id))
                .filter(generation_jobs::status.eq_any(vec![
                    JobStatus::Queued.to_string(),
                    JobStatus::Running.to_string(),
                ])),
        )
        .set((
            generation_jobs::status.eq(JobStatus::Failed.to_string()),
            generation_jobs::error.eq(Some(error)),
            generation_jobs::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(updated > 0)
    }

    async fn job_statistics(&self) -> Result<JobStatistics> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = generation_jobs::table
            .group_by(generation_jobs::status)
            .select((generation_jobs::status, count_star()))
            .load::<(String, i64)>(&mut conn)?;

        let total_cost_cents = generation_jobs::table
            .filter(generation_jobs::status.eq(JobStatus::Succeeded.to_string()))
            .select(diesel::dsl::sum(generation_jobs::cost_cents))
            .first::<Option<i64>>(&mut conn)?
            .unwrap_or(0);

        let mut statistics = JobStatistics {
            total_cost_cents,
            ..JobStatistics::default()
        };

        for (status, count) in rows {
            match JobStatus::from_str(&status) {
                Some(JobStatus::Queued) => statistics.queued = count,
                Some(JobStatus::Running) => statistics.running = count,
                Some(JobStatus::Succeeded) => statistics.succeeded = count,
                Some(JobStatus::Failed) => statistics.failed = count,
                None => {}
            }
        }

        Ok(statistics)
    }
}
