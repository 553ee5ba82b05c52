use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    entities::generation_jobs::{GenerationJobEntity, InsertGenerationJobEntity},
    value_objects::enums::{generation_modes::GenerationMode, job_statuses::JobStatus},
};

/// Client-facing view of a generation job, polled until a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationJobModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub status: JobStatus,
    pub mode: GenerationMode,
    pub input_asset_id: Option<Uuid>,
    pub request_id: Uuid,
    pub error: Option<String>,
    pub cost_cents: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GenerationJobModel {
    pub fn from_entity(entity: GenerationJobEntity) -> anyhow::Result<Self> {
        let status = JobStatus::from_str(&entity.status)
            .ok_or_else(|| anyhow!("unknown job status in row: {}", entity.status))?;
        let mode = GenerationMode::from_str(&entity.mode)
            .ok_or_else(|| anyhow!("unknown generation mode in row: {}", entity.mode))?;

        Ok(Self {
            id: entity.id,
            user_id: entity.user_id,
            project_id: entity.project_id,
            status,
            mode,
            input_asset_id: entity.input_asset_id,
            request_id: entity.request_id,
            error: entity.error,
            cost_cents: entity.cost_cents,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertGenerationJobModel {
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub mode: GenerationMode,
    pub input_asset_id: Uuid,
    pub prompt: String,
    pub prompt_payload: Value,
    pub request_id: Uuid,
}

impl InsertGenerationJobModel {
    pub fn to_entity(&self) -> InsertGenerationJobEntity {
        let now = Utc::now();

        InsertGenerationJobEntity {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            project_id: self.project_id,
            status: JobStatus::Queued.to_string(),
            mode: self.mode.to_string(),
            input_asset_id: Some(self.input_asset_id),
            prompt: self.prompt.clone(),
            prompt_payload: self.prompt_payload.clone(),
            request_id: self.request_id,
            error: None,
            cost_cents: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
