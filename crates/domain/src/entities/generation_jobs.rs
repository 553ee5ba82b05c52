use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::schema::generation_jobs;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = generation_jobs)]
pub struct GenerationJobEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub status: String,
    pub mode: String,
    pub input_asset_id: Option<Uuid>,
    pub prompt: String,
    pub prompt_payload: Value,
    pub request_id: Uuid,
    pub error: Option<String>,
    pub cost_cents: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = generation_jobs)]
pub struct InsertGenerationJobEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub status: String,
    pub mode: String,
    pub input_asset_id: Option<Uuid>,
    pub prompt: String,
    pub prompt_payload: Value,
    pub request_id: Uuid,
    pub error: Option<String>,
    pub cost_cents: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
