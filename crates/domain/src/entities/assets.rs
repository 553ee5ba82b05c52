use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::schema::assets;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = assets)]
pub struct AssetEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub kind: String,
    pub mode: Option<String>,
    pub source_asset_id: Option<Uuid>,
    pub prompt_version: Option<String>,
    pub prompt_payload: Option<Value>,
    pub storage_path: String,
    pub mime_type: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = assets)]
pub struct InsertAssetEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub kind: String,
    pub mode: Option<String>,
    pub source_asset_id: Option<Uuid>,
    pub prompt_version: Option<String>,
    pub prompt_payload: Option<Value>,
    pub storage_path: String,
    pub mime_type: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub created_at: DateTime<Utc>,
}
