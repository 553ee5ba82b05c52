use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    entities::assets::AssetEntity,
    value_objects::enums::{asset_kinds::AssetKind, generation_modes::GenerationMode},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub kind: AssetKind,
    pub mode: Option<GenerationMode>,
    pub source_asset_id: Option<Uuid>,
    pub prompt_version: Option<String>,
    pub storage_path: String,
    pub mime_type: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl AssetModel {
    pub fn from_entity(entity: AssetEntity) -> anyhow::Result<Self> {
        let kind = AssetKind::from_str(&entity.kind)
            .ok_or_else(|| anyhow!("unknown asset kind in row: {}", entity.kind))?;
        let mode = match entity.mode.as_deref() {
            Some(value) => Some(
                GenerationMode::from_str(value)
                    .ok_or_else(|| anyhow!("unknown generation mode in row: {}", value))?,
            ),
            None => None,
        };

        Ok(Self {
            id: entity.id,
            user_id: entity.user_id,
            project_id: entity.project_id,
            kind,
            mode,
            source_asset_id: entity.source_asset_id,
            prompt_version: entity.prompt_version,
            storage_path: entity.storage_path,
            mime_type: entity.mime_type,
            width: entity.width,
            height: entity.height,
            created_at: entity.created_at,
        })
    }
}
