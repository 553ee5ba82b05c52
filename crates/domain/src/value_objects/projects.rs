use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::projects::{InsertProjectEntity, ProjectEntity};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProjectEntity> for ProjectModel {
    fn from(entity: ProjectEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            name: entity.name,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsertProjectModel {
    pub name: String,
}

impl InsertProjectModel {
    pub fn to_entity(&self, user_id: Uuid) -> InsertProjectEntity {
        let now = Utc::now();

        InsertProjectEntity {
            id: Uuid::new_v4(),
            user_id,
            name: self.name.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}
