use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::projects::{InsertProjectEntity, ProjectEntity};

#[automock]
#[async_trait]
pub trait ProjectRepository {
    async fn create(&self, insert_project_entity: InsertProjectEntity) -> Result<ProjectEntity>;

    async fn find_by_id(&self, project_id: Uuid) -> Result<Option<ProjectEntity>>;

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<ProjectEntity>>;

    async fn delete(&self, project_id: Uuid) -> Result<()>;
}
