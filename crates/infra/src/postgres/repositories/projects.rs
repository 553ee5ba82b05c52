use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::projects::{InsertProjectEntity, ProjectEntity},
    repositories::projects::ProjectRepository,
    schema::projects,
};

pub struct ProjectPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ProjectPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ProjectRepository for ProjectPostgres {
    async fn create(&self, insert_project_entity: InsertProjectEntity) -> Result<ProjectEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(projects::table)
            .values(&insert_project_entity)
            .returning(ProjectEntity::as_returning())
            .get_result::<ProjectEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_id(&self, project_id: Uuid) -> Result<Option<ProjectEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = projects::table
            .filter(projects::id.eq(project_id))
            .select(ProjectEntity::as_select())
            .first::<ProjectEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<ProjectEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = projects::table
            .filter(projects::user_id.eq(user_id))
            .order(projects::created_at.desc())
            .select(ProjectEntity::as_select())
            .load::<ProjectEntity>(&mut conn)?;

        Ok(results)
    }

    async fn delete(&self, project_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Assets and jobs under the project go with it (FK cascade).
        delete(projects::table.filter(projects::id.eq(project_id))).execute(&mut conn)?;

        Ok(())
    }
}
