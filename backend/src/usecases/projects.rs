use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use domain::{
    repositories::projects::ProjectRepository,
    value_objects::projects::{InsertProjectModel, ProjectModel},
};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project name is required")]
    MissingName,
    #[error("project not found")]
    NotFound,
    #[error("project belongs to another user")]
    Forbidden,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub struct ProjectUseCase<P>
where
    P: ProjectRepository + Send + Sync + 'static,
{
    project_repo: Arc<P>,
}

impl<P> ProjectUseCase<P>
where
    P: ProjectRepository + Send + Sync + 'static,
{
    pub fn new(project_repo: Arc<P>) -> Self {
        Self { project_repo }
    }

    pub async fn create_project(
        &self,
        user_id: Uuid,
        insert_project_model: InsertProjectModel,
    ) -> Result<ProjectModel, ProjectError> {
        if insert_project_model.name.trim().is_empty() {
            warn!(%user_id, "projects: missing name on create");
            return Err(ProjectError::MissingName);
        }

        let project = self
            .project_repo
            .create(insert_project_model.to_entity(user_id))
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "projects: failed to create project");
                ProjectError::Internal(err)
            })?;

        info!(%user_id, project_id = %project.id, "projects: project created");
        Ok(ProjectModel::from(project))
    }

    pub async fn list_projects(&self, user_id: Uuid) -> Result<Vec<ProjectModel>, ProjectError> {
        let projects = self.project_repo.list_by_user(user_id).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "projects: failed to list projects");
            ProjectError::Internal(err)
        })?;

        Ok(projects.into_iter().map(ProjectModel::from).collect())
    }

    /// Deleting a project cascades to its assets and jobs at the database.
    pub async fn delete_project(
        &self,
        user_id: Uuid,
        project_id: Uuid,
    ) -> Result<(), ProjectError> {
        let project = self
            .project_repo
            .find_by_id(project_id)
            .await
            .map_err(|err| {
                error!(%user_id, %project_id, db_error = ?err, "projects: failed to load project");
                ProjectError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%user_id, %project_id, "projects: project not found");
                ProjectError::NotFound
            })?;

        if project.user_id != user_id {
            warn!(%user_id, %project_id, owner = %project.user_id, "projects: ownership mismatch");
            return Err(ProjectError::Forbidden);
        }

        self.project_repo.delete(project_id).await.map_err(|err| {
            error!(%user_id, %project_id, db_error = ?err, "projects: failed to delete project");
            ProjectError::Internal(err)
        })?;

        info!(%user_id, %project_id, "projects: project deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::{
        entities::projects::{InsertProjectEntity, ProjectEntity},
        repositories::projects::MockProjectRepository,
    };

    fn project_entity_from_insert(entity: InsertProjectEntity) -> ProjectEntity {
        ProjectEntity {
            id: entity.id,
            user_id: entity.user_id,
            name: entity.name,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }

    #[tokio::test]
    async fn create_requires_a_name() {
        let usecase = ProjectUseCase::new(Arc::new(MockProjectRepository::new()));

        let err = usecase
            .create_project(
                Uuid::new_v4(),
                InsertProjectModel {
                    name: "   ".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProjectError::MissingName));
    }

    #[tokio::test]
    async fn delete_checks_ownership_first() {
        let owner = Uuid::new_v4();
        let now = Utc::now();
        let project = ProjectEntity {
            id: Uuid::new_v4(),
            user_id: owner,
            name: "Holiday shots".to_string(),
            created_at: now,
            updated_at: now,
        };
        let project_id = project.id;

        let mut project_repo = MockProjectRepository::new();
        project_repo.expect_find_by_id().returning(move |_| {
            let project = project.clone();
            Ok(Some(project))
        });

        let usecase = ProjectUseCase::new(Arc::new(project_repo));
        let err = usecase
            .delete_project(Uuid::new_v4(), project_id)
            .await
            .unwrap_err();

        assert!(matches!(err, ProjectError::Forbidden));
    }

    #[tokio::test]
    async fn create_returns_the_stored_project() {
        let user_id = Uuid::new_v4();

        let mut project_repo = MockProjectRepository::new();
        project_repo
            .expect_create()
            .withf(move |entity| entity.user_id == user_id && entity.name == "Spring catalog")
            .returning(|entity| Ok(project_entity_from_insert(entity)));

        let usecase = ProjectUseCase::new(Arc::new(project_repo));
        let project = usecase
            .create_project(
                user_id,
                InsertProjectModel {
                    name: "Spring catalog".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(project.user_id, user_id);
        assert_eq!(project.name, "Spring catalog");
    }
}
