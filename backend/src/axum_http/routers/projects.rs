use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::axum_http::error_responses::AppError;
use crate::usecases::projects::ProjectUseCase;
use domain::{
    repositories::projects::ProjectRepository,
    value_objects::projects::InsertProjectModel,
};
use infra::postgres::{
    postgres_connection::PgPoolSquad, repositories::projects::ProjectPostgres,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let project_repository = ProjectPostgres::new(Arc::clone(&db_pool));
    let project_usecase = ProjectUseCase::new(Arc::new(project_repository));

    Router::new()
        .route("/", post(create_project))
        .route("/", get(list_projects))
        .route("/:project_id", delete(delete_project))
        .with_state(Arc::new(project_usecase))
}

pub async fn create_project<P>(
    State(project_usecase): State<Arc<ProjectUseCase<P>>>,
    auth: AuthUser,
    Json(insert_project_model): Json<InsertProjectModel>,
) -> Result<impl IntoResponse, AppError>
where
    P: ProjectRepository + Send + Sync + 'static,
{
    let project = project_usecase
        .create_project(auth.user_id, insert_project_model)
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn list_projects<P>(
    State(project_usecase): State<Arc<ProjectUseCase<P>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    P: ProjectRepository + Send + Sync + 'static,
{
    let projects = project_usecase.list_projects(auth.user_id).await?;

    Ok(Json(projects))
}

pub async fn delete_project<P>(
    State(project_usecase): State<Arc<ProjectUseCase<P>>>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    P: ProjectRepository + Send + Sync + 'static,
{
    project_usecase
        .delete_project(auth.user_id, project_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
