use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::axum_http::error_responses::AppError;
use crate::usecases::assets::{AssetUseCase, UploadedFile};
use domain::{
    repositories::{
        assets::AssetRepository, projects::ProjectRepository, storage::StorageClient,
    },
    value_objects::{assets::AssetModel, enums::generation_modes::GenerationMode},
};
use infra::{
    postgres::{
        postgres_connection::PgPoolSquad,
        repositories::{assets::AssetPostgres, projects::ProjectPostgres},
    },
    storages::supabase_storage::SupabaseStorageClient,
};

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    storage: Arc<SupabaseStorageClient>,
    signed_url_ttl_seconds: u64,
) -> Router {
    let asset_repository = AssetPostgres::new(Arc::clone(&db_pool));
    let project_repository = ProjectPostgres::new(Arc::clone(&db_pool));
    let asset_usecase = AssetUseCase::new(
        Arc::new(asset_repository),
        Arc::new(project_repository),
        storage,
        signed_url_ttl_seconds,
    );

    Router::new()
        .route("/upload", post(upload))
        .route("/:asset_id/signed-url", get(signed_url))
        .route("/:asset_id", delete(delete_asset))
        .with_state(Arc::new(asset_usecase))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub asset: AssetModel,
    pub signed_url: String,
}

#[derive(Debug, Serialize)]
pub struct SignedUrlResponse {
    pub signed_url: String,
}

pub async fn upload<A, P, St>(
    State(asset_usecase): State<Arc<AssetUseCase<A, P, St>>>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError>
where
    A: AssetRepository + Send + Sync + 'static,
    P: ProjectRepository + Send + Sync + 'static,
    St: StorageClient + Send + Sync + 'static,
{
    let mut project_id: Option<Uuid> = None;
    let mut mode: Option<GenerationMode> = None;
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Validation(format!("invalid multipart body: {}", err)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("project_id") => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| AppError::Validation(format!("invalid project_id: {}", err)))?;
                project_id = Some(
                    Uuid::parse_str(value.trim())
                        .map_err(|_| AppError::Validation("project_id must be a UUID".to_string()))?,
                );
            }
            Some("mode") => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| AppError::Validation(format!("invalid mode: {}", err)))?;
                mode = Some(GenerationMode::from_str(value.trim()).ok_or_else(|| {
                    AppError::Validation(format!("invalid generation mode: {}", value))
                })?);
            }
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|err| {
                    AppError::Validation(format!("failed to read file field: {}", err))
                })?;
                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    let project_id =
        project_id.ok_or_else(|| AppError::Validation("project_id is required".to_string()))?;
    let file = file.ok_or_else(|| AppError::Validation("file is required".to_string()))?;

    let (asset, signed_url) = asset_usecase
        .upload_input(auth.user_id, project_id, mode, file)
        .await?;

    Ok((StatusCode::CREATED, Json(UploadResponse { asset, signed_url })))
}

pub async fn signed_url<A, P, St>(
    State(asset_usecase): State<Arc<AssetUseCase<A, P, St>>>,
    auth: AuthUser,
    Path(asset_id): Path<Uuid>,
) -> Result<Json<SignedUrlResponse>, AppError>
where
    A: AssetRepository + Send + Sync + 'static,
    P: ProjectRepository + Send + Sync + 'static,
    St: StorageClient + Send + Sync + 'static,
{
    let signed_url = asset_usecase.signed_url(auth.user_id, asset_id).await?;

    Ok(Json(SignedUrlResponse { signed_url }))
}

pub async fn delete_asset<A, P, St>(
    State(asset_usecase): State<Arc<AssetUseCase<A, P, St>>>,
    auth: AuthUser,
    Path(asset_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    A: AssetRepository + Send + Sync + 'static,
    P: ProjectRepository + Send + Sync + 'static,
    St: StorageClient + Send + Sync + 'static,
{
    asset_usecase.delete_asset(auth.user_id, asset_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
