use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::axum_http::error_responses::AppError;
use domain::repositories::storage::StorageClient;
use infra::storages::supabase_storage::SupabaseStorageClient;

/// Internal testing utilities: raw bucket access for support tooling, gated
/// to the service role.
pub fn routes(storage: Arc<SupabaseStorageClient>) -> Router {
    Router::new()
        .route("/upload", post(upload_object))
        .route("/delete", post(delete_object))
        .with_state(storage)
}

#[derive(Debug, Deserialize)]
pub struct StorageUploadRequest {
    pub path: String,
    pub content_type: String,
    pub data_base64: String,
}

#[derive(Debug, Deserialize)]
pub struct StorageDeleteRequest {
    pub path: String,
}

pub async fn upload_object<St>(
    State(storage): State<Arc<St>>,
    auth: AuthUser,
    Json(request): Json<StorageUploadRequest>,
) -> Result<impl IntoResponse, AppError>
where
    St: StorageClient + Send + Sync + 'static,
{
    auth.require_service_role()?;

    let bytes = BASE64
        .decode(request.data_base64)
        .map_err(|_| AppError::Validation("data_base64 is not valid base64".to_string()))?;

    storage
        .upload(&request.path, bytes, &request.content_type)
        .await
        .map_err(AppError::Internal)?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_object<St>(
    State(storage): State<Arc<St>>,
    auth: AuthUser,
    Json(request): Json<StorageDeleteRequest>,
) -> Result<impl IntoResponse, AppError>
where
    St: StorageClient + Send + Sync + 'static,
{
    auth.require_service_role()?;

    storage.delete(&request.path).await.map_err(AppError::Internal)?;

    Ok(StatusCode::NO_CONTENT)
}
