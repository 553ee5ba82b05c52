use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use domain::{
    entities::assets::InsertAssetEntity,
    repositories::{
        assets::AssetRepository, projects::ProjectRepository, storage::StorageClient,
    },
    value_objects::{
        assets::AssetModel,
        enums::{asset_kinds::AssetKind, generation_modes::GenerationMode},
    },
};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("project not found")]
    ProjectNotFound,
    #[error("asset not found")]
    NotFound,
    #[error("resource belongs to another user")]
    Forbidden,
    #[error("unsupported image type: {0}")]
    UnsupportedMediaType(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// A file lifted out of the multipart request by the router.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

pub struct AssetUseCase<A, P, St>
where
    A: AssetRepository + Send + Sync + 'static,
    P: ProjectRepository + Send + Sync + 'static,
    St: StorageClient + Send + Sync + 'static,
{
    asset_repo: Arc<A>,
    project_repo: Arc<P>,
    storage: Arc<St>,
    signed_url_ttl_seconds: u64,
}

impl<A, P, St> AssetUseCase<A, P, St>
where
    A: AssetRepository + Send + Sync + 'static,
    P: ProjectRepository + Send + Sync + 'static,
    St: StorageClient + Send + Sync + 'static,
{
    pub fn new(
        asset_repo: Arc<A>,
        project_repo: Arc<P>,
        storage: Arc<St>,
        signed_url_ttl_seconds: u64,
    ) -> Self {
        Self {
            asset_repo,
            project_repo,
            storage,
            signed_url_ttl_seconds,
        }
    }

    /// Stores the uploaded product photo and registers it as an input asset.
    /// Returns the asset plus a signed URL the client can render immediately.
    pub async fn upload_input(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        mode: Option<GenerationMode>,
        file: UploadedFile,
    ) -> Result<(AssetModel, String), AssetError> {
        let project = self
            .project_repo
            .find_by_id(project_id)
            .await
            .map_err(|err| {
                error!(%user_id, %project_id, db_error = ?err, "assets: failed to load project");
                AssetError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%user_id, %project_id, "assets: project not found");
                AssetError::ProjectNotFound
            })?;

        if project.user_id != user_id {
            warn!(%user_id, %project_id, owner = %project.user_id, "assets: project ownership mismatch");
            return Err(AssetError::Forbidden);
        }

        let content_type = file
            .content_type
            .clone()
            .or_else(|| {
                file.file_name.as_deref().map(|name| {
                    mime_guess::from_path(name)
                        .first_or_octet_stream()
                        .essence_str()
                        .to_string()
                })
            })
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let extension = match content_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            other => {
                warn!(%user_id, %project_id, content_type = other, "assets: unsupported upload type");
                return Err(AssetError::UnsupportedMediaType(other.to_string()));
            }
        };

        let asset_id = Uuid::new_v4();
        let object_key = format!("{}/{}/{}.{}", user_id, project_id, asset_id, extension);

        info!(
            %user_id,
            %project_id,
            %asset_id,
            object_key = %object_key,
            size_bytes = file.bytes.len(),
            "assets: uploading input"
        );

        self.storage
            .upload(&object_key, file.bytes, &content_type)
            .await
            .map_err(|err| {
                error!(%user_id, %asset_id, error = ?err, "assets: storage upload failed");
                AssetError::Internal(err)
            })?;

        let entity = self
            .asset_repo
            .create(InsertAssetEntity {
                id: asset_id,
                user_id,
                project_id,
                kind: AssetKind::Input.to_string(),
                mode: mode.map(|m| m.to_string()),
                source_asset_id: None,
                prompt_version: None,
                prompt_payload: None,
                storage_path: object_key.clone(),
                mime_type: content_type,
                width: None,
                height: None,
                created_at: Utc::now(),
            })
            .await
            .map_err(|err| {
                error!(%user_id, %asset_id, db_error = ?err, "assets: failed to insert asset row");
                AssetError::Internal(err)
            })?;

        let signed_url = self
            .storage
            .signed_url(&object_key, self.signed_url_ttl_seconds)
            .await
            .map_err(AssetError::Internal)?;

        Ok((
            AssetModel::from_entity(entity).map_err(AssetError::Internal)?,
            signed_url,
        ))
    }

    pub async fn signed_url(&self, user_id: Uuid, asset_id: Uuid) -> Result<String, AssetError> {
        let asset = self.owned_asset(user_id, asset_id).await?;

        self.storage
            .signed_url(&asset.storage_path, self.signed_url_ttl_seconds)
            .await
            .map_err(AssetError::Internal)
    }

    pub async fn delete_asset(&self, user_id: Uuid, asset_id: Uuid) -> Result<(), AssetError> {
        let asset = self.owned_asset(user_id, asset_id).await?;

        self.storage
            .delete(&asset.storage_path)
            .await
            .map_err(|err| {
                error!(%user_id, %asset_id, error = ?err, "assets: storage delete failed");
                AssetError::Internal(err)
            })?;

        self.asset_repo.delete(asset_id).await.map_err(|err| {
            error!(%user_id, %asset_id, db_error = ?err, "assets: failed to delete asset row");
            AssetError::Internal(err)
        })?;

        info!(%user_id, %asset_id, "assets: asset deleted");
        Ok(())
    }

    async fn owned_asset(
        &self,
        user_id: Uuid,
        asset_id: Uuid,
    ) -> Result<domain::entities::assets::AssetEntity, AssetError> {
        let asset = self
            .asset_repo
            .find_by_id(asset_id)
            .await
            .map_err(|err| {
                error!(%user_id, %asset_id, db_error = ?err, "assets: failed to load asset");
                AssetError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%user_id, %asset_id, "assets: asset not found");
                AssetError::NotFound
            })?;

        if asset.user_id != user_id {
            warn!(%user_id, %asset_id, owner = %asset.user_id, "assets: ownership mismatch");
            return Err(AssetError::Forbidden);
        }

        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{
        entities::{
            assets::AssetEntity,
            projects::ProjectEntity,
        },
        repositories::{
            assets::MockAssetRepository, projects::MockProjectRepository,
            storage::MockStorageClient,
        },
    };

    fn sample_project(user_id: Uuid) -> ProjectEntity {
        let now = Utc::now();
        ProjectEntity {
            id: Uuid::new_v4(),
            user_id,
            name: "Spring catalog".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn asset_entity_from_insert(entity: InsertAssetEntity) -> AssetEntity {
        AssetEntity {
            id: entity.id,
            user_id: entity.user_id,
            project_id: entity.project_id,
            kind: entity.kind,
            mode: entity.mode,
            source_asset_id: entity.source_asset_id,
            prompt_version: entity.prompt_version,
            prompt_payload: entity.prompt_payload,
            storage_path: entity.storage_path,
            mime_type: entity.mime_type,
            width: entity.width,
            height: entity.height,
            created_at: entity.created_at,
        }
    }

    fn jpeg_file() -> UploadedFile {
        UploadedFile {
            file_name: Some("photo.jpg".to_string()),
            content_type: Some("image/jpeg".to_string()),
            bytes: vec![0xFF, 0xD8, 0xFF],
        }
    }

    #[tokio::test]
    async fn upload_registers_input_asset_and_signs_url() {
        let user_id = Uuid::new_v4();
        let project = sample_project(user_id);
        let project_id = project.id;

        let mut asset_repo = MockAssetRepository::new();
        let mut project_repo = MockProjectRepository::new();
        let mut storage = MockStorageClient::new();

        project_repo.expect_find_by_id().returning(move |_| {
            let project = project.clone();
            Ok(Some(project))
        });
        storage
            .expect_upload()
            .withf(|object_key, _, content_type| {
                object_key.ends_with(".jpg") && content_type == "image/jpeg"
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        asset_repo
            .expect_create()
            .withf(|entity| entity.kind == "input" && entity.source_asset_id.is_none())
            .returning(|entity| Ok(asset_entity_from_insert(entity)));
        storage
            .expect_signed_url()
            .returning(|object_key, _| {
                let url = format!("https://storage.example/{}", object_key);
                Ok(url)
            });

        let usecase = AssetUseCase::new(
            Arc::new(asset_repo),
            Arc::new(project_repo),
            Arc::new(storage),
            600,
        );

        let (asset, signed_url) = usecase
            .upload_input(user_id, project_id, None, jpeg_file())
            .await
            .unwrap();

        assert_eq!(asset.kind, AssetKind::Input);
        assert!(signed_url.contains(&asset.id.to_string()));
    }

    #[tokio::test]
    async fn upload_rejects_non_image_payloads() {
        let user_id = Uuid::new_v4();
        let project = sample_project(user_id);
        let project_id = project.id;

        let mut project_repo = MockProjectRepository::new();
        project_repo.expect_find_by_id().returning(move |_| {
            let project = project.clone();
            Ok(Some(project))
        });

        let usecase = AssetUseCase::new(
            Arc::new(MockAssetRepository::new()),
            Arc::new(project_repo),
            Arc::new(MockStorageClient::new()),
            600,
        );

        let err = usecase
            .upload_input(
                user_id,
                project_id,
                None,
                UploadedFile {
                    file_name: Some("listing.pdf".to_string()),
                    content_type: Some("application/pdf".to_string()),
                    bytes: vec![0x25, 0x50],
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AssetError::UnsupportedMediaType(t) if t == "application/pdf"));
    }

    #[tokio::test]
    async fn signed_url_denied_for_foreign_asset() {
        let owner = Uuid::new_v4();
        let asset = AssetEntity {
            id: Uuid::new_v4(),
            user_id: owner,
            project_id: Uuid::new_v4(),
            kind: "output".to_string(),
            mode: Some("main_white".to_string()),
            source_asset_id: Some(Uuid::new_v4()),
            prompt_version: Some("v1".to_string()),
            prompt_payload: None,
            storage_path: "owner/project/out.png".to_string(),
            mime_type: "image/png".to_string(),
            width: None,
            height: None,
            created_at: Utc::now(),
        };
        let asset_id = asset.id;

        let mut asset_repo = MockAssetRepository::new();
        asset_repo.expect_find_by_id().returning(move |_| {
            let asset = asset.clone();
            Ok(Some(asset))
        });

        let usecase = AssetUseCase::new(
            Arc::new(asset_repo),
            Arc::new(MockProjectRepository::new()),
            Arc::new(MockStorageClient::new()),
            600,
        );

        let err = usecase
            .signed_url(Uuid::new_v4(), asset_id)
            .await
            .unwrap_err();

        assert!(matches!(err, AssetError::Forbidden));
    }
}
