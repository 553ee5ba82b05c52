use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::assets::{AssetEntity, InsertAssetEntity};

#[automock]
#[async_trait]
pub trait AssetRepository {
    async fn create(&self, insert_asset_entity: InsertAssetEntity) -> Result<AssetEntity>;

    async fn find_by_id(&self, asset_id: Uuid) -> Result<Option<AssetEntity>>;

    async fn delete(&self, asset_id: Uuid) -> Result<()>;
}
