use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::assets::{AssetEntity, InsertAssetEntity},
    repositories::assets::AssetRepository,
    schema::assets,
};

pub struct AssetPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AssetPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AssetRepository for AssetPostgres {
    async fn create(&self, insert_asset_entity: InsertAssetEntity) -> Result<AssetEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(assets::table)
            .values(&insert_asset_entity)
            .returning(AssetEntity::as_returning())
            .get_result::<AssetEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_id(&self, asset_id: Uuid) -> Result<Option<AssetEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = assets::table
            .filter(assets::id.eq(asset_id))
            .select(AssetEntity::as_select())
            .first::<AssetEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn delete(&self, asset_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Dependent jobs keep their row; the FK nulls input_asset_id.
        delete(assets::table.filter(assets::id.eq(asset_id))).execute(&mut conn)?;

        Ok(())
    }
}
