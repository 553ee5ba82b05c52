use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

/// Object storage for product images. Reads go through time-limited signed
/// URLs so the bucket itself stays private.
#[automock]
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn upload(&self, object_key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    async fn signed_url(&self, object_key: &str, ttl_seconds: u64) -> Result<String>;

    async fn download(&self, object_key: &str) -> Result<Vec<u8>>;

    async fn delete(&self, object_key: &str) -> Result<()>;
}
