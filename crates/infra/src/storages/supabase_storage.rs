use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::{
    error::{ProvideErrorMetadata, SdkError},
    presigning::PresigningConfig,
    primitives::ByteStream,
};

use domain::repositories::storage::StorageClient;

use super::s3::{S3Config, build_s3_client};

#[derive(Debug, Clone)]
pub struct SupabaseStorageConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
}

/// Product image storage on Supabase Storage, driven through its
/// S3-compatible API: https://supabase.com/docs/guides/storage/s3/compatibility
pub struct SupabaseStorageClient {
    client: aws_sdk_s3::Client,
    http: reqwest::Client,
    bucket: String,
}

impl SupabaseStorageClient {
    pub async fn new(config: SupabaseStorageConfig) -> Result<Self> {
        let client = build_s3_client(&S3Config {
            endpoint: config.endpoint,
            region: config.region,
            access_key: config.access_key,
            secret_key: config.secret_key,
            force_path_style: true,
            connect_timeout_secs: 10,
            read_timeout_secs: 60,
        })
        .await
        .context("failed to build Supabase s3 client")?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("failed to build signed-url fetch client")?;

        Ok(Self {
            client,
            http,
            bucket: config.bucket,
        })
    }
}

#[async_trait]
impl StorageClient for SupabaseStorageClient {
    async fn upload(&self, object_key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let body = ByteStream::from(bytes);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(object_key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|err| map_service_error(err, "upload object", &self.bucket, object_key))?;

        Ok(())
    }

    async fn signed_url(&self, object_key: &str, ttl_seconds: u64) -> Result<String> {
        let presigning = PresigningConfig::expires_in(Duration::from_secs(ttl_seconds))
            .context("invalid signed url ttl")?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(object_key)
            .presigned(presigning)
            .await
            .map_err(|err| map_service_error(err, "presign object", &self.bucket, object_key))?;

        Ok(request.uri().to_string())
    }

    async fn download(&self, object_key: &str) -> Result<Vec<u8>> {
        // Reads flow through a short-lived signed URL, same as any other
        // consumer of the bucket.
        let url = self.signed_url(object_key, 60).await?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("failed to fetch object via signed url")?;

        if !response.status().is_success() {
            anyhow::bail!(
                "signed url fetch returned {} [bucket={}, key={}]",
                response.status(),
                self.bucket,
                object_key
            );
        }

        let bytes = response
            .bytes()
            .await
            .context("failed to read object body")?;

        Ok(bytes.to_vec())
    }

    async fn delete(&self, object_key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(object_key)
            .send()
            .await
            .map_err(|err| map_service_error(err, "delete object", &self.bucket, object_key))?;

        Ok(())
    }
}

fn map_service_error<E>(err: SdkError<E>, action: &str, bucket: &str, object_key: &str) -> anyhow::Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    if let SdkError::ServiceError(service_err) = &err {
        let raw = service_err.raw();
        let status = raw.status().as_u16();
        let code = service_err.err().code().unwrap_or("unknown");
        let message = service_err.err().message().unwrap_or_default();
        let body = raw
            .body()
            .bytes()
            .map(|b| String::from_utf8_lossy(b).trim().to_owned())
            .filter(|b| !b.is_empty())
            .unwrap_or_default();

        let mut detail = format!(
            "failed to {} on Supabase Storage (status {}, code {})",
            action, status, code
        );

        if !message.is_empty() {
            detail.push_str(&format!(": {}", message));
        }

        detail.push_str(&format!(" [bucket={}, key={}]", bucket, object_key));

        if !body.is_empty() {
            // Keep a short preview of the response body for debugging.
            let preview = body.chars().take(512).collect::<String>();
            detail.push_str(&format!("; body={}", preview));
        }

        return anyhow::anyhow!(detail);
    }

    anyhow::Error::new(err).context(format!("failed to {} on Supabase Storage", action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use domain::repositories::storage::StorageClient;
    use uuid::Uuid;

    fn load_supabase_config_from_env() -> SupabaseStorageConfig {
        dotenvy::dotenv().ok();

        let endpoint = std::env::var("SUPABASE_S3_ENDPOINT").unwrap_or_else(|_| {
            let project_url =
                std::env::var("SUPABASE_PROJECT_URL").expect("SUPABASE_PROJECT_URL is required");
            format!("{}/storage/v1/s3", project_url.trim_end_matches('/'))
        });

        SupabaseStorageConfig {
            endpoint,
            region: std::env::var("SUPABASE_S3_REGION").expect("SUPABASE_S3_REGION is required"),
            bucket: std::env::var("SUPABASE_ASSET_BUCKET")
                .unwrap_or_else(|_| "product_assets".into()),
            access_key: std::env::var("SUPABASE_S3_ACCESS_KEY_ID")
                .expect("SUPABASE_S3_ACCESS_KEY_ID is required"),
            secret_key: std::env::var("SUPABASE_S3_SECRET_ACCESS_KEY")
                .expect("SUPABASE_S3_SECRET_ACCESS_KEY is required"),
        }
    }

    // Manual check for the signed-url lifecycle: export the Supabase S3
    // credentials, then run:
    // cargo test -p infra supabase_storage::tests::signed_url_expires -- --ignored --nocapture
    #[tokio::test]
    #[ignore = "hits real Supabase Storage and needs credentials"]
    async fn signed_url_expires() -> Result<()> {
        let client = SupabaseStorageClient::new(load_supabase_config_from_env()).await?;
        let object_key = format!("ttl-check/{}.png", Uuid::new_v4());

        // Tiny valid PNG header is enough for a storage round trip.
        let bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        client.upload(&object_key, bytes, "image/png").await?;

        let url = client.signed_url(&object_key, 2).await?;
        let fresh = reqwest::get(&url).await?;
        assert!(fresh.status().is_success());

        tokio::time::sleep(Duration::from_secs(4)).await;
        let stale = reqwest::get(&url).await?;
        assert!(!stale.status().is_success());

        client.delete(&object_key).await?;
        Ok(())
    }
}
