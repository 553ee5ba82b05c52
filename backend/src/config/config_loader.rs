use anyhow::Result;

use super::config_model::{
    BackendServer, Database, DotEnvyConfig, Generation, ImageApi, StorageSettings, Supabase,
};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: std::env::var("SERVER_PORT_BACKEND")
            .expect("SERVER_PORT_BACKEND is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let supabase = Supabase {
        jwt_secret: std::env::var("SUPABASE_JWT_SECRET").expect("SUPABASE_JWT_SECRET is invalid"),
    };

    Ok(DotEnvyConfig {
        backend_server,
        database: load_database()?,
        supabase,
        storage: load_storage()?,
        image_api: load_image_api()?,
        generation: load_generation()?,
    })
}

pub fn load_database() -> Result<Database> {
    dotenvy::dotenv().ok();

    Ok(Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    })
}

pub fn load_storage() -> Result<StorageSettings> {
    dotenvy::dotenv().ok();

    Ok(StorageSettings {
        endpoint: std::env::var("SUPABASE_S3_ENDPOINT").expect("SUPABASE_S3_ENDPOINT is invalid"),
        region: std::env::var("SUPABASE_S3_REGION").expect("SUPABASE_S3_REGION is invalid"),
        bucket: std::env::var("SUPABASE_ASSET_BUCKET")
            .unwrap_or_else(|_| "product_assets".to_string()),
        access_key: std::env::var("SUPABASE_S3_ACCESS_KEY_ID")
            .expect("SUPABASE_S3_ACCESS_KEY_ID is invalid"),
        secret_key: std::env::var("SUPABASE_S3_SECRET_ACCESS_KEY")
            .expect("SUPABASE_S3_SECRET_ACCESS_KEY is invalid"),
        signed_url_ttl_seconds: std::env::var("SIGNED_URL_TTL_SECONDS")
            .unwrap_or_else(|_| "600".to_string())
            .parse()?,
    })
}

pub fn load_image_api() -> Result<ImageApi> {
    dotenvy::dotenv().ok();

    Ok(ImageApi {
        endpoint: std::env::var("IMAGE_API_ENDPOINT").expect("IMAGE_API_ENDPOINT is invalid"),
        api_key: std::env::var("IMAGE_API_KEY").expect("IMAGE_API_KEY is invalid"),
        model: std::env::var("IMAGE_API_MODEL").unwrap_or_else(|_| "image-edit-1".to_string()),
    })
}

pub fn load_generation() -> Result<Generation> {
    dotenvy::dotenv().ok();

    // Pricing docs have disagreed over time; this env var is the single
    // source of truth for the per-generation cost.
    Ok(Generation {
        cost_cents: std::env::var("GENERATION_COST_CENTS")
            .unwrap_or_else(|_| "4".to_string())
            .parse()?,
    })
}
