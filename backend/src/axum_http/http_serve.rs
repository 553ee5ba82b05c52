use crate::{
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
};
use anyhow::Result;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use infra::{
    image_api::{ImageApiConfig, ImageEditClient},
    postgres::postgres_connection::PgPoolSquad,
    storages::supabase_storage::{SupabaseStorageClient, SupabaseStorageConfig},
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let storage = Arc::new(
        SupabaseStorageClient::new(SupabaseStorageConfig {
            endpoint: config.storage.endpoint.clone(),
            region: config.storage.region.clone(),
            bucket: config.storage.bucket.clone(),
            access_key: config.storage.access_key.clone(),
            secret_key: config.storage.secret_key.clone(),
        })
        .await?,
    );

    let image_client = Arc::new(ImageEditClient::new(ImageApiConfig {
        endpoint: config.image_api.endpoint.clone(),
        api_key: config.image_api.api_key.clone(),
        model: config.image_api.model.clone(),
    })?);

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/projects",
            routers::projects::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api/v1/assets",
            routers::assets::routes(
                Arc::clone(&db_pool),
                Arc::clone(&storage),
                config.storage.signed_url_ttl_seconds,
            ),
        )
        .nest(
            "/api/v1/generate",
            routers::generation::routes(
                Arc::clone(&db_pool),
                Arc::clone(&storage),
                Arc::clone(&image_client),
                config.generation.cost_cents,
            ),
        )
        .nest("/api/v1/jobs", routers::jobs::routes(Arc::clone(&db_pool)))
        .nest(
            "/api/v1/credits",
            routers::credits::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api/v1/admin",
            routers::admin::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api/v1/storage",
            routers::storage_utils::routes(Arc::clone(&storage)),
        )
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.backend_server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
