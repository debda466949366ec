use std::sync::Arc;

use rightsplace_shared::clients::db::create_pool;
use rightsplace_shared::clients::minio::MinioClient;
use rightsplace_shared::middleware::{init_metrics, init_tracing};
use rightsplace_web::config::AppConfig;
use rightsplace_web::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("rightsplace-web");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = create_pool(&config.database_url, config.db_pool_size)?;

    let storage = MinioClient::new(
        &config.minio_endpoint,
        &config.minio_access_key,
        &config.minio_secret_key,
        &config.minio_bucket,
    );
    storage.ensure_bucket().await?;

    let metrics = init_metrics()?;

    let state = Arc::new(AppState { db, config, storage, metrics });
    let app = router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "rightsplace-web starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
