use anyhow::Context;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use std::time::Duration;

/// S3-compatible object storage used for evidence files.
#[derive(Clone)]
pub struct MinioClient {
    client: S3Client,
    bucket: String,
}

impl MinioClient {
    /// Builds the client without contacting the server.
    pub fn new(endpoint: &str, access_key: &str, secret_key: &str, bucket: &str) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "minio");

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(endpoint)
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: S3Client::from_conf(config),
            bucket: bucket.to_string(),
        }
    }

    /// Creates the bucket if the server does not have it yet.
    pub async fn ensure_bucket(&self) -> anyhow::Result<()> {
        if self.client.head_bucket().bucket(&self.bucket).send().await.is_ok() {
            return Ok(());
        }

        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .with_context(|| format!("failed to create bucket {}", self.bucket))?;

        tracing::info!(bucket = %self.bucket, "object storage bucket created");
        Ok(())
    }

    pub async fn upload(&self, key: &str, body: Vec<u8>, content_type: &str) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body.into())
            .content_type(content_type)
            .send()
            .await
            .with_context(|| format!("upload of {key} failed"))?;

        Ok(())
    }

    /// Generate a presigned URL for downloading
    pub async fn presigned_url(&self, key: &str, expires_secs: u64) -> anyhow::Result<String> {
        let presign_config = PresigningConfig::builder()
            .expires_in(Duration::from_secs(expires_secs))
            .build()
            .context("presign config error")?;

        let url = self.client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .with_context(|| format!("presigning {key} failed"))?
            .uri()
            .to_string();

        Ok(url)
    }

    pub async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("delete of {key} failed"))?;

        Ok(())
    }

    /// Deletes every key, logging failures instead of returning them.
    pub async fn delete_all(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.delete(key).await {
                tracing::warn!(key = %key, error = %e, "failed to delete stored object");
            }
        }
    }
}
