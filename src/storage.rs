use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    presigning::PresigningConfig,
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::StorageConfig;

/// Presigned URLs handed to clients live this long.
pub const PRESIGN_TTL_SECS: u64 = 30 * 60;

#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String>;
}

#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    pub async fn new(cfg: &StorageConfig) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(Credentials::new(
                &cfg.access_key,
                &cfg.secret_key,
                None,
                None,
                "static",
            ))
            .endpoint_url(&cfg.endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&cfg.endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
        })
    }
}

#[async_trait]
impl StorageClient for S3Storage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .context("s3 put_object")?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .context("s3 delete_object")?;
        Ok(())
    }

    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String> {
        let req = self.client.get_object().bucket(&self.bucket).key(key);
        let presigned = req
            .presigned(PresigningConfig::expires_in(
                std::time::Duration::from_secs(seconds),
            )?)
            .await
            .context("s3 presign_get")?;
        Ok(presigned.uri().to_string())
    }
}

/// Keeps objects in process memory; used when no S3 endpoint is configured.
#[derive(Default)]
pub struct MemoryStorage {
    objects: RwLock<HashMap<String, (Bytes, String)>>,
}

impl MemoryStorage {
    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }
}

#[async_trait]
impl StorageClient for MemoryStorage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.objects
            .write()
            .await
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String> {
        if !self.contains(key).await {
            anyhow::bail!("object {key} does not exist");
        }
        Ok(format!("memory://objects/{key}?expires={seconds}"))
    }
}

pub fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

/// Object key for an uploaded image, e.g. `avatars/<owner>/<uuid>.png`.
pub fn image_key(prefix: &str, owner: Uuid, content_type: &str) -> Option<String> {
    let ext = ext_from_mime(content_type)?;
    Some(format!("{}/{}/{}.{}", prefix, owner, Uuid::new_v4(), ext))
}

/// Stored values are either object keys or absolute URLs; only keys get presigned.
pub async fn resolve_image_url(
    storage: &dyn StorageClient,
    stored: Option<String>,
) -> anyhow::Result<Option<String>> {
    match stored {
        Some(url) if url.contains("://") => Ok(Some(url)),
        Some(key) => storage
            .presign_get(&key, PRESIGN_TTL_SECS)
            .await
            .with_context(|| format!("presign url for key {}", key))
            .map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("image/heic"), Some("heic"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[test]
    fn image_key_rejects_non_images() {
        let owner = Uuid::new_v4();
        let key = image_key("avatars", owner, "image/png").unwrap();
        assert!(key.starts_with(&format!("avatars/{owner}/")));
        assert!(key.ends_with(".png"));
        assert!(image_key("avatars", owner, "text/plain").is_none());
    }

    #[tokio::test]
    async fn resolve_presigns_keys_and_passes_urls_through() {
        let storage = MemoryStorage::default();
        storage
            .put_object("a/b/c.jpg", Bytes::from_static(b"img"), "image/jpeg")
            .await
            .unwrap();

        let presigned = resolve_image_url(&storage, Some("a/b/c.jpg".into()))
            .await
            .unwrap()
            .unwrap();
        assert!(presigned.contains("a/b/c.jpg"));

        let external = resolve_image_url(&storage, Some("https://cdn.example/x.png".into()))
            .await
            .unwrap();
        assert_eq!(external.as_deref(), Some("https://cdn.example/x.png"));

        assert!(resolve_image_url(&storage, None).await.unwrap().is_none());
        assert!(resolve_image_url(&storage, Some("missing.png".into())).await.is_err());
    }
}
