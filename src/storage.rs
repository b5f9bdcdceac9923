//! Asset storage backends.
//!
//! Uploads, generated signatures and rendered PDFs all go through the
//! [`AssetStore`] trait. Two implementations exist: a filesystem tree under
//! the public directory, and a Supabase storage bucket driven over its REST
//! API. The backend is selected once at startup from the environment.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("storage request failed with status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

/// A stored asset: the backend-relative reference plus its public URL.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAsset {
    pub reference: String,
    pub url: String,
}

/// Contract shared by both storage backends.
///
/// `store` has overwrite semantics: repeating an identical call is
/// idempotent. `fetch` must return the bytes previously stored under the
/// same reference so the render step can re-embed images.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn store(
        &self,
        reference: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredAsset, StorageError>;

    async fn fetch(&self, reference: &str) -> Result<Vec<u8>, StorageError>;

    fn public_url(&self, reference: &str) -> String;
}

/// Guess a content type from a filename, defaulting to octet-stream.
pub fn content_type_for(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Filesystem variant: writes under `<root>/uploads/<reference>` and serves
/// back through the `/uploads` static mount.
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    /// Directory the HTTP layer mounts under `/uploads`.
    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join("uploads")
    }

    fn path_for(&self, reference: &str) -> PathBuf {
        // References are produced by this server, not by clients, but a
        // stray `..` must still never escape the uploads tree.
        let mut path = self.uploads_dir();
        for part in Path::new(reference).components().filter_map(|c| match c {
            std::path::Component::Normal(p) => Some(p),
            _ => None,
        }) {
            path.push(part);
        }
        path
    }
}

#[async_trait]
impl AssetStore for LocalStorage {
    async fn store(
        &self,
        reference: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<StoredAsset, StorageError> {
        let path = self.path_for(reference);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        log::debug!("Stored {} bytes at {}", bytes.len(), path.display());

        Ok(StoredAsset {
            reference: reference.to_string(),
            url: self.public_url(reference),
        })
    }

    async fn fetch(&self, reference: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(reference);
        Ok(tokio::fs::read(&path).await?)
    }

    fn public_url(&self, reference: &str) -> String {
        format!(
            "{}/uploads/{}",
            self.base_url.trim_end_matches('/'),
            reference
        )
    }
}

/// Bucket variant: Supabase storage REST API, public-bucket URL resolution.
pub struct SupabaseStorage {
    config: crate::config::SupabaseConfig,
    client: reqwest::Client,
}

impl SupabaseStorage {
    pub fn new(config: crate::config::SupabaseConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn object_url(&self, reference: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.config.supabase_url.trim_end_matches('/'),
            self.config.bucket_name,
            reference
        )
    }
}

#[async_trait]
impl AssetStore for SupabaseStorage {
    async fn store(
        &self,
        reference: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredAsset, StorageError> {
        let response = self
            .client
            .post(self.object_url(reference))
            .bearer_auth(&self.config.supabase_anon_key)
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        log::debug!(
            "Uploaded {} bytes to bucket '{}' as {}",
            bytes.len(),
            self.config.bucket_name,
            reference
        );

        Ok(StoredAsset {
            reference: reference.to_string(),
            url: self.public_url(reference),
        })
    }

    async fn fetch(&self, reference: &str) -> Result<Vec<u8>, StorageError> {
        let response = self.client.get(self.public_url(reference)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    fn public_url(&self, reference: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config.supabase_url.trim_end_matches('/'),
            self.config.bucket_name,
            reference
        )
    }
}
