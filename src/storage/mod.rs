mod in_memory;
mod s3;

pub use in_memory::InMemoryObjectStore;
pub use s3::S3ObjectStore;

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::Utc;
use mime::Mime;
use thiserror::Error;
use url::Url;

/// Prefix every uploaded image key starts with.
pub const IMAGE_KEY_PREFIX: &str = "images";

const DEFAULT_FILENAME: &str = "image";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Only image files are allowed")]
    InvalidContentType(Option<String>),
    #[error("Object store bucket is not configured")]
    BucketNotConfigured,
    #[error("Failed to upload object: {0}")]
    Put(String),
    #[error("Failed to list buckets: {0}")]
    ListBuckets(String),
}

/// A file part received from a multipart upload.
#[derive(Debug)]
pub struct FileData {
    pub bytes: Bytes,
    pub content_type: Option<Mime>,
    pub filename: Option<String>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Writes `bytes` under `key` and returns the URL the object is reachable at.
    async fn put_object(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &Mime,
    ) -> Result<String, StorageError>;

    /// Names of every bucket visible to the configured credentials.
    async fn list_buckets(&self) -> Result<Vec<String>, StorageError>;

    /// The bucket uploads are written to, if one is configured.
    fn bucket(&self) -> Option<&str>;
}

/// Checks the declared MIME type and writes the image under a timestamped key.
///
/// Two uploads with the same filename in the same millisecond share a key and
/// the later write wins.
pub async fn store_image(store: &dyn ObjectStore, file: FileData) -> Result<String, StorageError> {
    let content_type = match file.content_type {
        Some(mime) if mime.type_() == mime::IMAGE => mime,
        other => {
            return Err(StorageError::InvalidContentType(
                other.map(|m| m.to_string()),
            ));
        }
    };

    let key = object_key(file.filename.as_deref(), Utc::now().timestamp_millis());
    tracing::debug!(%key, size = file.bytes.len(), %content_type, "writing image");

    let location = store.put_object(&key, file.bytes, &content_type).await?;
    tracing::info!(%key, %location, "image stored");
    Ok(location)
}

/// Path separators in the filename become `_` so the key stays one segment
/// under the prefix.
pub fn object_key(filename: Option<&str>, timestamp_millis: i64) -> String {
    let filename = filename
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_FILENAME)
        .replace(['/', '\\'], "_");
    format!("{IMAGE_KEY_PREFIX}/{timestamp_millis}-{filename}")
}

/// Appends the `/`-separated key to `base`, percent-encoding each segment.
pub(crate) fn object_url(base: &Url, key: &str) -> String {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().extend(key.split('/'));
    }
    url.to_string()
}
