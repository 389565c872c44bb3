//! Amazon S3 backed object store.

use aws_config::SdkConfig;
use aws_sdk_s3::{Client, primitives::ByteStream};

use super::*;
use crate::aws;
use crate::config::ObjectStoreConfig;

const DEFAULT_REGION: &str = "us-east-1";

pub struct S3ObjectStore {
    client: Client,
    bucket: Option<String>,
    base_url: Option<Url>,
}

impl S3ObjectStore {
    /// Builds the S3 client from the shared SDK config and the optional
    /// endpoint override.
    ///
    /// An endpoint override switches to path-style addressing, which
    /// LocalStack and MinIO expect.
    pub fn new(sdk_config: &SdkConfig, config: &ObjectStoreConfig) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            tracing::debug!(%endpoint, "using custom object store endpoint");
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::from_client(Client::from_conf(builder.build()), config)
    }

    pub fn from_client(client: Client, config: &ObjectStoreConfig) -> Self {
        let region = client
            .config()
            .region()
            .map(ToString::to_string)
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let base_url = config.bucket.as_deref().and_then(|bucket| {
            match public_base_url(bucket, &region, config.endpoint_url.as_deref()) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::error!(error = %e, "invalid object store URL");
                    None
                }
            }
        });

        Self {
            client,
            bucket: config.bucket.clone(),
            base_url,
        }
    }
}

/// URL prefix objects in `bucket` are served from.
pub fn public_base_url(
    bucket: &str,
    region: &str,
    endpoint_url: Option<&str>,
) -> Result<Url, url::ParseError> {
    match endpoint_url {
        Some(endpoint) => {
            let mut url = Url::parse(endpoint)?;
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push(bucket);
            }
            Ok(url)
        }
        None => Url::parse(&format!("https://{bucket}.s3.{region}.amazonaws.com/")),
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &Mime,
    ) -> Result<String, StorageError> {
        let (Some(bucket), Some(base_url)) = (&self.bucket, &self.base_url) else {
            return Err(StorageError::BucketNotConfigured);
        };

        let content_length = i64::try_from(bytes.len()).unwrap_or(i64::MAX);
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type.as_ref())
            .content_length(content_length)
            .metadata("fieldName", "image")
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Put(aws::error_message("s3:PutObject", &e)))?;

        Ok(object_url(base_url, key))
    }

    async fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| StorageError::ListBuckets(aws::error_message("s3:ListBuckets", &e)))?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name().map(str::to_string))
            .collect())
    }

    fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }
}
