//! Environment-sourced configuration.

use std::{env, net::SocketAddr};

use aws_config::{BehaviorVersion, Region, SdkConfig, retry::RetryConfig};
use aws_sdk_s3::config::Credentials;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_TABLE_NAME: &str = "images";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("Invalid host or port: {0}")]
    InvalidAddress(String),
    #[error("STORAGE_BACKEND must be `aws` or `memory`, got {0:?}")]
    InvalidBackend(String),
    #[error("LOG_FORMAT must be `text` or `json`, got {0:?}")]
    InvalidLogFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// S3 for objects, DynamoDB for metadata
    Aws,
    /// Both stores kept in process memory
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Settings shared by every AWS client.
#[derive(Debug, Clone)]
pub struct AwsConfig {
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl AwsConfig {
    /// Base SDK config both stores build their clients from.
    ///
    /// Static keys are used when both are set; otherwise the default AWS
    /// credential chain applies. Requests are attempted once.
    pub async fn sdk_config(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .retry_config(RetryConfig::disabled());

        if let (Some(access_key), Some(secret_key)) = (&self.access_key, &self.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "environment",
            ));
        }

        loader.load().await
    }
}

#[derive(Debug, Clone)]
pub struct ObjectStoreConfig {
    pub bucket: Option<String>,
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MetadataStoreConfig {
    /// Endpoint override for the metadata store
    pub uri: Option<String>,
    pub table_name: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: StorageBackend,
    pub aws: AwsConfig,
    pub object_store: ObjectStoreConfig,
    pub metadata_store: MetadataStoreConfig,
    pub cors_origin: String,
    pub max_upload_bytes: usize,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source. Empty values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let port = match var("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidNumber {
                name: "PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let max_upload_bytes = match var("MAX_UPLOAD_BYTES") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidNumber {
                name: "MAX_UPLOAD_BYTES",
                value,
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let backend = match var("STORAGE_BACKEND").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("aws") => StorageBackend::Aws,
            Some("memory") => StorageBackend::Memory,
            Some(other) => return Err(ConfigError::InvalidBackend(other.to_string())),
        };

        let log_format = match var("LOG_FORMAT").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(ConfigError::InvalidLogFormat(other.to_string())),
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            backend,
            aws: AwsConfig {
                region: var("S3_BUCKET_LOC").unwrap_or_else(|| DEFAULT_REGION.to_string()),
                access_key: var("S3_ACCESS_KEY"),
                secret_key: var("S3_SECRET_KEY"),
            },
            object_store: ObjectStoreConfig {
                bucket: var("S3_BUCKET_NAME"),
                endpoint_url: var("S3_ENDPOINT_URL"),
            },
            metadata_store: MetadataStoreConfig {
                uri: var("METADATA_STORE_URI"),
                table_name: var("METADATA_TABLE_NAME")
                    .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string()),
            },
            cors_origin: var("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            max_upload_bytes,
            log_format,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(format!("{}:{}", self.host, self.port)))
    }

    /// Logs which settings are present without printing their values.
    pub fn log_summary(&self) {
        let state = |value: &Option<String>| if value.is_some() { "set" } else { "missing" };

        tracing::info!(
            port = self.port,
            backend = ?self.backend,
            region = %self.aws.region,
            s3_access_key = state(&self.aws.access_key),
            s3_secret_key = state(&self.aws.secret_key),
            s3_bucket_name = state(&self.object_store.bucket),
            metadata_store_uri = state(&self.metadata_store.uri),
            metadata_table = %self.metadata_store.table_name,
            "configuration loaded"
        );

        if self.backend == StorageBackend::Aws && self.object_store.bucket.is_none() {
            tracing::warn!("S3_BUCKET_NAME is not set; uploads will fail until it is configured");
        }
    }
}
