use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::{
    Client,
    error::{ProvideErrorMetadata, SdkError},
    types::AttributeValue,
};
use chrono::Utc;
use serde_dynamo::{from_items, to_item};
use uuid::Uuid;

use super::{MetadataError, MetadataStore};
use crate::aws;
use crate::config::MetadataStoreConfig;
use crate::model::{self, ImageRecord, NewImageRecord};

const TABLE_MISSING: &str = "ResourceNotFoundException";

/// DynamoDB-backed implementation of [`MetadataStore`].
///
/// Records live in a single table keyed by `id`. Listing scans the whole
/// table and sorts in memory since records carry no partition to query by.
pub struct DynamoMetadataStore {
    client: Client,
    table_name: String,
    connected: AtomicBool,
}

impl DynamoMetadataStore {
    /// Creates a store for the configured table from the shared SDK config.
    ///
    /// The connection URI, when set, overrides the DynamoDB endpoint (e.g.
    /// `http://localhost:4566` for LocalStack). No request is made until
    /// [`MetadataStore::connect`].
    pub fn new(sdk_config: &SdkConfig, config: &MetadataStoreConfig) -> Self {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);
        if let Some(uri) = &config.uri {
            tracing::debug!(%uri, "using custom metadata store endpoint");
            builder = builder.endpoint_url(uri);
        }

        Self::from_client(Client::from_conf(builder.build()), config)
    }

    pub fn from_client(client: Client, config: &MetadataStoreConfig) -> Self {
        Self {
            client,
            table_name: config.table_name.clone(),
            connected: AtomicBool::new(false),
        }
    }

    /// Updates the connection flag from the outcome of a request.
    ///
    /// A successful request marks the store connected. Transport failures and
    /// a missing table mark it disconnected; other errors leave the flag as
    /// it was.
    fn observe<T, E: ProvideErrorMetadata>(&self, result: &Result<T, SdkError<E>>) {
        let connected = match result {
            Ok(_) => true,
            Err(SdkError::DispatchFailure(_) | SdkError::TimeoutError(_)) => false,
            Err(err) if aws::error_code(err) == Some(TABLE_MISSING) => false,
            Err(_) => return,
        };

        let was_connected = self.connected.swap(connected, Ordering::Relaxed);
        if was_connected && !connected {
            tracing::warn!(table = %self.table_name, "metadata store disconnected");
        }
    }
}

#[async_trait]
impl MetadataStore for DynamoMetadataStore {
    async fn connect(&self) -> Result<(), MetadataError> {
        let result = self
            .client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await;
        self.observe(&result);

        let output = result.map_err(|e| {
            self.connected.store(false, Ordering::Relaxed);
            MetadataError::Connection(aws::error_message("dynamodb:DescribeTable", &e))
        })?;

        let status = output
            .table()
            .and_then(|table| table.table_status())
            .map(|status| status.as_str().to_string());
        tracing::info!(table = %self.table_name, ?status, "metadata store connected");
        Ok(())
    }

    async fn insert(&self, record: NewImageRecord) -> Result<ImageRecord, MetadataError> {
        let record = record.into_record(Uuid::new_v4().to_string(), Utc::now());
        let item: HashMap<String, AttributeValue> = to_item(&record)?;

        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await;
        self.observe(&result);
        result?;

        tracing::debug!(id = %record.id, "image record saved");
        Ok(record)
    }

    async fn find_all_newest_first(&self) -> Result<Vec<ImageRecord>, MetadataError> {
        let mut items = Vec::new();
        let mut start_key = None;

        loop {
            let result = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key)
                .send()
                .await;
            self.observe(&result);
            let output = result?;

            items.extend(output.items.unwrap_or_default());
            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        let mut records: Vec<ImageRecord> = from_items(items)?;
        model::sort_newest_first(&mut records);
        Ok(records)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}
