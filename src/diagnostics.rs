//! One-time dependency checks run before the server starts listening.
//!
//! Failures are logged and reported, never fatal: the server still starts
//! and surfaces errors per request.

use crate::metadata::MetadataStore;
use crate::storage::ObjectStore;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct StartupReport {
    /// Buckets visible to the object store credentials, if listing succeeded
    pub buckets: Option<Vec<String>>,
    pub target_bucket_found: bool,
    pub metadata_store_connected: bool,
}

pub async fn run(object_store: &dyn ObjectStore, metadata_store: &dyn MetadataStore) -> StartupReport {
    let mut report = StartupReport::default();

    match object_store.list_buckets().await {
        Ok(buckets) => {
            tracing::info!(count = buckets.len(), "object store reachable");
            for bucket in &buckets {
                tracing::info!(%bucket, "available bucket");
            }

            match object_store.bucket() {
                Some(target) if buckets.iter().any(|b| b == target) => {
                    tracing::info!(bucket = %target, "target bucket exists");
                    report.target_bucket_found = true;
                }
                Some(target) => tracing::error!(bucket = %target, "target bucket not found"),
                None => tracing::error!("no target bucket configured"),
            }
            report.buckets = Some(buckets);
        }
        Err(e) => tracing::error!(error = %e, "object store connection failed"),
    }

    match metadata_store.connect().await {
        Ok(()) => {
            tracing::info!("metadata store connected");
            report.metadata_store_connected = true;
        }
        Err(e) => tracing::error!(error = %e, "metadata store connection failed"),
    }

    report
}
