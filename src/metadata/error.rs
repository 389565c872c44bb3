//! Error types for metadata store operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{put_item::PutItemError, scan::ScanError};
use thiserror::Error;

use crate::aws;

/// Errors raised by [`MetadataStore`](super::MetadataStore) implementations
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The store could not be reached or the table is unusable
    #[error("Metadata store connection failed: {0}")]
    Connection(String),

    /// Failed to write an image record
    #[error("Failed to save image record: {0}")]
    Put(String),

    /// Failed to read image records
    #[error("Failed to fetch image records: {0}")]
    Scan(String),

    /// A stored item could not be converted to or from an image record
    #[error("Invalid image record: {0}")]
    Serialization(String),
}

impl From<SdkError<PutItemError>> for MetadataError {
    fn from(err: SdkError<PutItemError>) -> Self {
        Self::Put(aws::error_message("dynamodb:PutItem", &err))
    }
}

impl From<SdkError<ScanError>> for MetadataError {
    fn from(err: SdkError<ScanError>) -> Self {
        Self::Scan(aws::error_message("dynamodb:Scan", &err))
    }
}

impl From<serde_dynamo::Error> for MetadataError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
