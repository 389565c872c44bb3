mod dynamodb;
mod error;
mod in_memory;

pub use dynamodb::DynamoMetadataStore;
pub use error::MetadataError;
pub use in_memory::InMemoryMetadataStore;

use async_trait::async_trait;

use crate::model::{ImageRecord, NewImageRecord};

#[async_trait]
pub trait MetadataStore: Send + Sync + 'static {
    /// Opens the connection and verifies the store is usable.
    async fn connect(&self) -> Result<(), MetadataError>;

    /// Persists a record, assigning its id and creation time.
    async fn insert(&self, record: NewImageRecord) -> Result<ImageRecord, MetadataError>;

    /// Every stored record, ordered by `created_at` descending.
    async fn find_all_newest_first(&self) -> Result<Vec<ImageRecord>, MetadataError>;

    /// Last known connection state. Never performs I/O.
    fn is_connected(&self) -> bool;
}
