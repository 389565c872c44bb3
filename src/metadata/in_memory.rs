use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{MetadataError, MetadataStore};
use crate::model::{self, ImageRecord, NewImageRecord};

#[derive(Clone, Default)]
pub struct InMemoryMetadataStore {
    records: Arc<RwLock<Vec<ImageRecord>>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn connect(&self) -> Result<(), MetadataError> {
        Ok(())
    }

    async fn insert(&self, record: NewImageRecord) -> Result<ImageRecord, MetadataError> {
        let record = record.into_record(Uuid::new_v4().to_string(), Utc::now());
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn find_all_newest_first(&self) -> Result<Vec<ImageRecord>, MetadataError> {
        // Reverse insertion order first so equal timestamps list the latest insert first.
        let mut records: Vec<_> = self.records.read().await.iter().rev().cloned().collect();
        model::sort_newest_first(&mut records);
        Ok(records)
    }

    fn is_connected(&self) -> bool {
        true
    }
}
