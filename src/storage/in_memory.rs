use super::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Keeps objects in process memory. Used by the `memory` backend and tests.
#[derive(Clone)]
pub struct InMemoryObjectStore {
    base_url: Url,
    objects: Arc<RwLock<HashMap<String, (Bytes, Mime)>>>,
}

impl InMemoryObjectStore {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            objects: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn get(&self, key: &str) -> Option<(Bytes, Mime)> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_object(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &Mime,
    ) -> Result<String, StorageError> {
        self.objects
            .write()
            .await
            .insert(key.to_string(), (bytes, content_type.clone()));
        Ok(object_url(&self.base_url, key))
    }

    async fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.base_url.host_str().map(str::to_string).into_iter().collect())
    }

    fn bucket(&self) -> Option<&str> {
        self.base_url.host_str()
    }
}
