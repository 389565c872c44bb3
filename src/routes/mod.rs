mod health;
mod images;
mod upload;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::metadata::MetadataStore;
use crate::storage::ObjectStore;

/// Room left for multipart boundaries and the text fields on top of the
/// image size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Handles shared by every request. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub object_store: Arc<dyn ObjectStore>,
    pub metadata_store: Arc<dyn MetadataStore>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        metadata_store: Arc<dyn MetadataStore>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            object_store,
            metadata_store,
            max_upload_bytes,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/api/upload", post(upload::upload_image))
        .route("/api/images", get(images::list_images))
        .route("/api/health", get(health::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
