// Not every helper is used by every test file
#![allow(dead_code)]

pub mod fake_aws;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{Request, Response, header},
};
use gallery_server::{
    metadata::{InMemoryMetadataStore, MetadataError, MetadataStore},
    model::{ImageRecord, NewImageRecord},
    routes::{self, AppState},
    storage::{InMemoryObjectStore, ObjectStore, StorageError},
};
use mime::Mime;
use tower::ServiceExt;
use url::Url;

pub const STORAGE_URL: &str = "http://localhost:4566/test-bucket";
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub struct TestApp {
    pub router: Router,
    pub objects: InMemoryObjectStore,
    pub metadata: InMemoryMetadataStore,
}

impl TestApp {
    pub fn new() -> Self {
        let objects = InMemoryObjectStore::new(Url::parse(STORAGE_URL).unwrap());
        let metadata = InMemoryMetadataStore::new();
        let state = AppState::new(
            Arc::new(objects.clone()),
            Arc::new(metadata.clone()),
            MAX_UPLOAD_BYTES,
        );

        Self {
            router: routes::router(state),
            objects,
            metadata,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn upload(&self, form: MultipartForm) -> Response<Body> {
        self.send(form.into_request("/api/upload")).await
    }
}

/// Router wired to arbitrary store implementations.
pub fn router_with(
    object_store: Arc<dyn ObjectStore>,
    metadata_store: Arc<dyn MetadataStore>,
) -> Router {
    routes::router(AppState::new(
        object_store,
        metadata_store,
        MAX_UPLOAD_BYTES,
    ))
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Hand-built `multipart/form-data` body.
pub struct MultipartForm {
    boundary: &'static str,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: "gallery-test-boundary",
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", self.boundary),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

/// A small JPEG-looking payload of `len` bytes.
pub fn jpeg_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    data[..4].copy_from_slice(&[0xff, 0xd8, 0xff, 0xe0]);
    data
}

pub fn cat_upload() -> MultipartForm {
    MultipartForm::new()
        .text("title", "Cat")
        .text("description", "A cat")
        .file("image", "cat.jpg", "image/jpeg", &jpeg_bytes(2048))
}

/// Metadata store whose every request fails as if the database were down.
pub struct UnreachableMetadataStore;

#[async_trait]
impl MetadataStore for UnreachableMetadataStore {
    async fn connect(&self) -> Result<(), MetadataError> {
        Err(MetadataError::Connection("connection refused".into()))
    }

    async fn insert(&self, _record: NewImageRecord) -> Result<ImageRecord, MetadataError> {
        Err(MetadataError::Put("connection refused".into()))
    }

    async fn find_all_newest_first(&self) -> Result<Vec<ImageRecord>, MetadataError> {
        Err(MetadataError::Scan("connection refused".into()))
    }

    fn is_connected(&self) -> bool {
        false
    }
}

/// Object store that rejects every write.
pub struct UnreachableObjectStore;

#[async_trait]
impl ObjectStore for UnreachableObjectStore {
    async fn put_object(
        &self,
        _key: &str,
        _bytes: Bytes,
        _content_type: &Mime,
    ) -> Result<String, StorageError> {
        Err(StorageError::Put("service unavailable".into()))
    }

    async fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        Err(StorageError::ListBuckets("service unavailable".into()))
    }

    fn bucket(&self) -> Option<&str> {
        Some("test-bucket")
    }
}
