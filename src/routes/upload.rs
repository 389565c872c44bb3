use axum::{
    Json,
    body::Bytes,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartRejection},
    },
    http::StatusCode,
};
use mime::Mime;
use tracing::instrument;

use super::AppState;
use crate::errors::ApiError;
use crate::model::{ImageRecord, NewImageRecord};
use crate::storage::{self, FileData};

const IMAGE_FIELD: &str = "image";

/// Contents of an upload form once the multipart body has been read.
#[derive(Debug, Default)]
struct UploadForm {
    title: Option<String>,
    description: Option<String>,
    image: Option<FileData>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart, max_file_bytes: usize) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("title") => form.title = Some(field.text().await?),
                Some("description") => form.description = Some(field.text().await?),
                Some(IMAGE_FIELD) => {
                    if form.image.is_some() {
                        return Err(ApiError::validation("Only one image file is allowed"));
                    }
                    form.image = Some(read_file(field, max_file_bytes).await?);
                }
                other => tracing::debug!(field = ?other, "ignoring unexpected form field"),
            }
        }

        Ok(form)
    }

    /// Title and description, both present and non-blank.
    fn text_fields(&mut self) -> Result<(String, String), ApiError> {
        match (self.title.take(), self.description.take()) {
            (Some(title), Some(description))
                if !title.trim().is_empty() && !description.trim().is_empty() =>
            {
                Ok((title, description))
            }
            _ => Err(ApiError::validation("Title and description are required")),
        }
    }
}

/// Reads a file part, failing as soon as it grows past `max_bytes`.
async fn read_file(mut field: Field<'_>, max_bytes: usize) -> Result<FileData, ApiError> {
    let content_type: Option<Mime> = field.content_type().and_then(|m| m.parse().ok());
    let filename = field.file_name().map(str::to_string);

    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await? {
        if bytes.len() + chunk.len() > max_bytes {
            return Err(ApiError::validation("File too large"));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(FileData {
        bytes: Bytes::from(bytes),
        content_type,
        filename,
    })
}

/// Stores the uploaded image, then records its metadata.
///
/// The two writes are not atomic: if the record cannot be saved the object
/// stays in the store. Its URL is logged so it can be cleaned up by hand.
#[instrument(skip_all)]
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ImageRecord>), ApiError> {
    let multipart = multipart.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    let mut form = UploadForm::read(multipart, state.max_upload_bytes).await?;
    tracing::info!(title = ?form.title, "upload request received");

    let (title, description) = form.text_fields()?;
    let image = form
        .image
        .ok_or_else(|| ApiError::validation("Image file is required"))?;

    let image_url = storage::store_image(state.object_store.as_ref(), image).await?;

    let record = state
        .metadata_store
        .insert(NewImageRecord {
            title,
            description,
            image_url: image_url.clone(),
        })
        .await
        .inspect_err(|e| {
            tracing::warn!(%image_url, error = %e, "image stored but its record was not saved");
        })?;

    tracing::info!(id = %record.id, "image saved");
    Ok((StatusCode::CREATED, Json(record)))
}
