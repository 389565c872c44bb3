use axum::{Json, extract::State};
use tracing::instrument;

use super::AppState;
use crate::errors::ApiError;
use crate::model::ImageRecord;

#[instrument(skip_all)]
pub async fn list_images(State(state): State<AppState>) -> Result<Json<Vec<ImageRecord>>, ApiError> {
    let records = state.metadata_store.find_all_newest_first().await?;
    tracing::debug!(count = records.len(), "listing images");
    Ok(Json(records))
}
