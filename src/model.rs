use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata of an uploaded image. Records are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Assigned by the metadata store on insert (UUID v4)
    pub id: String,
    pub title: String,
    pub description: String,
    /// Location returned by the object store
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the upload handler; the store fills in the rest.
#[derive(Debug, Clone)]
pub struct NewImageRecord {
    pub title: String,
    pub description: String,
    pub image_url: String,
}

impl NewImageRecord {
    pub fn into_record(self, id: String, created_at: DateTime<Utc>) -> ImageRecord {
        ImageRecord {
            id,
            title: self.title,
            description: self.description,
            image_url: self.image_url,
            created_at,
        }
    }
}

/// Orders records newest first. The sort is stable, so records sharing a
/// timestamp keep their relative input order.
pub fn sort_newest_first(records: &mut [ImageRecord]) {
    records.sort_by_key(|record| std::cmp::Reverse(record.created_at));
}
