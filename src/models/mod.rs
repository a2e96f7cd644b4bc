use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

pub mod albums;
pub mod media;

pub type RecordId = u64;

/// Maximum length of a single media tag.
pub const MAX_TAG_LENGTH: usize = 64;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid url")]
    InvalidUrl,
    #[error("tag {0:?} is longer than 64 characters")]
    TagTooLong(String),
}

/// Audit fields shared by every record.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonFields {
    pub id: RecordId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Set once the record is soft-deleted.
    #[serde(skip)]
    pub deleted_at: Option<OffsetDateTime>,
}

impl CommonFields {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Carries the server-assigned fields of `existing` over to a replacement record.
    pub fn replacing(existing: &CommonFields) -> Self {
        CommonFields {
            id: existing.id,
            created_at: existing.created_at,
            updated_at: existing.updated_at,
            deleted_at: None,
        }
    }
}

impl Default for CommonFields {
    fn default() -> Self {
        CommonFields {
            id: 0,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
            deleted_at: None,
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}
