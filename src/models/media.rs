use std::convert::TryFrom;

use serde::{Deserialize, Serialize};
use url::Url;

use mediams_api_structs::MediaPayload;

use super::albums::AlbumId;
use super::{require, CommonFields, RecordId, ValidationError, MAX_TAG_LENGTH};

pub type MediaId = RecordId;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    #[serde(flatten)]
    pub common: CommonFields,
    /// 0 when the media is not part of an album.
    pub album_id: AlbumId,
    pub user_id: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub media_type: String,
    pub tags: Vec<String>,
}

impl Media {
    pub fn id(&self) -> MediaId {
        self.common.id
    }

    pub fn album(&self) -> Option<AlbumId> {
        match self.album_id {
            0 => None,
            id => Some(id),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("userId", &self.user_id)?;
        require("url", &self.url)?;
        validate_url(&self.url)?;

        if let Some(tag) = self.tags.iter().find(|t| t.chars().count() > MAX_TAG_LENGTH) {
            return Err(ValidationError::TagTooLong(tag.clone()));
        }

        Ok(())
    }
}

pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    match Url::parse(url) {
        Ok(parsed) if parsed.has_host() => Ok(()),
        _ => Err(ValidationError::InvalidUrl),
    }
}

/// Drops repeated tags, keeping the first occurrence of each.
pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

impl From<MediaPayload> for Media {
    fn from(payload: MediaPayload) -> Self {
        Media {
            common: CommonFields::default(),
            album_id: payload.album_id,
            user_id: payload.user_id,
            url: payload.url,
            width: payload.width,
            height: payload.height,
            media_type: payload.media_type,
            tags: dedup_tags(payload.tags),
        }
    }
}

impl From<crate::db::media::Media> for Media {
    fn from(m: crate::db::media::Media) -> Self {
        Media {
            common: CommonFields {
                id: m.id as MediaId,
                created_at: m.created_at,
                updated_at: m.updated_at,
                deleted_at: m.deleted_at,
            },
            album_id: m.album_id.map(|id| id as AlbumId).unwrap_or_default(),
            user_id: m.user_id,
            url: m.url,
            width: u32::try_from(m.width).unwrap_or_default(),
            height: u32::try_from(m.height).unwrap_or_default(),
            media_type: m.media_type,
            tags: m.tags,
        }
    }
}
