use serde::{Deserialize, Serialize};

use mediams_api_structs::AlbumPayload;

use super::{require, CommonFields, RecordId, ValidationError};

pub type AlbumId = RecordId;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    #[serde(flatten)]
    pub common: CommonFields,
    pub user_id: String,
    pub title: String,
}

impl Album {
    pub fn id(&self) -> AlbumId {
        self.common.id
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("userId", &self.user_id)?;
        require("title", &self.title)?;
        Ok(())
    }
}

impl From<AlbumPayload> for Album {
    fn from(payload: AlbumPayload) -> Self {
        Album {
            common: CommonFields::default(),
            user_id: payload.user_id,
            title: payload.title,
        }
    }
}

impl From<crate::db::albums::Album> for Album {
    fn from(a: crate::db::albums::Album) -> Self {
        Album {
            common: CommonFields {
                id: a.id as AlbumId,
                created_at: a.created_at,
                updated_at: a.updated_at,
                deleted_at: a.deleted_at,
            },
            user_id: a.user_id,
            title: a.title,
        }
    }
}
