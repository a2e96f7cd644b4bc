use std::fmt::Debug;

use sqlx::postgres::PgPool;
use thiserror::Error;

use crate::db::albums::AlbumProvider;
use crate::db::media::{MediaFilter, MediaProvider};
use crate::models::albums::{Album, AlbumId};
use crate::models::media::{Media, MediaId};
use crate::models::{CommonFields, ValidationError};
use crate::pagination::{Cursor, CursorError, Page, FETCH_LIMIT};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found")]
    NotFound,
    #[error("Cannot delete a record without an id")]
    DeleteIsMissingId,
    #[error("Failed to decode cursor")]
    CursorDecoding(#[from] CursorError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fails when a record without a server-assigned id is about to be deleted.
pub fn require_id(common: &CommonFields) -> Result<()> {
    if common.id == 0 {
        return Err(Error::DeleteIsMissingId);
    }
    Ok(())
}

/// Storage operations the HTTP layer depends on.
#[async_trait::async_trait]
pub trait MediaService: Debug + Send + Sync {
    async fn create_media(&self, media: Media) -> Result<Media>;
    async fn update_media(&self, media: Media) -> Result<Media>;
    async fn delete_media(&self, media: &Media) -> Result<()>;
    async fn get_media(&self, media_id: MediaId) -> Result<Media>;
    /// Lists active media newest first, optionally filtered by owner and tag.
    async fn get_medias(
        &self,
        cursor: &str,
        user_id: Option<&str>,
        tag: Option<&str>,
    ) -> Result<Page<Media>>;
    async fn album_exists(&self, album_id: AlbumId) -> Result<bool>;

    async fn create_album(&self, album: Album) -> Result<Album>;
    async fn update_album(&self, album: Album) -> Result<Album>;
    async fn delete_album(&self, album: &Album) -> Result<()>;
    async fn get_album(&self, album_id: AlbumId) -> Result<Album>;
    async fn get_albums(&self, cursor: &str, user_id: Option<&str>) -> Result<Page<Album>>;

    /// Every tag used by an active media, sorted.
    async fn get_tags(&self) -> Result<Vec<String>>;
}

#[derive(Clone, Debug)]
pub struct PgMediaService {
    pool: PgPool,
}

impl PgMediaService {
    pub fn new(pool: PgPool) -> Self {
        PgMediaService { pool }
    }
}

/// Ids beyond the signed 64-bit range can never match a stored row.
fn db_id(id: u64) -> Option<i64> {
    use std::convert::TryFrom;
    i64::try_from(id).ok()
}

#[async_trait::async_trait]
impl MediaService for PgMediaService {
    async fn create_media(&self, media: Media) -> Result<Media> {
        media.validate()?;
        let mut conn = self.pool.acquire().await?;
        let created = conn.insert_media(&media).await?;
        tracing::info!(media_id = created.id(), "Created media");
        Ok(created)
    }

    async fn update_media(&self, media: Media) -> Result<Media> {
        media.validate()?;
        let mut conn = self.pool.acquire().await?;
        let updated = conn.update_media(&media).await?.ok_or(Error::NotFound)?;
        tracing::info!(media_id = updated.id(), "Updated media");
        Ok(updated)
    }

    async fn delete_media(&self, media: &Media) -> Result<()> {
        require_id(&media.common)?;
        let media_id = db_id(media.id()).ok_or(Error::NotFound)?;
        let mut conn = self.pool.acquire().await?;
        if !conn.soft_delete_media(media_id).await? {
            return Err(Error::NotFound);
        }
        tracing::info!(media_id, "Deleted media");
        Ok(())
    }

    async fn get_media(&self, media_id: MediaId) -> Result<Media> {
        let media_id = db_id(media_id).ok_or(Error::NotFound)?;
        let mut conn = self.pool.acquire().await?;
        conn.get_media_by_id(media_id).await?.ok_or(Error::NotFound)
    }

    async fn get_medias(
        &self,
        cursor: &str,
        user_id: Option<&str>,
        tag: Option<&str>,
    ) -> Result<Page<Media>> {
        let cursor = Cursor::decode(cursor)?;
        let mut conn = self.pool.acquire().await?;
        let rows = conn
            .get_paginated_media(FETCH_LIMIT, cursor, MediaFilter { user_id, tag })
            .await?;
        Ok(Page::from_overfetch(rows, Media::id))
    }

    async fn album_exists(&self, album_id: AlbumId) -> Result<bool> {
        let album_id = match db_id(album_id) {
            Some(id) => id,
            None => return Ok(false),
        };
        let mut conn = self.pool.acquire().await?;
        Ok(conn.album_exists(album_id).await?)
    }

    async fn create_album(&self, album: Album) -> Result<Album> {
        album.validate()?;
        let mut conn = self.pool.acquire().await?;
        let created = conn.insert_album(&album).await?;
        tracing::info!(album_id = created.id(), "Created album");
        Ok(created)
    }

    async fn update_album(&self, album: Album) -> Result<Album> {
        album.validate()?;
        let mut conn = self.pool.acquire().await?;
        let updated = conn.update_album(&album).await?.ok_or(Error::NotFound)?;
        tracing::info!(album_id = updated.id(), "Updated album");
        Ok(updated)
    }

    async fn delete_album(&self, album: &Album) -> Result<()> {
        require_id(&album.common)?;
        let album_id = db_id(album.id()).ok_or(Error::NotFound)?;
        let mut conn = self.pool.acquire().await?;
        if !conn.soft_delete_album(album_id).await? {
            return Err(Error::NotFound);
        }
        tracing::info!(album_id, "Deleted album");
        Ok(())
    }

    async fn get_album(&self, album_id: AlbumId) -> Result<Album> {
        let album_id = db_id(album_id).ok_or(Error::NotFound)?;
        let mut conn = self.pool.acquire().await?;
        conn.get_album_by_id(album_id).await?.ok_or(Error::NotFound)
    }

    async fn get_albums(&self, cursor: &str, user_id: Option<&str>) -> Result<Page<Album>> {
        let cursor = Cursor::decode(cursor)?;
        let mut conn = self.pool.acquire().await?;
        let rows = conn.get_paginated_albums(FETCH_LIMIT, cursor, user_id).await?;
        Ok(Page::from_overfetch(rows, Album::id))
    }

    async fn get_tags(&self) -> Result<Vec<String>> {
        let mut conn = self.pool.acquire().await?;
        Ok(conn.get_media_tags().await?)
    }
}
