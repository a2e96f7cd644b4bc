//! Shared helpers for driving the HTTP API without a database.
#![allow(dead_code)]

use std::sync::Mutex;

use serde_json::Value;
use tide::http::{Method, Request, Response, Url};
use time::OffsetDateTime;

use mediams::models::albums::{Album, AlbumId};
use mediams::models::media::{Media, MediaId};
use mediams::pagination::{Cursor, Page, FETCH_LIMIT};
use mediams::services::{require_id, Error, MediaService, Result};
use mediams::State;

#[derive(Debug, Default)]
struct Store {
    albums: Vec<Album>,
    media: Vec<Media>,
    next_album_id: AlbumId,
    next_media_id: MediaId,
}

/// In-memory `MediaService` with the same soft-delete and pagination rules as the database.
#[derive(Debug, Default)]
pub struct MemoryMediaService {
    store: Mutex<Store>,
}

impl MemoryMediaService {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page<T: Clone>(
    rows: &[T],
    cursor: &str,
    id_of: fn(&T) -> u64,
    keep: impl Fn(&T) -> bool,
) -> Result<Page<T>> {
    let cursor = Cursor::decode(cursor)?;
    let mut matching: Vec<T> = rows
        .iter()
        .filter(|row| keep(*row))
        .filter(|row| cursor.map_or(true, |c| id_of(*row) <= c.id()))
        .cloned()
        .collect();
    matching.sort_by_key(|row| std::cmp::Reverse(id_of(row)));
    matching.truncate(FETCH_LIMIT as usize);
    Ok(Page::from_overfetch(matching, id_of))
}

#[async_trait::async_trait]
impl MediaService for MemoryMediaService {
    async fn create_media(&self, mut media: Media) -> Result<Media> {
        media.validate()?;
        let mut store = self.store.lock().unwrap();
        store.next_media_id += 1;
        let now = OffsetDateTime::now_utc();
        media.common.id = store.next_media_id;
        media.common.created_at = now;
        media.common.updated_at = now;
        media.common.deleted_at = None;
        store.media.push(media.clone());
        Ok(media)
    }

    async fn update_media(&self, mut media: Media) -> Result<Media> {
        media.validate()?;
        let mut store = self.store.lock().unwrap();
        let stored = store
            .media
            .iter_mut()
            .find(|m| m.id() == media.id() && m.common.is_active())
            .ok_or(Error::NotFound)?;
        media.common.created_at = stored.common.created_at;
        media.common.updated_at = OffsetDateTime::now_utc();
        *stored = media.clone();
        Ok(media)
    }

    async fn delete_media(&self, media: &Media) -> Result<()> {
        require_id(&media.common)?;
        let mut store = self.store.lock().unwrap();
        let stored = store
            .media
            .iter_mut()
            .find(|m| m.id() == media.id() && m.common.is_active())
            .ok_or(Error::NotFound)?;
        stored.common.deleted_at = Some(OffsetDateTime::now_utc());
        Ok(())
    }

    async fn get_media(&self, media_id: MediaId) -> Result<Media> {
        let store = self.store.lock().unwrap();
        store
            .media
            .iter()
            .find(|m| m.id() == media_id && m.common.is_active())
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn get_medias(
        &self,
        cursor: &str,
        user_id: Option<&str>,
        tag: Option<&str>,
    ) -> Result<Page<Media>> {
        let store = self.store.lock().unwrap();
        page(&store.media, cursor, Media::id, |m| {
            m.common.is_active()
                && user_id.map_or(true, |u| m.user_id == u)
                && tag.map_or(true, |t| m.tags.iter().any(|mt| mt == t))
        })
    }

    async fn album_exists(&self, album_id: AlbumId) -> Result<bool> {
        let store = self.store.lock().unwrap();
        Ok(store
            .albums
            .iter()
            .any(|a| a.id() == album_id && a.common.is_active()))
    }

    async fn create_album(&self, mut album: Album) -> Result<Album> {
        album.validate()?;
        let mut store = self.store.lock().unwrap();
        store.next_album_id += 1;
        let now = OffsetDateTime::now_utc();
        album.common.id = store.next_album_id;
        album.common.created_at = now;
        album.common.updated_at = now;
        album.common.deleted_at = None;
        store.albums.push(album.clone());
        Ok(album)
    }

    async fn update_album(&self, mut album: Album) -> Result<Album> {
        album.validate()?;
        let mut store = self.store.lock().unwrap();
        let stored = store
            .albums
            .iter_mut()
            .find(|a| a.id() == album.id() && a.common.is_active())
            .ok_or(Error::NotFound)?;
        album.common.created_at = stored.common.created_at;
        album.common.updated_at = OffsetDateTime::now_utc();
        *stored = album.clone();
        Ok(album)
    }

    async fn delete_album(&self, album: &Album) -> Result<()> {
        require_id(&album.common)?;
        let mut store = self.store.lock().unwrap();
        let stored = store
            .albums
            .iter_mut()
            .find(|a| a.id() == album.id() && a.common.is_active())
            .ok_or(Error::NotFound)?;
        stored.common.deleted_at = Some(OffsetDateTime::now_utc());
        Ok(())
    }

    async fn get_album(&self, album_id: AlbumId) -> Result<Album> {
        let store = self.store.lock().unwrap();
        store
            .albums
            .iter()
            .find(|a| a.id() == album_id && a.common.is_active())
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn get_albums(&self, cursor: &str, user_id: Option<&str>) -> Result<Page<Album>> {
        let store = self.store.lock().unwrap();
        page(&store.albums, cursor, Album::id, |a| {
            a.common.is_active() && user_id.map_or(true, |u| a.user_id == u)
        })
    }

    async fn get_tags(&self) -> Result<Vec<String>> {
        let store = self.store.lock().unwrap();
        let mut tags: Vec<String> = store
            .media
            .iter()
            .filter(|m| m.common.is_active())
            .flat_map(|m| m.tags.iter().cloned())
            .collect();
        tags.sort();
        tags.dedup();
        Ok(tags)
    }
}

/// Service whose every call fails like an unreachable database.
#[derive(Debug, Default)]
pub struct FailingMediaService;

fn unavailable<T>() -> Result<T> {
    Err(Error::Database(sqlx::Error::PoolTimedOut))
}

#[async_trait::async_trait]
impl MediaService for FailingMediaService {
    async fn create_media(&self, _media: Media) -> Result<Media> {
        unavailable()
    }
    async fn update_media(&self, _media: Media) -> Result<Media> {
        unavailable()
    }
    async fn delete_media(&self, _media: &Media) -> Result<()> {
        unavailable()
    }
    async fn get_media(&self, _media_id: MediaId) -> Result<Media> {
        unavailable()
    }
    async fn get_medias(
        &self,
        _cursor: &str,
        _user_id: Option<&str>,
        _tag: Option<&str>,
    ) -> Result<Page<Media>> {
        unavailable()
    }
    async fn album_exists(&self, _album_id: AlbumId) -> Result<bool> {
        unavailable()
    }
    async fn create_album(&self, _album: Album) -> Result<Album> {
        unavailable()
    }
    async fn update_album(&self, _album: Album) -> Result<Album> {
        unavailable()
    }
    async fn delete_album(&self, _album: &Album) -> Result<()> {
        unavailable()
    }
    async fn get_album(&self, _album_id: AlbumId) -> Result<Album> {
        unavailable()
    }
    async fn get_albums(&self, _cursor: &str, _user_id: Option<&str>) -> Result<Page<Album>> {
        unavailable()
    }
    async fn get_tags(&self) -> Result<Vec<String>> {
        unavailable()
    }
}

pub struct TestApp {
    server: tide::Server<State>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_service(MemoryMediaService::new())
    }

    pub fn with_service<S: MediaService + 'static>(service: S) -> Self {
        TestApp {
            server: mediams::app(State::new(service)),
        }
    }

    /// Sends a request and returns the status with the decoded JSON body (`Null` when empty).
    pub async fn send(&self, method: Method, path: &str, body: Option<Value>) -> (u16, Value) {
        let url = Url::parse(&format!("http://localhost{}", path)).unwrap();
        let mut req = Request::new(method, url);
        if let Some(body) = body {
            req.set_body(tide::Body::from_json(&body).unwrap());
        }

        let mut res: Response = self.server.respond(req).await.unwrap();
        let status = res.status() as u16;
        let body = res.body_string().await.unwrap();
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, path: &str) -> (u16, Value) {
        self.send(Method::Get, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        self.send(Method::Post, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> (u16, Value) {
        self.send(Method::Put, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> (u16, Value) {
        self.send(Method::Delete, path, None).await
    }
}
