use tide::{Request, Response, StatusCode};

use mediams_api_structs::{AlbumPayload, ListQuery};

use super::utils::{bind_json, error_response, json_response, non_empty, service_error_response};
use crate::models::albums::{Album, AlbumId};
use crate::models::CommonFields;
use crate::State;

pub(super) async fn create(mut req: Request<State>) -> tide::Result<Response> {
    let payload: AlbumPayload = match bind_json(&mut req).await {
        Ok(payload) => payload,
        Err(res) => return Ok(res),
    };
    tracing::debug!("Received album payload: {:?}", payload);

    let album = Album::from(payload);

    match req.state().service.create_album(album).await {
        Ok(created) => json_response(StatusCode::Created, &created),
        Err(err) => Ok(service_error_response(&err)),
    }
}

pub(super) async fn update(mut req: Request<State>, album_id: AlbumId) -> tide::Result<Response> {
    let service = req.state().service.clone();

    let payload: AlbumPayload = match bind_json(&mut req).await {
        Ok(payload) => payload,
        Err(res) => return Ok(res),
    };
    tracing::debug!("Received album payload: {:?}", payload);

    let existing = match service.get_album(album_id).await {
        Ok(album) => album,
        Err(err) => return Ok(service_error_response(&err)),
    };

    let mut album = Album::from(payload);
    album.common = CommonFields::replacing(&existing.common);

    match service.update_album(album).await {
        Ok(updated) => json_response(StatusCode::Ok, &updated),
        Err(err) => Ok(service_error_response(&err)),
    }
}

pub(super) async fn delete(req: Request<State>, album_id: AlbumId) -> tide::Result<Response> {
    let service = &req.state().service;

    let album = match service.get_album(album_id).await {
        Ok(album) => album,
        Err(err) => return Ok(service_error_response(&err)),
    };

    match service.delete_album(&album).await {
        Ok(()) => Ok(Response::new(StatusCode::NoContent)),
        Err(err) => Ok(service_error_response(&err)),
    }
}

pub(super) async fn detail(req: Request<State>, album_id: AlbumId) -> tide::Result<Response> {
    match req.state().service.get_album(album_id).await {
        Ok(album) => json_response(StatusCode::Ok, &album),
        Err(err) => Ok(service_error_response(&err)),
    }
}

pub(super) async fn list(req: Request<State>) -> tide::Result<Response> {
    let query: ListQuery = match req.query() {
        Ok(query) => query,
        Err(err) => return Ok(error_response(StatusCode::BadRequest, err.to_string())),
    };

    let cursor = non_empty(&query.cursor).unwrap_or_default();
    match req
        .state()
        .service
        .get_albums(cursor, non_empty(&query.user_id))
        .await
    {
        Ok(page) => json_response(StatusCode::Ok, &page),
        Err(err) => Ok(service_error_response(&err)),
    }
}
