use tide::{Request, Response, StatusCode};

use mediams_api_structs::{ListQuery, MediaPayload};

use super::utils::{bind_json, error_response, json_response, non_empty, service_error_response};
use crate::models::media::{Media, MediaId};
use crate::models::CommonFields;
use crate::State;

pub(super) async fn create(mut req: Request<State>) -> tide::Result<Response> {
    let service = req.state().service.clone();

    let payload: MediaPayload = match bind_json(&mut req).await {
        Ok(payload) => payload,
        Err(res) => return Ok(res),
    };
    tracing::debug!("Received media payload: {:?}", payload);

    let media = Media::from(payload);

    require_existing_album!(service, media);

    match service.create_media(media).await {
        Ok(created) => json_response(StatusCode::Created, &created),
        Err(err) => Ok(service_error_response(&err)),
    }
}

pub(super) async fn update(mut req: Request<State>, media_id: MediaId) -> tide::Result<Response> {
    let service = req.state().service.clone();

    let payload: MediaPayload = match bind_json(&mut req).await {
        Ok(payload) => payload,
        Err(res) => return Ok(res),
    };
    tracing::debug!("Received media payload: {:?}", payload);

    let existing = match service.get_media(media_id).await {
        Ok(media) => media,
        Err(err) => return Ok(service_error_response(&err)),
    };

    let mut media = Media::from(payload);
    media.common = CommonFields::replacing(&existing.common);

    require_existing_album!(service, media);

    match service.update_media(media).await {
        Ok(updated) => json_response(StatusCode::Ok, &updated),
        Err(err) => Ok(service_error_response(&err)),
    }
}

pub(super) async fn delete(req: Request<State>, media_id: MediaId) -> tide::Result<Response> {
    let service = &req.state().service;

    let media = match service.get_media(media_id).await {
        Ok(media) => media,
        Err(err) => return Ok(service_error_response(&err)),
    };

    match service.delete_media(&media).await {
        Ok(()) => Ok(Response::new(StatusCode::NoContent)),
        Err(err) => Ok(service_error_response(&err)),
    }
}

pub(super) async fn detail(req: Request<State>, media_id: MediaId) -> tide::Result<Response> {
    match req.state().service.get_media(media_id).await {
        Ok(media) => json_response(StatusCode::Ok, &media),
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
        .get_medias(cursor, non_empty(&query.user_id), non_empty(&query.tag))
        .await
    {
        Ok(page) => json_response(StatusCode::Ok, &page),
        Err(err) => Ok(service_error_response(&err)),
    }
}
