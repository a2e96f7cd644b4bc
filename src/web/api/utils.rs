use serde::de::DeserializeOwned;
use serde::Serialize;
use tide::{Body, Request, Response, StatusCode};

use mediams_api_structs::ErrorBody;

use crate::services;
use crate::State;

pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred";

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let error = ErrorBody {
        status: status as u16,
        message: message.into(),
    };

    let mut res = Response::new(status);
    match Body::from_json(&error) {
        Ok(body) => res.set_body(body),
        Err(err) => tracing::error!(error = %err, "Failed to serialize error body"),
    }
    res
}

pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> tide::Result {
    Ok(Response::builder(status).body(Body::from_json(value)?).build())
}

/// Maps a service failure to its response; unexpected failures are logged and never exposed.
pub fn service_error_response(err: &services::Error) -> Response {
    use services::Error;

    match err {
        Error::NotFound => error_response(StatusCode::NotFound, err.to_string()),
        Error::DeleteIsMissingId | Error::CursorDecoding(_) | Error::Validation(_) => {
            error_response(StatusCode::BadRequest, err.to_string())
        },
        Error::Database(source) => {
            tracing::error!(error = %source, "Service call failed");
            error_response(StatusCode::InternalServerError, INTERNAL_ERROR_MESSAGE)
        },
    }
}

/// Reads a JSON body, answering 400 with the parse error when it does not bind.
pub async fn bind_json<T: DeserializeOwned>(req: &mut Request<State>) -> Result<T, Response> {
    req.body_json()
        .await
        .map_err(|err| error_response(StatusCode::BadRequest, err.to_string()))
}

/// Treats empty query parameters as absent.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Returns 400 from the enclosing handler unless the media's album is active.
macro_rules! require_existing_album {
    ($service:ident, $media:ident) => {
        if let Some(album_id) = $media.album() {
            use $crate::web::api::utils::error_response;
            use tide::StatusCode;
            match $service.album_exists(album_id).await {
                Ok(true) => {},
                Ok(false) => {
                    return Ok(error_response(
                        StatusCode::BadRequest,
                        "Album matching id does not exist",
                    ))
                },
                Err(err) => {
                    tracing::error!(error = %err, album_id, "Failed to look up album");
                    return Ok(error_response(
                        StatusCode::BadRequest,
                        "Unable to verify album",
                    ));
                },
            }
        }
    };
}
