use tide::{Request, Response, StatusCode};

use super::utils::{json_response, service_error_response};
use crate::State;

pub(super) async fn list(req: Request<State>) -> tide::Result<Response> {
    match req.state().service.get_tags().await {
        Ok(tags) => json_response(StatusCode::Ok, &tags),
        Err(err) => Ok(service_error_response(&err)),
    }
}
