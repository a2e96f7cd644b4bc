use tide::{Response, StatusCode};

#[macro_use]
pub mod rest;
pub mod api;

use api::utils::error_response;

pub(super) fn mount(app: &mut tide::Server<crate::State>) {
    app.with(tide::utils::After(not_found));
    rest::mount(app, &api::resources());
}

/// Gives unmatched routes the same JSON envelope as every other error.
async fn not_found(res: Response) -> tide::Result {
    let unmatched = matches!(
        res.status(),
        StatusCode::NotFound | StatusCode::MethodNotAllowed
    );
    if unmatched && res.is_empty() == Some(true) {
        return Ok(error_response(StatusCode::NotFound, "Not found"));
    }
    Ok(res)
}
