//! Turns a resource/action table into conventional REST routes.

use std::future::Future;
use std::pin::Pin;

use tide::http::Method;
use tide::{Request, StatusCode};

use crate::web::api::utils::error_response;
use crate::State;

pub type HandlerFuture = Pin<Box<dyn Future<Output = tide::Result> + Send + 'static>>;
/// Handler for routes on the resource collection, e.g. `POST /albums`.
pub type CollectionHandler = fn(Request<State>) -> HandlerFuture;
/// Handler for routes on a single record, called with the parsed `:id`.
pub type MemberHandler = fn(Request<State>, u64) -> HandlerFuture;

/// Wraps an `async fn(Request<State>) -> tide::Result` for use in an [`ActionMap`].
macro_rules! collection {
    ($handler:path) => {
        Some(
            (|req: tide::Request<$crate::State>| -> $crate::web::rest::HandlerFuture {
                Box::pin($handler(req))
            }) as $crate::web::rest::CollectionHandler,
        )
    };
}

/// Wraps an `async fn(Request<State>, u64) -> tide::Result` for use in an [`ActionMap`].
macro_rules! member {
    ($handler:path) => {
        Some(
            (|req: tide::Request<$crate::State>, id: u64| -> $crate::web::rest::HandlerFuture {
                Box::pin($handler(req, id))
            }) as $crate::web::rest::MemberHandler,
        )
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Create,
    Detail,
    List,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Create,
        Action::Detail,
        Action::List,
        Action::Update,
        Action::Delete,
    ];

    pub fn method(self) -> Method {
        match self {
            Action::Create => Method::Post,
            Action::Detail | Action::List => Method::Get,
            Action::Update => Method::Put,
            Action::Delete => Method::Delete,
        }
    }

    pub fn path(self, resource: &str) -> String {
        match self {
            Action::Create | Action::List => format!("/{}", resource),
            Action::Detail | Action::Update | Action::Delete => format!("/{}/:id", resource),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Handler {
    Collection(CollectionHandler),
    Member(MemberHandler),
}

/// Handlers a resource supports; a `None` action gets no route.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActionMap {
    pub create: Option<CollectionHandler>,
    pub detail: Option<MemberHandler>,
    pub list: Option<CollectionHandler>,
    pub update: Option<MemberHandler>,
    pub delete: Option<MemberHandler>,
}

impl ActionMap {
    pub fn handler(&self, action: Action) -> Option<Handler> {
        match action {
            Action::Create => self.create.map(Handler::Collection),
            Action::Detail => self.detail.map(Handler::Member),
            Action::List => self.list.map(Handler::Collection),
            Action::Update => self.update.map(Handler::Member),
            Action::Delete => self.delete.map(Handler::Member),
        }
    }

    pub fn supported(&self) -> Vec<Action> {
        Action::ALL
            .iter()
            .copied()
            .filter(|action| self.handler(*action).is_some())
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct Resource {
    pub name: &'static str,
    pub actions: ActionMap,
}

pub fn mount(app: &mut tide::Server<State>, resources: &[Resource]) {
    for resource in resources {
        for action in resource.actions.supported() {
            let path = action.path(resource.name);
            let mut route = app.at(&path);
            match resource.actions.handler(action) {
                Some(Handler::Collection(handler)) => {
                    route.method(action.method(), handler);
                },
                Some(Handler::Member(handler)) => {
                    route.method(action.method(), move |req: Request<State>| {
                        with_id(req, handler)
                    });
                },
                None => {},
            }
            tracing::debug!(method = %action.method(), path = %path, "Mounted route");
        }
    }
}

/// Parses an `:id` segment; only plain decimal digits are accepted.
fn parse_id(segment: &str) -> Option<u64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

async fn with_id(req: Request<State>, handler: MemberHandler) -> tide::Result {
    let id = req.param("id").ok().and_then(parse_id);
    match id {
        Some(id) => handler(req, id).await,
        None => Ok(error_response(StatusCode::BadRequest, "Invalid id")),
    }
}
