#[macro_use]
pub mod utils;
pub mod albums;
pub mod media;
pub mod tags;

use crate::web::rest::{ActionMap, Resource};

/// Every resource the API serves and the actions it supports.
pub fn resources() -> Vec<Resource> {
    vec![
        Resource {
            name: "media",
            actions: ActionMap {
                create: collection!(media::create),
                detail: member!(media::detail),
                list: collection!(media::list),
                update: member!(media::update),
                delete: member!(media::delete),
            },
        },
        Resource {
            name: "albums",
            actions: ActionMap {
                create: collection!(albums::create),
                detail: member!(albums::detail),
                list: collection!(albums::list),
                update: member!(albums::update),
                delete: member!(albums::delete),
            },
        },
        Resource {
            name: "tags",
            actions: ActionMap {
                list: collection!(tags::list),
                ..Default::default()
            },
        },
    ]
}
