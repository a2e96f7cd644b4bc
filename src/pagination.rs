use std::convert::TryFrom;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::RecordId;

/// Number of records returned per list page.
pub const PAGE_SIZE: usize = 100;

/// Rows requested per page, one more than returned so a following page can be detected.
pub const FETCH_LIMIT: i64 = PAGE_SIZE as i64 + 1;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CursorError {
    #[error("cursor is not valid base64")]
    Encoding(#[from] base64::DecodeError),
    #[error("cursor has {0} bytes, expected 8")]
    Length(usize),
    #[error("cursor id {0} is out of range")]
    OutOfRange(RecordId),
}

/// Keyset pagination position: the id of the first record on the requested page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor(RecordId);

impl Cursor {
    pub fn new(id: RecordId) -> Self {
        Cursor(id)
    }

    pub fn id(&self) -> RecordId {
        self.0
    }

    /// The id as stored in the database.
    pub fn db_id(&self) -> i64 {
        self.0 as i64
    }

    /// Parses a cursor token; an empty token selects the first page.
    pub fn decode(token: &str) -> Result<Option<Cursor>, CursorError> {
        if token.is_empty() {
            return Ok(None);
        }

        let bytes = URL_SAFE_NO_PAD.decode(token)?;
        let bytes = <[u8; 8]>::try_from(bytes.as_slice()).map_err(|_| CursorError::Length(bytes.len()))?;
        let id = RecordId::from_be_bytes(bytes);
        if i64::try_from(id).is_err() {
            return Err(CursorError::OutOfRange(id));
        }

        Ok(Some(Cursor(id)))
    }

    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0.to_be_bytes())
    }
}

/// One page of a list endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Empty when there are no further pages.
    pub next_cursor: String,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Builds a page from rows fetched in descending id order with `FETCH_LIMIT`.
    ///
    /// The first row beyond `PAGE_SIZE` is not returned; its id becomes the next cursor so the
    /// following page starts exactly there.
    pub fn from_overfetch<F>(mut rows: Vec<T>, id_of: F) -> Self
    where
        F: Fn(&T) -> RecordId,
    {
        let next_cursor = if rows.len() > PAGE_SIZE {
            let first_of_next = id_of(&rows[PAGE_SIZE]);
            rows.truncate(PAGE_SIZE);
            Cursor(first_of_next).encode()
        } else {
            String::new()
        };

        Page {
            next_cursor,
            results: rows,
        }
    }
}
