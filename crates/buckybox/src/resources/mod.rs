//! API resource endpoints
//!
//! Each file adds one resource's calls to [`Client`]. Read calls come in two
//! forms: a plain one using the resource's default parameters and returning
//! envelopes, and a `*_with` one taking caller parameters and
//! [`QueryOptions`]. Caller parameters replace the defaults; they are not
//! merged.

mod boxes;
mod customers;
mod delivery_services;
mod orders;
mod webstore;

pub use boxes::{BOX_DETAIL_EMBED, BOX_LIST_EMBED, box_types};
pub use customers::customer_types;
pub use delivery_services::delivery_service_types;

use std::fmt::Display;

use http::Method;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::{
    client::Client,
    coerce::TypeMap,
    dispatch::{QueryOptions, Response},
    error::Result,
    params::{Params, QueryParams},
};

/// Bytes left as-is in a path segment (RFC 3986 unreserved).
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// `{collection}/{id}` with `id` percent-encoded as a single segment.
pub(crate) fn member_path(collection: &str, id: impl Display) -> String {
    let id = id.to_string();
    let segment = match id.as_str() {
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        other => utf8_percent_encode(other, SEGMENT).to_string(),
    };
    format!("{collection}/{segment}")
}

impl Client {
    /// Cached GET of `path`.
    async fn get(
        &self,
        path: &str,
        params: QueryParams,
        options: QueryOptions,
        types: &TypeMap,
    ) -> Result<Response> {
        self.query(Method::GET, path, Params::Pairs(params), options, types)
            .await
    }
}
