//! Boxes API endpoint

use std::fmt::Display;

use crate::{
    client::Client,
    coerce::TypeMap,
    dispatch::{QueryOptions, Response},
    envelope::ResponseEnvelope,
    error::Result,
    money::Money,
    params::QueryParams,
};

use super::member_path;

/// `embed` value used when listing boxes.
pub const BOX_LIST_EMBED: &str = "images";

/// `embed` value used when fetching one box.
pub const BOX_DETAIL_EMBED: &str = "extras,images,box_items";

/// Boxes carry a `price`.
pub fn box_types() -> TypeMap {
    TypeMap::new().with("price", Money::coerce)
}

impl Client {
    /// List boxes with their images.
    pub async fn boxes(&self) -> Result<Vec<ResponseEnvelope>> {
        let params = QueryParams::new().with("embed", BOX_LIST_EMBED);
        self.boxes_with(params, QueryOptions::default())
            .await?
            .into_list()
    }

    /// List boxes with explicit parameters.
    pub async fn boxes_with(&self, params: QueryParams, options: QueryOptions) -> Result<Response> {
        self.get("/boxes", params, options, &box_types()).await
    }

    /// Fetch one box with its extras, images and items.
    ///
    /// Named with a trailing underscore since `box` is reserved.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) when no such box exists.
    pub async fn box_(&self, id: impl Display) -> Result<ResponseEnvelope> {
        let params = QueryParams::new().with("embed", BOX_DETAIL_EMBED);
        self.box_with(id, params, QueryOptions::default())
            .await?
            .into_object()
    }

    /// Fetch one box with explicit parameters.
    pub async fn box_with(
        &self,
        id: impl Display,
        params: QueryParams,
        options: QueryOptions,
    ) -> Result<Response> {
        self.get(&member_path("/boxes", id), params, options, &box_types())
            .await
    }
}
