//! Orders API endpoint

use http::Method;

use crate::{
    client::Client,
    coerce::TypeMap,
    dispatch::QueryOptions,
    envelope::ResponseEnvelope,
    error::Result,
    params::Params,
};

impl Client {
    /// Place an order from a JSON document. Never cached.
    pub async fn create_order(&self, json_order: impl Into<String>) -> Result<ResponseEnvelope> {
        self.query(
            Method::POST,
            "/orders",
            Params::Json(json_order.into()),
            QueryOptions::default(),
            &TypeMap::new(),
        )
        .await?
        .into_object()
    }
}
