//! Webstore API endpoint

use crate::{
    client::Client,
    coerce::TypeMap,
    dispatch::{QueryOptions, Response},
    envelope::ResponseEnvelope,
    error::Result,
    params::QueryParams,
};

impl Client {
    /// Fetch the webstore the credentials belong to.
    pub async fn webstore(&self) -> Result<ResponseEnvelope> {
        self.webstore_with(QueryParams::new(), QueryOptions::default())
            .await?
            .into_object()
    }

    /// Fetch the webstore with explicit parameters.
    pub async fn webstore_with(
        &self,
        params: QueryParams,
        options: QueryOptions,
    ) -> Result<Response> {
        self.get("/webstore", params, options, &TypeMap::new()).await
    }
}
