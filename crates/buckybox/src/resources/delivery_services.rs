//! Delivery services API endpoint

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

/// Delivery services carry a `fee`.
pub fn delivery_service_types() -> TypeMap {
    TypeMap::new().with("fee", Money::coerce)
}

impl Client {
    /// List delivery services.
    pub async fn delivery_services(&self) -> Result<Vec<ResponseEnvelope>> {
        self.delivery_services_with(QueryParams::new(), QueryOptions::default())
            .await?
            .into_list()
    }

    /// List delivery services with explicit parameters.
    pub async fn delivery_services_with(
        &self,
        params: QueryParams,
        options: QueryOptions,
    ) -> Result<Response> {
        self.get("/delivery_services", params, options, &delivery_service_types())
            .await
    }

    /// Fetch one delivery service.
    pub async fn delivery_service(&self, id: impl Display) -> Result<ResponseEnvelope> {
        self.delivery_service_with(id, QueryParams::new(), QueryOptions::default())
            .await?
            .into_object()
    }

    /// Fetch one delivery service with explicit parameters.
    pub async fn delivery_service_with(
        &self,
        id: impl Display,
        params: QueryParams,
        options: QueryOptions,
    ) -> Result<Response> {
        self.get(
            &member_path("/delivery_services", id),
            params,
            options,
            &delivery_service_types(),
        )
        .await
    }
}
