//! Customers API endpoint

use std::fmt::Display;

use http::Method;

use crate::{
    client::Client,
    coerce::TypeMap,
    dispatch::{QueryOptions, Response},
    envelope::ResponseEnvelope,
    error::Result,
    money::Money,
    params::{Params, QueryParams},
    value::Value,
};

use super::member_path;

/// Customers carry an `account_balance`.
pub fn customer_types() -> TypeMap {
    TypeMap::new().with("account_balance", Money::coerce)
}

impl Client {
    /// List customers.
    pub async fn customers(&self) -> Result<Vec<ResponseEnvelope>> {
        self.customers_with(QueryParams::new(), QueryOptions::default())
            .await?
            .into_list()
    }

    /// List customers with explicit parameters.
    pub async fn customers_with(
        &self,
        params: QueryParams,
        options: QueryOptions,
    ) -> Result<Response> {
        self.get("/customers", params, options, &customer_types())
            .await
    }

    /// Fetch one customer.
    pub async fn customer(&self, id: impl Display) -> Result<ResponseEnvelope> {
        self.customer_with(id, QueryParams::new(), QueryOptions::default())
            .await?
            .into_object()
    }

    /// Fetch one customer with explicit parameters.
    pub async fn customer_with(
        &self,
        id: impl Display,
        params: QueryParams,
        options: QueryOptions,
    ) -> Result<Response> {
        self.get(&member_path("/customers", id), params, options, &customer_types())
            .await
    }

    /// Check a customer's credentials (typically `email` and `password`).
    ///
    /// Sent as a form-encoded POST, so never cached.
    pub async fn authenticate_customer(&self, params: QueryParams) -> Result<ResponseEnvelope> {
        self.authenticate_customer_with(params, QueryOptions::default())
            .await?
            .into_object()
    }

    /// Check a customer's credentials with explicit options.
    pub async fn authenticate_customer_with(
        &self,
        params: QueryParams,
        options: QueryOptions,
    ) -> Result<Response> {
        self.query(
            Method::POST,
            "/customers/sign_in",
            Params::Pairs(params),
            options,
            &TypeMap::new(),
        )
        .await
    }

    /// Create or update a customer from a JSON document.
    ///
    /// A document with a non-null, non-false `id` is PUT to
    /// `/customers/{id}`; anything else is POSTed to `/customers`. The body
    /// is sent exactly as given.
    ///
    /// # Errors
    ///
    /// [`Error::Serialization`](crate::Error::Serialization) when the
    /// document is not valid JSON; nothing is sent in that case.
    pub async fn create_or_update_customer(
        &self,
        json_customer: impl Into<String>,
    ) -> Result<ResponseEnvelope> {
        let json_customer = json_customer.into();
        let (method, path) = match customer_id(&json_customer)? {
            Some(id) => (Method::PUT, member_path("/customers", id)),
            None => (Method::POST, "/customers".to_string()),
        };

        self.query(
            method,
            &path,
            Params::Json(json_customer),
            QueryOptions::default(),
            &TypeMap::new(),
        )
        .await?
        .into_object()
    }
}

/// The `id` a customer document refers to, rendered for a path.
fn customer_id(json_customer: &str) -> Result<Option<String>> {
    let document = Value::parse(json_customer.as_bytes())?;
    let id = match document.as_object().and_then(|object| object.get("id")) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::String(id)) => Some(id.clone()),
        Some(other) => Some(other.dump()),
    };
    Ok(id)
}
