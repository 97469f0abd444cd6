//! # Bucky Box API client
//!
//! Rust client for the Bucky Box delivery-commerce API:
//! - Boxes, delivery services, customers, orders and the webstore
//! - Read-only envelopes over JSON responses, strict about unknown keys
//! - Monetary fields coerced to [`Money`]
//! - GET responses cached per client for 60 seconds
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use buckybox::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("api-key", "api-secret")?;
//!
//!     let webstore = client.webstore().await?;
//!     println!("{}", webstore.get_str("name")?);
//!
//!     match client.box_(0).await {
//!         Err(err) if err.is_not_found() => println!("no such box"),
//!         other => println!("{:?}", other?),
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
pub use cache::{CACHE_TTL_SECONDS, CacheKey, ResponseCache};
pub use client::{Client, ClientBuilder};
pub use coerce::{Coercion, CoercionError, TypeMap, coerce};
pub use config::{ClientConfig, ClientConfigBuilder, Environment};
pub use dispatch::{QueryOptions, Response};
pub use envelope::ResponseEnvelope;
pub use error::{Error, ResponseError, Result};
pub use money::Money;
pub use params::{Params, QueryParams};
pub use value::{Object, Value};

// Module declarations
pub mod cache;
pub mod client;
pub mod clock;
pub mod coerce;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod money;
pub mod observability;
pub mod params;
pub mod resources;
pub mod value;

// Re-export the transport seam for custom transports
pub use buckybox_transport::{HttpRequest, HttpResponse, Transport, TransportError};

/// Prelude module for common imports
///
/// # Examples
///
/// ```rust
/// use buckybox::prelude::*;
/// ```
pub mod prelude {

    pub use crate::{
        Client, ClientConfig, Environment, Error, Money, Params, QueryOptions, QueryParams,
        Response, ResponseEnvelope, Result, Value,
    };
}

/// Crate version, automatically updated from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
