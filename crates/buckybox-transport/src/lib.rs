//! HTTP transport layer for the Bucky Box API client
//!
//! The API client never talks to the network directly. It hands a fully
//! built [`HttpRequest`] to a [`Transport`] and gets an [`HttpResponse`]
//! back, whatever the status code.
//!
//! # Architecture
//!
//! - **Transport trait**: Generic interface for any transport implementation
//! - **HTTP transport**: REST client via reqwest
//! - **Error handling**: [`TransportError`] for failures that produced no response

#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! # Usage
//!
//! ```no_run
//! use buckybox_transport::{HttpRequest, HttpTransport, Transport};
//! use http::Method;
//!
//! # async fn example() -> buckybox_transport::Result<()> {
//! let transport = HttpTransport::new()?;
//! let request = HttpRequest::new(Method::GET, "https://api.buckybox.com/v1/webstore");
//! let response = transport.send_http(request).await?;
//! println!("{}", response.status);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod http;
pub mod traits;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use crate::http::{HttpTransport, HttpTransportConfig};
pub use traits::{HttpRequest, HttpResponse, Transport};
