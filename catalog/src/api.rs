//! The product API collaborator boundary.
//!
//! The reducer never talks to the network; the load effect calls this trait
//! and maps the result back into actions. Production wires the reqwest
//! client from [`crate::http`]; tests wire a stub.

use crate::types::Product;
use futures::future::BoxFuture;
use thiserror::Error;

/// Errors surfaced by the product API collaborator
///
/// Carries rendered detail rather than transport-library types so stubs can
/// construct (and clone) errors freely.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductApiError {
    /// The request could not be sent or the connection failed
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status
    #[error("unexpected status {0}")]
    Status(u16),

    /// The response body could not be decoded into the products envelope
    #[error("failed to decode response body: {0}")]
    Decode(String),
}

/// Asynchronous source of the product catalog
///
/// Boxed-future returns keep the trait object-safe so environments can hold
/// `Arc<dyn ProductApi>`. Retry and timeout behavior are the implementor's
/// concern; the effect layer only distinguishes success from failure.
pub trait ProductApi: Send + Sync {
    /// Fetch the full product catalog
    ///
    /// # Errors
    ///
    /// Returns [`ProductApiError`] when the request cannot be sent, the
    /// endpoint answers with a non-success status, or the body does not
    /// decode into the products envelope.
    fn fetch_products(&self) -> BoxFuture<'_, Result<Vec<Product>, ProductApiError>>;
}

impl<T: ProductApi + ?Sized> ProductApi for std::sync::Arc<T> {
    fn fetch_products(&self) -> BoxFuture<'_, Result<Vec<Product>, ProductApiError>> {
        (**self).fetch_products()
    }
}
