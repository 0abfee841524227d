//! Reqwest-backed implementation of [`ProductApi`] for the DummyJSON
//! products endpoint.
//!
//! `GET {base_url}/products` answers a `{ "products": [...], ... }`
//! envelope; only the `products` field is consumed.

use crate::api::{ProductApi, ProductApiError};
use crate::types::Product;
use futures::future::BoxFuture;
use serde::Deserialize;

/// Base URL of the public DummyJSON API
pub const DUMMYJSON_BASE_URL: &str = "https://dummyjson.com";

/// The `{ "products": [...] }` envelope around the catalog
#[derive(Debug, Deserialize)]
struct ProductsEnvelope {
    products: Vec<Product>,
}

/// HTTP client for the DummyJSON products endpoint
#[derive(Debug, Clone)]
pub struct DummyJsonClient {
    client: reqwest::Client,
    base_url: String,
}

impl DummyJsonClient {
    /// Create a client for the given base URL with default reqwest settings
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`
    ///
    /// Useful when the application shares one connection pool across
    /// collaborators.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl ProductApi for DummyJsonClient {
    fn fetch_products(&self) -> BoxFuture<'_, Result<Vec<Product>, ProductApiError>> {
        Box::pin(async move {
            let url = format!("{}/products", self.base_url);
            tracing::debug!(url = %url, "Fetching product catalog");

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|error| ProductApiError::Transport(error.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                tracing::warn!(status = status.as_u16(), "Product endpoint answered non-success");
                return Err(ProductApiError::Status(status.as_u16()));
            }

            let envelope: ProductsEnvelope = response
                .json()
                .await
                .map_err(|error| ProductApiError::Decode(error.to_string()))?;

            tracing::debug!(count = envelope.products.len(), "Fetched product catalog");
            Ok(envelope.products)
        })
    }
}
