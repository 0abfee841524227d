//! # CartFlow Catalog
//!
//! The product catalog and shopping cart feature, built on the CartFlow
//! state container.
//!
//! The feature is the canonical unidirectional loop:
//!
//! - [`ProductAction`] - a closed sum of everything that can happen
//! - [`CatalogReducer`] - pure transitions over [`ProductState`]
//! - [`selectors`] - pure projections for read-only views
//! - [`ProductApi`] - the asynchronous collaborator the load effect calls
//!
//! Dispatching [`ProductAction::LoadProducts`] marks the slice as loading and
//! returns a fetch effect; when the fetch resolves, the effect feeds
//! [`ProductAction::LoadProductsSuccess`] (or
//! [`ProductAction::LoadProductsFailed`]) back into the store, which replaces
//! the catalog wholesale. [`ProductAction::AddToCart`] appends to the cart
//! synchronously.
//!
//! ## Example
//!
//! ```no_run
//! use cartflow_catalog::{
//!     AppState, CatalogEnvironment, ProductAction, app_reducer,
//!     http::{DUMMYJSON_BASE_URL, DummyJsonClient},
//!     selectors,
//! };
//! use cartflow_core::environment::Clock;
//! use cartflow_runtime::Store;
//! use chrono::{DateTime, Utc};
//! use std::sync::Arc;
//!
//! struct SystemClock;
//!
//! impl Clock for SystemClock {
//!     fn now(&self) -> DateTime<Utc> {
//!         Utc::now()
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = CatalogEnvironment::new(
//!     Arc::new(SystemClock),
//!     Arc::new(DummyJsonClient::new(DUMMYJSON_BASE_URL)),
//! );
//! let store = Store::new(AppState::default(), app_reducer(), env);
//!
//! let mut handle = store.send(ProductAction::LoadProducts).await?;
//! handle.wait().await;
//!
//! let count = store.state(|s| selectors::select_products(s).len()).await;
//! println!("loaded {count} products");
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod api;
pub mod http;
pub mod reducer;
pub mod selectors;
pub mod types;

pub use actions::ProductAction;
pub use api::{ProductApi, ProductApiError};
pub use reducer::{AppReducer, CatalogEnvironment, CatalogReducer, app_reducer};
pub use types::{AppState, LoadStatus, Product, ProductId, ProductState};
