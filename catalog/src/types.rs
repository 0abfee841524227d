//! Domain types for the product catalog and cart.
//!
//! `AppState` is the root of the state tree; `ProductState` is its single
//! slice. Both are owned, `Clone`-able data replaced wholesale by the store
//! on every handled action - nothing mutates them in place from outside the
//! reducer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a product
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    /// Creates a `ProductId` from a raw id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single product record
///
/// Matches the subset of the DummyJSON product shape this feature consumes;
/// unknown fields in the wire payload are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: ProductId,
    /// Display title
    pub title: String,
    /// Longer description
    #[serde(default)]
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Thumbnail image URL, if any
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl Product {
    /// Creates a product with the given id and title and empty metadata
    ///
    /// Mostly useful in tests and demos.
    #[must_use]
    pub fn new(id: ProductId, title: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            price,
            thumbnail: None,
        }
    }
}

/// Lifecycle of the most recent catalog load
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadStatus {
    /// No load has been requested yet
    #[default]
    Idle,
    /// A load is in flight
    Loading,
    /// The last load completed and `products` holds its result
    Succeeded,
    /// The last load failed; `last_error` holds the detail
    Failed,
}

/// State of the product slice
///
/// `products` is replaced wholesale on every successful load (overwrite, not
/// append); `cart` is append-only. Concurrent loads are not de-duplicated,
/// so the last completion wins on `products`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductState {
    /// The loaded catalog
    pub products: Vec<Product>,
    /// Products added to the cart, in insertion order (duplicates allowed)
    pub cart: Vec<Product>,
    /// Where the most recent load stands
    pub status: LoadStatus,
    /// Detail of the last failed load, if any
    pub last_error: Option<String>,
    /// When the catalog was last replaced by a successful load
    pub last_loaded_at: Option<DateTime<Utc>>,
}

/// Root state tree for the application
///
/// A single slice today; additional feature slices would be added here and
/// wired in through `scope_reducer`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// The product catalog and cart slice
    pub products: ProductState,
}
