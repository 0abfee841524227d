//! Actions for the product slice.
//!
//! A closed sum type: every payload is carried by its variant, so a
//! malformed action (wrong or missing payload for a given tag) is
//! unrepresentable and the reducer's match is exhaustive at compile time.

use crate::types::Product;

/// Everything that can happen to the product slice
///
/// Actions are immutable descriptions of "something happened"; creating one
/// never changes state by itself.
#[derive(Clone, Debug, PartialEq)]
pub enum ProductAction {
    /// Request a catalog refresh from the product API
    ///
    /// Handled by marking the slice as loading and returning a fetch effect.
    /// Each dispatch triggers an independent fetch; in-flight requests are
    /// neither de-duplicated nor cancelled.
    LoadProducts,

    /// A catalog fetch resolved successfully
    ///
    /// Fed back by the fetch effect; replaces the catalog wholesale.
    LoadProductsSuccess {
        /// The freshly fetched catalog
        products: Vec<Product>,
    },

    /// A catalog fetch failed
    ///
    /// Fed back by the fetch effect; records the error without touching the
    /// previously loaded catalog.
    LoadProductsFailed {
        /// Human-readable error detail
        error: String,
    },

    /// Add a product to the end of the cart
    AddToCart {
        /// The product to add
        product: Product,
    },
}

impl ProductAction {
    /// Whether this action is a terminal outcome of a load request
    #[must_use]
    pub const fn is_load_outcome(&self) -> bool {
        matches!(
            self,
            Self::LoadProductsSuccess { .. } | Self::LoadProductsFailed { .. }
        )
    }
}
