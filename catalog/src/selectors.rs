//! Pure projections over [`AppState`].
//!
//! Selectors are total, synchronous functions with no side effects; calling
//! one twice on the same state always yields the same result. Live,
//! change-deduplicated views come from `Store::select`, which wraps these
//! projections in a watch subscription.

use crate::types::{AppState, LoadStatus, Product};

/// The loaded catalog
#[must_use]
pub fn select_products(state: &AppState) -> &[Product] {
    &state.products.products
}

/// The cart contents, in insertion order
#[must_use]
pub fn select_cart(state: &AppState) -> &[Product] {
    &state.products.cart
}

/// Where the most recent catalog load stands
#[must_use]
pub const fn select_status(state: &AppState) -> LoadStatus {
    state.products.status
}

/// Detail of the last failed load, if any
#[must_use]
pub fn select_last_error(state: &AppState) -> Option<&str> {
    state.products.last_error.as_deref()
}

/// Number of items in the cart
#[must_use]
pub fn select_cart_len(state: &AppState) -> usize {
    state.products.cart.len()
}

/// Sum of the prices of everything in the cart
#[must_use]
pub fn select_cart_total(state: &AppState) -> f64 {
    state.products.cart.iter().map(|p| p.price).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProductId, ProductState};

    fn state_with_cart(prices: &[f64]) -> AppState {
        let cart = prices
            .iter()
            .enumerate()
            .map(|(i, price)| Product::new(ProductId::new(i as u64), format!("p{i}"), *price))
            .collect();

        AppState {
            products: ProductState {
                cart,
                ..ProductState::default()
            },
        }
    }

    #[test]
    fn selectors_are_pure() {
        let state = state_with_cart(&[1.0, 2.5]);

        // Same state in, same value out, no observable side effects
        assert_eq!(select_cart(&state), select_cart(&state));
        assert_eq!(select_cart_len(&state), 2);
        assert_eq!(select_cart_len(&state), 2);
    }

    #[test]
    fn cart_total_sums_prices() {
        let state = state_with_cart(&[9.99, 0.01, 5.0]);
        assert!((select_cart_total(&state) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn empty_state_projects_empty_views() {
        let state = AppState::default();
        assert!(select_products(&state).is_empty());
        assert!(select_cart(&state).is_empty());
        assert_eq!(select_status(&state), LoadStatus::Idle);
        assert_eq!(select_last_error(&state), None);
        assert!((select_cart_total(&state)).abs() < f64::EPSILON);
    }
}
