//! Reducer logic for the product slice.
//!
//! All transitions are pure: no I/O, no randomness, no mutation of inputs
//! beyond the in-place state update. The only impure work - fetching the
//! catalog - leaves the reducer as an [`Effect`] description and re-enters
//! it as a success or failure action.

use crate::actions::ProductAction;
use crate::api::ProductApi;
use crate::types::{AppState, LoadStatus, ProductState};
use cartflow_core::composition::{ScopedReducer, scope_reducer};
use cartflow_core::effect::{Effect, Effects};
use cartflow_core::environment::Clock;
use cartflow_core::reducer::Reducer;
use cartflow_core::smallvec;
use std::sync::Arc;

/// Environment dependencies for the catalog reducer
#[derive(Clone)]
pub struct CatalogEnvironment {
    /// Clock for stamping successful loads
    pub clock: Arc<dyn Clock>,
    /// The product API collaborator called by the load effect
    pub api: Arc<dyn ProductApi>,
}

impl CatalogEnvironment {
    /// Creates a new `CatalogEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, api: Arc<dyn ProductApi>) -> Self {
        Self { clock, api }
    }
}

impl std::fmt::Debug for CatalogEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEnvironment").finish_non_exhaustive()
    }
}

/// Reducer for the product slice
#[derive(Clone, Copy, Debug, Default)]
pub struct CatalogReducer;

impl CatalogReducer {
    /// Creates a new `CatalogReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for CatalogReducer {
    type State = ProductState;
    type Action = ProductAction;
    type Environment = CatalogEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects<Self::Action> {
        match action {
            ProductAction::LoadProducts => {
                state.status = LoadStatus::Loading;

                let api = Arc::clone(&env.api);
                smallvec![Effect::future(async move {
                    match api.fetch_products().await {
                        Ok(products) => Some(ProductAction::LoadProductsSuccess { products }),
                        Err(error) => Some(ProductAction::LoadProductsFailed {
                            error: error.to_string(),
                        }),
                    }
                })]
            },
            ProductAction::LoadProductsSuccess { products } => {
                // Overwrite, not append; the last completed load wins
                state.products = products;
                state.status = LoadStatus::Succeeded;
                state.last_error = None;
                state.last_loaded_at = Some(env.clock.now());
                smallvec![Effect::None]
            },
            ProductAction::LoadProductsFailed { error } => {
                // Previously loaded catalog stays untouched
                state.status = LoadStatus::Failed;
                state.last_error = Some(error);
                smallvec![Effect::None]
            },
            ProductAction::AddToCart { product } => {
                state.cart.push(product);
                smallvec![Effect::None]
            },
        }
    }
}

/// The catalog reducer lifted onto the root state tree
pub type AppReducer =
    ScopedReducer<AppState, ProductState, ProductAction, CatalogEnvironment, CatalogReducer>;

/// The catalog reducer lifted onto the root state tree
///
/// This is what the store runs: actions reduce against the `products` slice
/// of [`AppState`], leaving any sibling slices untouched.
#[must_use]
pub fn app_reducer() -> AppReducer {
    scope_reducer(
        CatalogReducer::new(),
        |app: &AppState| &app.products,
        |app: &mut AppState, products| app.products = products,
    )
}

#[cfg(test)]
mod tests {
    // Import the catalog types from the externally built `cartflow_catalog`
    // rather than `crate`: `cartflow_testing` links against that build, so
    // its doubles only implement the trait from that copy of the crate.
    use cartflow_catalog::{
        AppState, CatalogEnvironment, CatalogReducer, LoadStatus, Product, ProductAction,
        ProductId, ProductState, app_reducer,
    };
    use cartflow_core::reducer::Reducer;
    use cartflow_testing::{
        ReducerTest,
        assertions::{assert_has_future_effect, assert_no_effects},
        mocks::{StubProductApi, test_clock},
    };
    use std::sync::Arc;

    fn test_env() -> CatalogEnvironment {
        CatalogEnvironment::new(
            Arc::new(test_clock()),
            Arc::new(StubProductApi::succeeding(vec![])),
        )
    }

    fn product(id: u64) -> Product {
        Product::new(ProductId::new(id), format!("product-{id}"), 10.0)
    }

    #[test]
    fn load_products_marks_loading_and_returns_fetch_effect() {
        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(ProductState::default())
            .when_action(ProductAction::LoadProducts)
            .then_state(|state| {
                assert_eq!(state.status, LoadStatus::Loading);
                assert!(state.products.is_empty());
            })
            .then_effects(|effects| {
                assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn success_replaces_products_and_leaves_cart_untouched() {
        let initial = ProductState {
            products: vec![product(1)],
            cart: vec![product(42)],
            status: LoadStatus::Loading,
            last_error: Some("stale failure".to_string()),
            last_loaded_at: None,
        };

        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(initial)
            .when_action(ProductAction::LoadProductsSuccess {
                products: vec![product(2), product(3)],
            })
            .then_state(|state| {
                assert_eq!(state.products, vec![product(2), product(3)]);
                assert_eq!(state.cart, vec![product(42)]);
                assert_eq!(state.status, LoadStatus::Succeeded);
                assert_eq!(state.last_error, None);
                assert!(state.last_loaded_at.is_some());
            })
            .then_effects(|effects| {
                assert_no_effects(effects);
            })
            .run();
    }

    #[test]
    fn success_is_an_overwrite_not_an_append() {
        let env = test_env();
        let reducer = CatalogReducer::new();
        let mut state = ProductState::default();

        let action = ProductAction::LoadProductsSuccess {
            products: vec![product(1)],
        };

        let _ = reducer.reduce(&mut state, action.clone(), &env);
        assert_eq!(state.products, vec![product(1)]);

        // Dispatching the same success twice yields the same catalog
        let _ = reducer.reduce(&mut state, action, &env);
        assert_eq!(state.products, vec![product(1)]);
    }

    #[test]
    fn add_to_cart_appends_exactly_one_and_leaves_products_untouched() {
        let initial = ProductState {
            products: vec![product(1)],
            cart: vec![product(5)],
            ..ProductState::default()
        };

        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(initial)
            .when_action(ProductAction::AddToCart {
                product: product(9),
            })
            .then_state(|state| {
                assert_eq!(state.products, vec![product(1)]);
                assert_eq!(state.cart, vec![product(5), product(9)]);
            })
            .then_effects(|effects| {
                assert_no_effects(effects);
            })
            .run();
    }

    #[test]
    fn failure_records_error_without_touching_catalog_or_cart() {
        let initial = ProductState {
            products: vec![product(1)],
            cart: vec![product(2)],
            status: LoadStatus::Loading,
            ..ProductState::default()
        };

        ReducerTest::new(CatalogReducer::new())
            .with_env(test_env())
            .given_state(initial)
            .when_action(ProductAction::LoadProductsFailed {
                error: "transport error: connection refused".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.products, vec![product(1)]);
                assert_eq!(state.cart, vec![product(2)]);
                assert_eq!(state.status, LoadStatus::Failed);
                assert_eq!(
                    state.last_error.as_deref(),
                    Some("transport error: connection refused")
                );
            })
            .then_effects(|effects| {
                assert_no_effects(effects);
            })
            .run();
    }

    #[test]
    fn end_to_end_cart_then_load() {
        let env = test_env();
        let reducer = app_reducer();
        let mut state = AppState::default();

        let _ = reducer.reduce(
            &mut state,
            ProductAction::AddToCart {
                product: product(1),
            },
            &env,
        );
        assert_eq!(state.products.cart, vec![product(1)]);

        let _ = reducer.reduce(
            &mut state,
            ProductAction::LoadProductsSuccess {
                products: vec![product(2)],
            },
            &env,
        );

        assert_eq!(state.products.products, vec![product(2)]);
        assert_eq!(state.products.cart, vec![product(1)]);
    }

    #[test]
    fn success_timestamp_comes_from_the_injected_clock() {
        let clock = test_clock();
        let expected = cartflow_core::environment::Clock::now(&clock);
        let env = CatalogEnvironment::new(
            Arc::new(clock),
            Arc::new(StubProductApi::succeeding(vec![])),
        );

        let mut state = ProductState::default();
        let _ = CatalogReducer::new().reduce(
            &mut state,
            ProductAction::LoadProductsSuccess { products: vec![] },
            &env,
        );

        assert_eq!(state.last_loaded_at, Some(expected));
    }
}
