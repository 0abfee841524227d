//! # CartFlow Testing
//!
//! Testing utilities and doubles for the CartFlow state container.
//!
//! What lives here:
//! - [`ReducerTest`]: a fluent Given/When/Then harness for reducers
//! - Effect assertion helpers
//! - [`mocks::FixedClock`]: deterministic time
//! - [`mocks::StubProductApi`]: canned product API responses
//!
//! ## Example
//!
//! ```
//! use cartflow_catalog::{CatalogEnvironment, CatalogReducer, ProductAction, ProductState};
//! use cartflow_testing::{ReducerTest, assertions, mocks};
//! use std::sync::Arc;
//!
//! let env = CatalogEnvironment::new(
//!     Arc::new(mocks::test_clock()),
//!     Arc::new(mocks::StubProductApi::succeeding(vec![])),
//! );
//!
//! ReducerTest::new(CatalogReducer::new())
//!     .with_env(env)
//!     .given_state(ProductState::default())
//!     .when_action(ProductAction::LoadProducts)
//!     .then_effects(|effects| {
//!         assertions::assert_has_future_effect(effects);
//!     })
//!     .run();
//! ```

mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of environment traits
pub mod mocks {
    use cartflow_catalog::{Product, ProductApi, ProductApiError};
    use cartflow_core::environment::Clock;
    use chrono::{DateTime, Utc};
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A clock pinned to a single instant, so timestamps in tests are
    /// reproducible
    ///
    /// ```
    /// use cartflow_testing::mocks::FixedClock;
    /// use cartflow_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// A clock that always answers `time`
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// The conventional test clock, pinned to 2025-06-15 12:00:00 UTC
    #[must_use]
    pub fn test_clock() -> FixedClock {
        // 1_749_988_800 = 2025-06-15T12:00:00Z, well within chrono's range
        FixedClock::new(DateTime::from_timestamp(1_749_988_800, 0).unwrap_or_default())
    }

    /// Product API double answering every fetch with a canned result
    ///
    /// Records how many times it was called, so tests can assert that an
    /// action triggered (or did not trigger) a fetch.
    #[derive(Debug)]
    pub struct StubProductApi {
        result: Result<Vec<Product>, ProductApiError>,
        calls: AtomicUsize,
    }

    impl StubProductApi {
        /// A stub whose fetches all succeed with the given catalog
        #[must_use]
        pub const fn succeeding(products: Vec<Product>) -> Self {
            Self {
                result: Ok(products),
                calls: AtomicUsize::new(0),
            }
        }

        /// A stub whose fetches all fail with the given error
        #[must_use]
        pub const fn failing(error: ProductApiError) -> Self {
            Self {
                result: Err(error),
                calls: AtomicUsize::new(0),
            }
        }

        /// Number of fetches performed so far
        #[must_use]
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ProductApi for StubProductApi {
        fn fetch_products(&self) -> BoxFuture<'_, Result<Vec<Product>, ProductApiError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = self.result.clone();
            Box::pin(async move { result })
        }
    }
}

pub use mocks::{FixedClock, StubProductApi, test_clock};

#[cfg(test)]
mod tests {
    use super::*;
    use cartflow_catalog::{ProductApi, ProductApiError};
    use cartflow_core::environment::Clock;

    #[test]
    fn fixed_clock_is_deterministic() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_clock_is_pinned_to_the_conventional_instant() {
        assert_eq!(
            test_clock().now().to_rfc3339(),
            "2025-06-15T12:00:00+00:00"
        );
    }

    #[test]
    fn stub_api_counts_calls() {
        let stub = StubProductApi::failing(ProductApiError::Status(500));
        assert_eq!(stub.calls(), 0);

        let result = futures::executor::block_on(stub.fetch_products());
        assert_eq!(result, Err(ProductApiError::Status(500)));
        assert_eq!(stub.calls(), 1);
    }
}
