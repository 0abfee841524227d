//! Storefront demo binary
//!
//! Wires the catalog feature against the live DummyJSON endpoint and walks
//! the full unidirectional loop: load the catalog, add an item to the cart,
//! observe the projections, shut down.

use cartflow_catalog::{
    AppState, CatalogEnvironment, ProductAction, app_reducer,
    http::{DUMMYJSON_BASE_URL, DummyJsonClient},
    selectors,
};
use cartflow_core::environment::Clock;
use cartflow_runtime::Store;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Wall clock for production use
struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront=debug,cartflow_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Storefront: CartFlow demo ===\n");

    let env = CatalogEnvironment::new(
        Arc::new(SystemClock),
        Arc::new(DummyJsonClient::new(DUMMYJSON_BASE_URL)),
    );
    let store = Store::new(AppState::default(), app_reducer(), env);

    let mut cart_len = store.select(selectors::select_cart_len);

    // Load the catalog and wait for the effect to resolve either way
    println!(">>> Sending: LoadProducts");
    let outcome = store
        .send_and_wait_for(
            ProductAction::LoadProducts,
            ProductAction::is_load_outcome,
            Duration::from_secs(10),
        )
        .await;

    match outcome {
        Ok(ProductAction::LoadProductsSuccess { products }) => {
            println!("Loaded {} products", products.len());
        },
        Ok(ProductAction::LoadProductsFailed { error }) => {
            println!("Load failed: {error}");
        },
        Ok(_) => {},
        Err(error) => {
            println!("Load did not resolve: {error}");
        },
    }

    let first = store
        .state(|s| selectors::select_products(s).first().cloned())
        .await;

    if let Some(product) = first {
        println!("\n>>> Sending: AddToCart({})", product.title);
        let _ = store.send(ProductAction::AddToCart { product }).await;

        println!("Cart length: {}", cart_len.next().await.unwrap_or(0));
        let total = store.state(selectors::select_cart_total).await;
        println!("Cart total: {total:.2}");
    } else {
        println!("\nNothing loaded, skipping cart interaction");
    }

    store.shutdown(Duration::from_secs(5)).await?;
    println!("\nStore drained, bye");

    Ok(())
}
