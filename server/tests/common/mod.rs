// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use backburner::Broker;
use munchkin_stand::models::{Order, OrderItem};
use munchkin_stand::service::OrderService;
use munchkin_stand::store::{in_memory_pool, OrderStore};
use once_cell::sync::Lazy;
use tracing::Level;

// --- Helper for Tracing Setup (call once per test run if needed) ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Fresh in-memory order store with schema created.
pub async fn test_store() -> OrderStore {
  let pool = in_memory_pool().await.expect("in-memory pool");
  let store = OrderStore::new(pool);
  store.init_schema().await.expect("order schema");
  store
}

/// Fresh in-memory broker with schema created.
pub async fn test_broker() -> Broker {
  let broker = Broker::in_memory().await.expect("in-memory broker");
  broker.startup().await.expect("queue schema");
  broker
}

/// A full service wired to fresh in-memory store and queue.
pub async fn test_service() -> (OrderService, Broker) {
  let store = test_store().await;
  let broker = test_broker().await;
  (OrderService::new(store, broker.clone()), broker)
}

/// Builds a transient (unpersisted) order from `(name, quantity, price)`
/// tuples.
pub fn order(customer_name: &str, items: &[(&str, i64, f64)]) -> Order {
  let order_items = items
    .iter()
    .map(|(name, quantity, price)| OrderItem {
      id: None,
      order_id: None,
      name: name.to_string(),
      quantity: *quantity,
      price: *price,
    })
    .collect();
  Order {
    id: None,
    customer_name: customer_name.to_string(),
    total: items.iter().map(|(_, q, p)| *q as f64 * *p).sum(),
    task_id: None,
    order_items,
    created_at: None,
  }
}

/// Polls `probe` every 10ms until it returns true, panicking after ~2s.
pub async fn eventually<F, Fut>(mut probe: F, what: &str)
where
  F: FnMut() -> Fut,
  Fut: std::future::Future<Output = bool>,
{
  for _ in 0..200 {
    if probe().await {
      return;
    }
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
  }
  panic!("timed out waiting for: {}", what);
}
