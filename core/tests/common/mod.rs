// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use backburner::Broker;
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

/// Fresh in-memory broker with schema created.
pub async fn test_broker() -> Broker {
  let broker = Broker::in_memory().await.expect("in-memory broker");
  broker.startup().await.expect("queue schema");
  broker
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
