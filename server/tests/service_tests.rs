// tests/service_tests.rs
mod common;

use common::*;
use backburner::{Worker, WorkerOptions};
use munchkin_stand::errors::AppError;
use munchkin_stand::service::OrderService;
use munchkin_stand::tasks::OrderTaskRouter;
use serde_json::json;
use std::time::Duration;

/// Spawns a preparation worker against the service's queue with a shrunken
/// time unit. Returns the shutdown sender and the join handle.
fn spawn_worker(
  broker: backburner::Broker,
) -> (tokio::sync::watch::Sender<bool>, tokio::task::JoinHandle<()>) {
  let options = WorkerOptions {
    poll_interval: Duration::from_millis(10),
    visibility_timeout: Duration::from_secs(60),
  };
  let router = OrderTaskRouter::new(Duration::from_millis(10));
  let (shutdown_tx, shutdown_rx) = backburner::shutdown_channel();
  let join = tokio::spawn(Worker::new(broker, router, options, shutdown_rx).run());
  (shutdown_tx, join)
}

async fn poll(service: &OrderService, task_id: &str) -> serde_json::Value {
  service.poll_status(task_id).await.unwrap()
}

#[tokio::test]
async fn test_submit_assigns_id_and_task_handle_and_persists_both() {
  setup_tracing();
  let (service, _broker) = test_service().await;

  let submitted = service
    .submit_order(order("Alice", &[("Choco Munchkin", 2, 10.0)]))
    .await
    .unwrap();

  let id = submitted.id.expect("order id");
  let task_id = submitted.task_id.clone().expect("task handle");
  assert!(submitted.order_items.iter().all(|i| i.id.is_some()));

  // The handle write-back reached the store.
  let stored = service.store().get_order(id).await.unwrap().expect("stored order");
  assert_eq!(stored.task_id, Some(task_id));
}

#[tokio::test]
async fn test_submit_rejects_blank_customer_name() {
  setup_tracing();
  let (service, _broker) = test_service().await;

  let result = service.submit_order(order("  ", &[("Choco Munchkin", 1, 10.0)])).await;
  assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_poll_status_is_pending_for_unknown_handle() {
  setup_tracing();
  let (service, _broker) = test_service().await;

  // Unknown handles and not-yet-computed handles are indistinguishable.
  assert_eq!(poll(&service, "no-such-task").await, json!({ "status": "PENDING" }));
}

#[tokio::test]
async fn test_happy_path_pending_then_ready() {
  setup_tracing();
  let (service, broker) = test_service().await;

  let submitted = service
    .submit_order(order("Alice", &[("Choco Munchkin", 2, 10.0)]))
    .await
    .unwrap();
  let task_id = submitted.task_id.clone().unwrap();

  // No worker has run yet: the order is pending.
  assert_eq!(poll(&service, &task_id).await, json!({ "status": "PENDING" }));

  let (shutdown_tx, join) = spawn_worker(broker);

  let probe_service = service.clone();
  let probe_task = task_id.clone();
  eventually(
    move || {
      let s = probe_service.clone();
      let t = probe_task.clone();
      async move { s.poll_status(&t).await.unwrap() == json!({ "status": "READY" }) }
    },
    "order to become READY",
  )
  .await;

  shutdown_tx.send(true).unwrap();
  join.await.unwrap();
}

#[tokio::test]
async fn test_order_with_unknown_item_polls_as_error() {
  setup_tracing();
  let (service, broker) = test_service().await;

  let submitted = service
    .submit_order(order("Alice", &[("Unknown", 1, 0.0), ("Choco Munchkin", 1, 10.0)]))
    .await
    .unwrap();
  let task_id = submitted.task_id.clone().unwrap();

  let (shutdown_tx, join) = spawn_worker(broker);

  let probe_service = service.clone();
  let probe_task = task_id.clone();
  eventually(
    move || {
      let s = probe_service.clone();
      let t = probe_task.clone();
      async move { s.poll_status(&t).await.unwrap() != json!({ "status": "PENDING" }) }
    },
    "validation outcome",
  )
  .await;

  assert_eq!(
    poll(&service, &task_id).await,
    json!({ "status": "ERROR", "message": "Unknown not found" })
  );

  shutdown_tx.send(true).unwrap();
  join.await.unwrap();
}

#[tokio::test]
async fn test_claim_order_is_idempotent() {
  setup_tracing();
  let (service, _broker) = test_service().await;

  let submitted = service
    .submit_order(order("Alice", &[("Choco Munchkin", 1, 10.0)]))
    .await
    .unwrap();
  let id = submitted.id.unwrap();

  service.claim_order(id).await.unwrap();
  assert!(service.store().get_order(id).await.unwrap().is_none());

  // Claiming again (or claiming an order that never existed) still succeeds.
  service.claim_order(id).await.unwrap();
  service.claim_order(987654).await.unwrap();
}

#[tokio::test]
async fn test_reenqueue_stranded_repairs_orders_without_handles() {
  setup_tracing();
  let (service, broker) = test_service().await;

  // Simulate "persisted but enqueue failed": write straight to the store.
  let stranded = service
    .store()
    .add_order(order("stuck", &[("Choco Munchkin", 1, 10.0)]))
    .await
    .unwrap();
  assert!(stranded.task_id.is_none());

  let repaired = service.reenqueue_stranded().await.unwrap();
  assert_eq!(repaired, 1);

  let stored = service.store().get_order(stranded.id.unwrap()).await.unwrap().unwrap();
  assert!(stored.task_id.is_some());
  assert_eq!(broker.depth().await.unwrap(), 1);

  // Nothing left to repair on a second pass.
  assert_eq!(service.reenqueue_stranded().await.unwrap(), 0);
}
