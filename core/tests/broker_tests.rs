// tests/broker_tests.rs
mod common;

use common::*;
use backburner::TaskHandle;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Job {
  label: String,
  weight: i64,
}

#[tokio::test]
async fn test_enqueue_returns_distinct_handles_immediately() {
  setup_tracing();
  let broker = test_broker().await;

  let a = broker.enqueue("job", &Job { label: "a".into(), weight: 1 }).await.unwrap();
  let b = broker.enqueue("job", &Job { label: "b".into(), weight: 2 }).await.unwrap();

  assert_ne!(a, b);
  assert_eq!(broker.depth().await.unwrap(), 2);
}

#[tokio::test]
async fn test_unknown_handle_reads_as_not_ready() {
  setup_tracing();
  let broker = test_broker().await;

  let bogus = TaskHandle::from("no-such-handle");
  assert!(!broker.is_result_ready(&bogus).await.unwrap());
  assert_eq!(broker.get_result(&bogus).await.unwrap(), None);
}

#[tokio::test]
async fn test_publish_makes_result_ready_and_retrievable() {
  setup_tracing();
  let broker = test_broker().await;

  let handle = broker.enqueue("job", &Job { label: "x".into(), weight: 3 }).await.unwrap();
  assert!(!broker.is_result_ready(&handle).await.unwrap());

  broker.publish_result(&handle, &json!({"status": "done"})).await.unwrap();

  assert!(broker.is_result_ready(&handle).await.unwrap());
  assert_eq!(broker.get_result(&handle).await.unwrap(), Some(json!({"status": "done"})));
}

#[tokio::test]
async fn test_publish_replaces_previous_result() {
  setup_tracing();
  let broker = test_broker().await;

  let handle = broker.enqueue("job", &Job { label: "x".into(), weight: 1 }).await.unwrap();
  broker.publish_result(&handle, &json!({"attempt": 1})).await.unwrap();
  broker.publish_result(&handle, &json!({"attempt": 2})).await.unwrap();

  assert_eq!(broker.get_result(&handle).await.unwrap(), Some(json!({"attempt": 2})));
}

#[tokio::test]
async fn test_dequeue_claims_oldest_first_and_round_trips_payload() {
  setup_tracing();
  let broker = test_broker().await;

  let first = Job { label: "first".into(), weight: 1 };
  let second = Job { label: "second".into(), weight: 2 };
  broker.enqueue("job", &first).await.unwrap();
  broker.enqueue("job", &second).await.unwrap();

  let env = broker.dequeue(Duration::from_secs(60)).await.unwrap().expect("a task");
  assert_eq!(env.kind, "job");
  assert_eq!(env.payload_as::<Job>().unwrap(), first);

  let env2 = broker.dequeue(Duration::from_secs(60)).await.unwrap().expect("second task");
  assert_eq!(env2.payload_as::<Job>().unwrap(), second);

  // Both are claimed now; nothing deliverable within the visibility window.
  assert!(broker.dequeue(Duration::from_secs(60)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_ack_removes_task_from_queue() {
  setup_tracing();
  let broker = test_broker().await;

  broker.enqueue("job", &Job { label: "x".into(), weight: 1 }).await.unwrap();
  let env = broker.dequeue(Duration::from_secs(60)).await.unwrap().expect("a task");

  broker.ack(&env.handle()).await.unwrap();
  assert_eq!(broker.depth().await.unwrap(), 0);
}

#[tokio::test]
async fn test_unacked_claim_redelivers_after_visibility_timeout() {
  setup_tracing();
  let broker = test_broker().await;

  let handle = broker.enqueue("job", &Job { label: "x".into(), weight: 1 }).await.unwrap();

  let visibility = Duration::from_millis(50);
  let env = broker.dequeue(visibility).await.unwrap().expect("first delivery");
  assert_eq!(env.handle(), handle);

  // Claim still fresh: not deliverable.
  assert!(broker.dequeue(visibility).await.unwrap().is_none());

  tokio::time::sleep(Duration::from_millis(70)).await;

  let redelivered = broker.dequeue(visibility).await.unwrap().expect("re-delivery");
  assert_eq!(redelivered.handle(), handle);
}
