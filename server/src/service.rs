// server/src/service.rs

//! Order orchestration: the contract between submission, persistence, task
//! dispatch and status polling.

use serde_json::json;
use tracing::{info, instrument, warn};

use backburner::{Broker, TaskHandle};

use crate::errors::{AppError, Result};
use crate::models::Order;
use crate::store::OrderStore;
use crate::tasks::PREPARE_ORDER_TASK;

/// There is no stored status column anywhere: an order's current status is
/// derived at query time by polling its task handle.
#[derive(Clone)]
pub struct OrderService {
  store: OrderStore,
  broker: Broker,
}

impl OrderService {
  pub fn new(store: OrderStore, broker: Broker) -> Self {
    OrderService { store, broker }
  }

  pub fn store(&self) -> &OrderStore {
    &self.store
  }

  /// Persists the order, enqueues its preparation, and writes the task
  /// handle back onto the order row. The enqueued payload is the order as
  /// persisted, including the generated item ids.
  ///
  /// If enqueueing fails after persistence succeeded, the request fails with
  /// an infrastructure error and the order stays stored with a NULL
  /// `task_id` — a recoverable state picked up by [`Self::reenqueue_stranded`].
  #[instrument(name = "OrderService::submit_order", skip(self, order), fields(customer_name = %order.customer_name))]
  pub async fn submit_order(&self, order: Order) -> Result<Order> {
    if order.customer_name.trim().is_empty() {
      return Err(AppError::Validation("customer_name must not be empty".to_string()));
    }

    let mut order = self.store.add_order(order).await?;

    let handle = self.broker.enqueue(PREPARE_ORDER_TASK, &order).await?;
    order.task_id = Some(handle.to_string());

    self.store.update_order(&mut order).await?;
    info!(order_id = ?order.id, task_id = %handle, "Order submitted and preparation enqueued.");
    Ok(order)
  }

  /// All orders, newest first.
  pub async fn list_orders(&self) -> Result<Vec<Order>> {
    Ok(self.store.get_orders().await?)
  }

  /// Derives the current status for a task handle:
  /// - no result yet (or unknown handle) → `PENDING`
  /// - result present but empty → `UNKNOWN`
  /// - otherwise the published result payload verbatim (`READY` / `ERROR`).
  #[instrument(name = "OrderService::poll_status", skip(self))]
  pub async fn poll_status(&self, task_id: &str) -> Result<serde_json::Value> {
    let handle = TaskHandle::from(task_id);

    if !self.broker.is_result_ready(&handle).await? {
      return Ok(json!({ "status": "PENDING" }));
    }

    match self.broker.get_result(&handle).await? {
      Some(value) if !value.is_null() => Ok(value),
      _ => Ok(json!({ "status": "UNKNOWN" })),
    }
  }

  /// Claims an order: deletes the order and its items together. Claiming an
  /// already-claimed or never-existing order is not an error — the client's
  /// intent (the order is gone) is satisfied either way.
  #[instrument(name = "OrderService::claim_order", skip(self))]
  pub async fn claim_order(&self, order_id: i64) -> Result<()> {
    self.store.delete_order(order_id).await?;
    Ok(())
  }

  /// Repair path for orders persisted without a task handle (enqueue failed
  /// mid-submit): re-enqueues preparation for each and writes the handle
  /// back. Returns how many orders were repaired.
  #[instrument(name = "OrderService::reenqueue_stranded", skip(self))]
  pub async fn reenqueue_stranded(&self) -> Result<usize> {
    let stranded = self.store.get_stranded_orders().await?;
    let count = stranded.len();
    if count > 0 {
      warn!(count, "Found orders without a task handle; re-enqueueing.");
    }

    for mut order in stranded {
      let handle = self.broker.enqueue(PREPARE_ORDER_TASK, &order).await?;
      order.task_id = Some(handle.to_string());
      self.store.update_order(&mut order).await?;
      info!(order_id = ?order.id, task_id = %handle, "Stranded order re-enqueued.");
    }
    Ok(count)
  }
}
