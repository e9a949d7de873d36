// server/src/tasks.rs

//! Background preparation tasks and their dispatch.
//!
//! `prepare_order` is the domain logic a worker runs for each submitted
//! order; `OrderTaskRouter` plugs it into backburner's worker loop with an
//! explicit match over task kinds.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument};

use backburner::{QueueError, QueueResult, TaskEnvelope, TaskRouter};

use crate::catalog;
use crate::models::Order;

/// Task kind tag for order preparation payloads.
pub const PREPARE_ORDER_TASK: &str = "prepare_order";

/// Terminal outcome of preparing an order. These are domain results, not
/// errors: the worker always completes and produces one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum PrepOutcome {
  #[serde(rename = "READY")]
  Ready,
  #[serde(rename = "ERROR")]
  Error { message: String },
}

/// Prepares an order: validates each item against the catalog and simulates
/// the physical preparation time.
///
/// Validation stops at the first missing item; later items are never
/// evaluated. Each valid item suspends for `wait_time × quantity` time
/// units (`time_unit` is one second in production).
#[instrument(name = "tasks::prepare_order", skip(order, time_unit), fields(order_id = ?order.id, items = order.order_items.len()))]
pub async fn prepare_order(order: &Order, time_unit: Duration) -> PrepOutcome {
  if order.order_items.is_empty() {
    return PrepOutcome::Error {
      message: "Order has no items".to_string(),
    };
  }

  for item in &order.order_items {
    let munchkin = match catalog::get(&item.name) {
      Some(m) => m,
      None => {
        return PrepOutcome::Error {
          message: format!("{} not found", item.name),
        };
      }
    };

    info!(name = %item.name, quantity = item.quantity, wait_time = munchkin.wait_time, "Preparing item.");
    let units = munchkin.wait_time.saturating_mul(item.quantity.max(0) as u64);
    tokio::time::sleep(time_unit.saturating_mul(units.min(u32::MAX as u64) as u32)).await;
  }

  PrepOutcome::Ready
}

/// Routes queue envelopes to the preparation logic.
pub struct OrderTaskRouter {
  time_unit: Duration,
}

impl OrderTaskRouter {
  pub fn new(time_unit: Duration) -> Self {
    OrderTaskRouter { time_unit }
  }
}

#[async_trait]
impl TaskRouter for OrderTaskRouter {
  async fn route(&self, envelope: &TaskEnvelope) -> QueueResult<serde_json::Value> {
    match envelope.kind.as_str() {
      PREPARE_ORDER_TASK => {
        let order: Order = envelope.payload_as().map_err(|e| QueueError::Serialization {
          kind: envelope.kind.clone(),
          source: e,
        })?;
        let outcome = prepare_order(&order, self.time_unit).await;
        serde_json::to_value(&outcome).map_err(|e| QueueError::Serialization {
          kind: envelope.kind.clone(),
          source: e,
        })
      }
      other => Err(QueueError::UnknownKind { kind: other.to_string() }),
    }
  }
}
