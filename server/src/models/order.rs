// server/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::order_item::OrderItem;

/// An order as submitted by a customer and as persisted in the store.
///
/// `id` and `created_at` are assigned by the store; `task_id` is assigned
/// only after the preparation task was enqueued successfully. `total` is
/// client-supplied and NOT validated against the item prices (known soft
/// invariant).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
  #[serde(default)]
  pub id: Option<i64>,
  pub customer_name: String,
  pub total: f64,
  #[serde(default)]
  pub task_id: Option<String>,
  #[serde(default)]
  #[sqlx(skip)]
  pub order_items: Vec<OrderItem>,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
}
