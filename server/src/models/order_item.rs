// server/src/models/order_item.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single line item of an order. `name` is a catalog key; `price` is the
/// unit price at submission time. `id` and `order_id` are immutable once
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
  #[serde(default)]
  pub id: Option<i64>,
  #[serde(default)]
  pub order_id: Option<i64>,
  pub name: String,
  pub quantity: i64,
  pub price: f64,
}
