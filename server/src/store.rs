// server/src/store.rs

//! The order store: durable repository of orders and their line items.
//!
//! Owns the relational shape — `orders` 1—N `order_items` with a foreign key
//! from item to order — and is the only component that touches these tables.
//! In-memory `Order` values are transient; this store's rows are the truth.

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::models::{Order, OrderItem};

/// Connects to the order database, creating the file if missing.
pub async fn connect_pool(url: &str) -> Result<SqlitePool, sqlx::Error> {
  let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
  SqlitePoolOptions::new().connect_with(options).await
}

/// Ephemeral in-memory pool, pinned to one connection (each new SQLite
/// connection would otherwise see its own empty `:memory:` database).
pub async fn in_memory_pool() -> Result<SqlitePool, sqlx::Error> {
  let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
  SqlitePoolOptions::new()
    .max_connections(1)
    .idle_timeout(None::<Duration>)
    .max_lifetime(None::<Duration>)
    .connect_with(options)
    .await
}

#[derive(Clone)]
pub struct OrderStore {
  pool: SqlitePool,
}

impl OrderStore {
  pub fn new(pool: SqlitePool) -> Self {
    OrderStore { pool }
  }

  /// Creates the order tables if they do not exist yet. Call once per
  /// process after connecting.
  pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
    sqlx::query(
      "CREATE TABLE IF NOT EXISTS orders (
         id INTEGER PRIMARY KEY,
         customer_name TEXT NOT NULL,
         total REAL NOT NULL,
         task_id TEXT,
         created_at TEXT NOT NULL
       )",
    )
    .execute(&self.pool)
    .await?;

    sqlx::query(
      "CREATE TABLE IF NOT EXISTS order_items (
         id INTEGER PRIMARY KEY,
         order_id INTEGER NOT NULL,
         name TEXT NOT NULL,
         quantity INTEGER NOT NULL,
         price REAL NOT NULL,
         FOREIGN KEY (order_id) REFERENCES orders (id)
       )",
    )
    .execute(&self.pool)
    .await?;

    debug!("Order schema ready.");
    Ok(())
  }

  /// Persists a new order and each of its items, assigning server-generated
  /// ids and the creation timestamp. Returns the order with ids populated.
  #[instrument(name = "OrderStore::add_order", skip(self, order), fields(customer_name = %order.customer_name))]
  pub async fn add_order(&self, mut order: Order) -> Result<Order, sqlx::Error> {
    let created_at = Utc::now();
    let result = sqlx::query("INSERT INTO orders (customer_name, total, created_at) VALUES (?1, ?2, ?3)")
      .bind(&order.customer_name)
      .bind(order.total)
      .bind(created_at)
      .execute(&self.pool)
      .await?;

    order.id = Some(result.last_insert_rowid());
    order.created_at = Some(created_at);

    for item in &mut order.order_items {
      item.order_id = order.id;
      let r = sqlx::query("INSERT INTO order_items (order_id, name, quantity, price) VALUES (?1, ?2, ?3, ?4)")
        .bind(item.order_id)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.price)
        .execute(&self.pool)
        .await?;
      item.id = Some(r.last_insert_rowid());
    }

    debug!(order_id = ?order.id, items = order.order_items.len(), "Order persisted.");
    Ok(order)
  }

  /// Updates the mutable order fields (`customer_name`, `total`, `task_id`)
  /// by id, and inserts or updates each item depending on whether it already
  /// has an id. New items get their ids written back into `order`.
  ///
  /// Items removed from the in-memory list are NOT deleted: this path is
  /// append/update-only. Known limitation.
  #[instrument(name = "OrderStore::update_order", skip(self, order), fields(order_id = ?order.id))]
  pub async fn update_order(&self, order: &mut Order) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET customer_name = ?1, total = ?2, task_id = ?3 WHERE id = ?4")
      .bind(&order.customer_name)
      .bind(order.total)
      .bind(&order.task_id)
      .bind(order.id)
      .execute(&self.pool)
      .await?;

    let order_id = order.id;
    for item in &mut order.order_items {
      if item.id.is_none() {
        item.order_id = order_id;
        let r = sqlx::query("INSERT INTO order_items (order_id, name, quantity, price) VALUES (?1, ?2, ?3, ?4)")
          .bind(item.order_id)
          .bind(&item.name)
          .bind(item.quantity)
          .bind(item.price)
          .execute(&self.pool)
          .await?;
        item.id = Some(r.last_insert_rowid());
      } else {
        sqlx::query("UPDATE order_items SET name = ?1, quantity = ?2, price = ?3 WHERE id = ?4")
          .bind(&item.name)
          .bind(item.quantity)
          .bind(item.price)
          .bind(item.id)
          .execute(&self.pool)
          .await?;
      }
    }
    Ok(())
  }

  /// All orders, newest first, each with its items in insertion order.
  /// `id DESC` breaks creation-timestamp ties deterministically.
  #[instrument(name = "OrderStore::get_orders", skip(self))]
  pub async fn get_orders(&self) -> Result<Vec<Order>, sqlx::Error> {
    let mut orders: Vec<Order> = sqlx::query_as(
      "SELECT id, customer_name, total, task_id, created_at FROM orders ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(&self.pool)
    .await?;

    for order in &mut orders {
      order.order_items = self.items_for(order.id).await?;
    }
    Ok(orders)
  }

  /// One order with its items, or `None` if absent.
  #[instrument(name = "OrderStore::get_order", skip(self))]
  pub async fn get_order(&self, order_id: i64) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> =
      sqlx::query_as("SELECT id, customer_name, total, task_id, created_at FROM orders WHERE id = ?1")
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

    match order {
      None => Ok(None),
      Some(mut order) => {
        order.order_items = self.items_for(order.id).await?;
        Ok(Some(order))
      }
    }
  }

  /// Orders that were persisted but never got a task handle written back
  /// (enqueue failed after persistence). Input to the repair path.
  pub async fn get_stranded_orders(&self) -> Result<Vec<Order>, sqlx::Error> {
    let mut orders: Vec<Order> = sqlx::query_as(
      "SELECT id, customer_name, total, task_id, created_at FROM orders WHERE task_id IS NULL ORDER BY id ASC",
    )
    .fetch_all(&self.pool)
    .await?;

    for order in &mut orders {
      order.order_items = self.items_for(order.id).await?;
    }
    Ok(orders)
  }

  /// Removes the order row and all item rows referencing it in a single
  /// transaction. Deleting an absent order is a no-op.
  #[instrument(name = "OrderStore::delete_order", skip(self))]
  pub async fn delete_order(&self, order_id: i64) -> Result<(), sqlx::Error> {
    let mut tx = self.pool.begin().await?;
    sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
      .bind(order_id)
      .execute(&mut *tx)
      .await?;
    sqlx::query("DELETE FROM orders WHERE id = ?1")
      .bind(order_id)
      .execute(&mut *tx)
      .await?;
    tx.commit().await?;
    Ok(())
  }

  async fn items_for(&self, order_id: Option<i64>) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT id, order_id, name, quantity, price FROM order_items WHERE order_id = ?1 ORDER BY id ASC")
      .bind(order_id)
      .fetch_all(&self.pool)
      .await
  }
}
