// core/src/broker.rs

//! The `Broker`: both faces of the queue behind one connection handle.
//!
//! Producers call `enqueue` / `is_result_ready` / `get_result`; worker loops
//! call `dequeue` / `publish_result` / `ack`. The broker is a process-wide
//! handle with an explicit startup/shutdown lifecycle — construct it once at
//! process start, inject it where needed, and close it on the way out.

use crate::error::{QueueError, QueueResult};
use crate::task::{TaskEnvelope, TaskHandle};

use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, instrument};

/// Durable task queue and result backend over a SQLite pool.
///
/// Cloning is cheap (the pool is reference-counted); clones share the same
/// underlying database.
#[derive(Clone)]
pub struct Broker {
  pool: SqlitePool,
}

impl Broker {
  /// Connects to the queue database, creating the file if missing.
  ///
  /// `url` is a sqlx SQLite URL, e.g. `sqlite://queue.db`.
  pub async fn connect(url: &str) -> QueueResult<Self> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    Ok(Broker { pool })
  }

  /// An ephemeral in-memory broker. Useful for tests and for running the
  /// whole system in a single process without durability.
  ///
  /// The pool is pinned to a single connection; SQLite gives every new
  /// connection its own private `:memory:` database.
  pub async fn in_memory() -> QueueResult<Self> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePoolOptions::new()
      .max_connections(1)
      .idle_timeout(None::<Duration>)
      .max_lifetime(None::<Duration>)
      .connect_with(options)
      .await?;
    Ok(Broker { pool })
  }

  /// Creates the queue and result tables if they do not exist yet.
  /// Call once per process after `connect`.
  #[instrument(name = "Broker::startup", skip(self))]
  pub async fn startup(&self) -> QueueResult<()> {
    sqlx::query(
      "CREATE TABLE IF NOT EXISTS tasks (
         id INTEGER PRIMARY KEY,
         handle TEXT NOT NULL UNIQUE,
         kind TEXT NOT NULL,
         payload TEXT NOT NULL,
         enqueued_at INTEGER NOT NULL,
         claimed_at INTEGER
       )",
    )
    .execute(&self.pool)
    .await?;

    sqlx::query(
      "CREATE TABLE IF NOT EXISTS task_results (
         handle TEXT PRIMARY KEY,
         payload TEXT NOT NULL,
         completed_at INTEGER NOT NULL
       )",
    )
    .execute(&self.pool)
    .await?;

    debug!("Queue schema ready.");
    Ok(())
  }

  /// Closes the underlying pool. In-flight operations complete first.
  pub async fn shutdown(&self) {
    self.pool.close().await;
  }

  /// Durably records a task for out-of-band execution and returns its handle
  /// immediately. Safe to call concurrently with other enqueues.
  #[instrument(name = "Broker::enqueue", skip(self, payload), fields(kind = %kind))]
  pub async fn enqueue<T: Serialize>(&self, kind: &str, payload: &T) -> QueueResult<TaskHandle> {
    let body = serde_json::to_string(payload).map_err(|e| QueueError::Serialization {
      kind: kind.to_string(),
      source: e,
    })?;
    let handle = TaskHandle::generate();

    sqlx::query("INSERT INTO tasks (handle, kind, payload, enqueued_at) VALUES (?1, ?2, ?3, ?4)")
      .bind(handle.as_str())
      .bind(kind)
      .bind(&body)
      .bind(now_millis())
      .execute(&self.pool)
      .await?;

    debug!(handle = %handle, "Task enqueued.");
    Ok(handle)
  }

  /// Claims the oldest deliverable task, if any.
  ///
  /// A task is deliverable when it has never been claimed, or when its claim
  /// is older than `visibility_timeout` — an unacknowledged claim eventually
  /// re-delivers, which is what makes delivery at-least-once. The claim is a
  /// single UPDATE, so concurrent workers never receive the same task within
  /// one visibility window.
  #[instrument(name = "Broker::dequeue", skip(self, visibility_timeout))]
  pub async fn dequeue(&self, visibility_timeout: Duration) -> QueueResult<Option<TaskEnvelope>> {
    let now = now_millis();
    let cutoff = now - visibility_timeout.as_millis() as i64;

    let envelope: Option<TaskEnvelope> = sqlx::query_as(
      "UPDATE tasks SET claimed_at = ?1
       WHERE id = (
         SELECT id FROM tasks
         WHERE claimed_at IS NULL OR claimed_at < ?2
         ORDER BY id ASC
         LIMIT 1
       )
       RETURNING handle, kind, payload, enqueued_at",
    )
    .bind(now)
    .bind(cutoff)
    .fetch_optional(&self.pool)
    .await?;

    if let Some(env) = &envelope {
      debug!(handle = %env.handle, kind = %env.kind, "Task claimed.");
    }
    Ok(envelope)
  }

  /// Publishes (or replaces) the result for a handle. The result becomes
  /// visible to `is_result_ready` / `get_result` atomically.
  #[instrument(name = "Broker::publish_result", skip(self, result), fields(handle = %handle))]
  pub async fn publish_result(&self, handle: &TaskHandle, result: &serde_json::Value) -> QueueResult<()> {
    sqlx::query(
      "INSERT INTO task_results (handle, payload, completed_at) VALUES (?1, ?2, ?3)
       ON CONFLICT(handle) DO UPDATE SET payload = excluded.payload, completed_at = excluded.completed_at",
    )
    .bind(handle.as_str())
    .bind(result.to_string())
    .bind(now_millis())
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  /// Acknowledges a claimed task, removing it from the queue. A task that is
  /// never acked re-delivers after the visibility timeout.
  #[instrument(name = "Broker::ack", skip(self), fields(handle = %handle))]
  pub async fn ack(&self, handle: &TaskHandle) -> QueueResult<()> {
    sqlx::query("DELETE FROM tasks WHERE handle = ?1")
      .bind(handle.as_str())
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  /// Non-blocking readiness check. An unknown handle reads as not-ready:
  /// callers cannot distinguish "never enqueued" from "not yet computed".
  pub async fn is_result_ready(&self, handle: &TaskHandle) -> QueueResult<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM task_results WHERE handle = ?1")
      .bind(handle.as_str())
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.is_some())
  }

  /// Returns the last published result for a handle, or `None` when no
  /// result has been published yet.
  pub async fn get_result(&self, handle: &TaskHandle) -> QueueResult<Option<serde_json::Value>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT payload FROM task_results WHERE handle = ?1")
      .bind(handle.as_str())
      .fetch_optional(&self.pool)
      .await?;

    match row {
      None => Ok(None),
      Some((payload,)) => {
        let value = serde_json::from_str(&payload).map_err(|e| QueueError::ResultDecode {
          handle: handle.to_string(),
          source: e,
        })?;
        Ok(Some(value))
      }
    }
  }

  /// Number of tasks currently waiting or claimed. Mostly for observability.
  pub async fn depth(&self) -> QueueResult<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks").fetch_one(&self.pool).await?;
    Ok(count)
  }
}

fn now_millis() -> i64 {
  // System clock regressions would only shorten a visibility window, which
  // at-least-once delivery already tolerates.
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_millis() as i64)
    .unwrap_or(0)
}
