// core/src/task.rs

//! Task handles and envelopes: the data that crosses the queue.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Opaque handle identifying a unit of enqueued work.
///
/// Returned synchronously by [`crate::Broker::enqueue`] and later used to
/// poll the result backend. Callers should treat the inner string as opaque;
/// it happens to be a UUID today.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskHandle(String);

impl TaskHandle {
  pub(crate) fn generate() -> Self {
    TaskHandle(Uuid::new_v4().to_string())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl From<String> for TaskHandle {
  fn from(raw: String) -> Self {
    TaskHandle(raw)
  }
}

impl From<&str> for TaskHandle {
  fn from(raw: &str) -> Self {
    TaskHandle(raw.to_string())
  }
}

impl fmt::Display for TaskHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// A claimed unit of work, exactly as stored in the queue.
///
/// `payload` is the JSON text the producer enqueued; `kind` is the tag a
/// [`crate::TaskRouter`] dispatches on.
#[derive(Debug, Clone, FromRow)]
pub struct TaskEnvelope {
  pub handle: String,
  pub kind: String,
  pub payload: String,
  /// Unix milliseconds at enqueue time.
  pub enqueued_at: i64,
}

impl TaskEnvelope {
  pub fn handle(&self) -> TaskHandle {
    TaskHandle(self.handle.clone())
  }

  /// Deserializes the JSON payload into the producer's payload type.
  pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
    serde_json::from_str(&self.payload)
  }
}
