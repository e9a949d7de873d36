// core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue storage failure. Source: {source}")]
    Storage {
        #[from]
        source: sqlx::Error,
    },

    #[error("Payload serialization failed for task kind '{kind}'. Source: {source}")]
    Serialization {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Result payload for handle '{handle}' is not valid JSON. Source: {source}")]
    ResultDecode {
        handle: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Error in user-provided task router. Source: {source}")]
    Router {
        #[source]
        source: AnyhowError,
    },

    #[error("No route for task kind '{kind}'")]
    UnknownKind { kind: String },

    #[error("Internal queue error: {0}")]
    Internal(String),
}

// This is the key conversion backburner provides for external errors raised
// inside a TaskRouter implementation.
impl From<AnyhowError> for QueueError {
  fn from(err: AnyhowError) -> Self {
    QueueError::Router { source: err }
  }
}

impl QueueError {
  /// Whether the error is transient storage trouble, as opposed to a
  /// permanent property of the task itself (bad payload, unknown kind).
  /// Transient failures leave the task unacknowledged so it re-delivers;
  /// permanent ones discard the task as poison.
  pub fn is_transient(&self) -> bool {
    matches!(self, QueueError::Storage { .. } | QueueError::Router { .. } | QueueError::Internal(_))
  }
}

pub type QueueResult<T, E = QueueError> = std::result::Result<T, E>;
