// core/src/worker.rs

//! The generic worker loop: dequeue → route → publish → ack.
//!
//! Applications implement [`TaskRouter`] with an explicit `match` over their
//! task kinds; the loop itself stays ignorant of any domain. Run one `Worker`
//! per process (or several — claims are exclusive within a visibility
//! window), typically in a dedicated worker binary.

use crate::broker::Broker;
use crate::error::QueueResult;
use crate::task::TaskEnvelope;

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

/// Maps a claimed task to its result value.
///
/// Implementors dispatch on `envelope.kind` with an explicit `match` and
/// deserialize the payload themselves via [`TaskEnvelope::payload_as`].
/// Domain-level failure states belong IN the returned value; an `Err` means
/// the task could not be executed at all.
#[async_trait]
pub trait TaskRouter: Send + Sync {
  async fn route(&self, envelope: &TaskEnvelope) -> QueueResult<serde_json::Value>;
}

#[derive(Debug, Clone)]
pub struct WorkerOptions {
  /// How long to sleep when the queue is empty.
  pub poll_interval: Duration,
  /// How long a claim blocks re-delivery of an unacknowledged task.
  /// Must exceed the longest expected task execution.
  pub visibility_timeout: Duration,
}

impl Default for WorkerOptions {
  fn default() -> Self {
    WorkerOptions {
      poll_interval: Duration::from_millis(250),
      visibility_timeout: Duration::from_secs(300),
    }
  }
}

/// The worker loop. Owns a broker clone, a router, and a shutdown signal.
pub struct Worker<R: TaskRouter> {
  broker: Broker,
  router: R,
  options: WorkerOptions,
  shutdown: watch::Receiver<bool>,
}

/// Creates a shutdown signal pair for [`Worker::run`]. Send `true` to stop
/// the loop after the in-flight task (if any) completes.
pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
  watch::channel(false)
}

impl<R: TaskRouter> Worker<R> {
  pub fn new(broker: Broker, router: R, options: WorkerOptions, shutdown: watch::Receiver<bool>) -> Self {
    Worker {
      broker,
      router,
      options,
      shutdown,
    }
  }

  /// Runs until the shutdown signal flips. Storage errors on dequeue are
  /// logged and retried after `poll_interval`; they never kill the loop.
  pub async fn run(mut self) {
    info!("Worker loop started.");
    loop {
      if *self.shutdown.borrow() {
        break;
      }

      match self.broker.dequeue(self.options.visibility_timeout).await {
        Ok(Some(envelope)) => self.process(&envelope).await,
        Ok(None) => self.idle().await,
        Err(e) => {
          error!(error = %e, "Dequeue failed; backing off.");
          self.idle().await;
        }
      }
    }
    info!("Worker loop stopped.");
  }

  /// Executes one claimed task. The ordering is deliberate: the result is
  /// published before the ack, so a crash between the two re-delivers the
  /// task rather than losing its result.
  #[instrument(name = "Worker::process", skip(self, envelope), fields(handle = %envelope.handle, kind = %envelope.kind))]
  async fn process(&self, envelope: &TaskEnvelope) {
    let handle = envelope.handle();
    match self.router.route(envelope).await {
      Ok(result) => {
        if let Err(e) = self.broker.publish_result(&handle, &result).await {
          error!(error = %e, "Failed to publish result; task will re-deliver.");
          return;
        }
        if let Err(e) = self.broker.ack(&handle).await {
          // The result is already visible; re-delivery would merely
          // recompute and republish it.
          warn!(error = %e, "Failed to ack completed task.");
        }
      }
      Err(e) if e.is_transient() => {
        warn!(error = %e, "Task execution failed; task will re-deliver.");
      }
      Err(e) => {
        // Poison task: the payload or kind can never succeed. Drop it so it
        // cannot block the queue.
        error!(error = %e, "Discarding unprocessable task.");
        if let Err(ack_err) = self.broker.ack(&handle).await {
          warn!(error = %ack_err, "Failed to discard unprocessable task.");
        }
      }
    }
  }

  async fn idle(&mut self) {
    tokio::select! {
      _ = tokio::time::sleep(self.options.poll_interval) => {}
      _ = self.shutdown.changed() => {}
    }
  }
}
