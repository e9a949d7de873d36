// src/lib.rs

//! Backburner: a durable, at-least-once ASYNC task queue for Rust.
//!
//! Backburner decouples the latency of accepting work from the latency of
//! performing it:
//!  - `enqueue` durably records a serializable payload and returns an opaque
//!    `TaskHandle` immediately, without waiting for execution.
//!  - A `Worker` loop in one or more processes claims tasks out-of-band and
//!    dispatches them through a `TaskRouter` you implement.
//!  - Results are published to a result backend keyed by the handle, and can
//!    be polled non-blockingly with `is_result_ready` / `get_result`.
//!
//! Delivery is at-least-once: a claimed task that is never acknowledged is
//! re-delivered after a visibility timeout. There is no ordering guarantee
//! across distinct tasks and no affinity between the enqueuing and the
//! executing process. The queue and the result backend live together in one
//! SQLite database, independent of any application database.

// Declare modules according to the planned structure
pub mod broker;
pub mod error;
pub mod task;
pub mod worker;

// --- Re-exports for the Public API ---

// The broker is the single entry point for both sides of the queue:
// producers enqueue and poll results; workers dequeue, publish and ack.
pub use crate::broker::Broker;

pub use crate::task::{TaskEnvelope, TaskHandle};

pub use crate::worker::{shutdown_channel, TaskRouter, Worker, WorkerOptions};

pub use crate::error::{QueueError, QueueResult};
