//! Durable task queue boundary.
//!
//! ## Design
//!
//! - Tasks are submitted to a **named** queue with a delivery method, a schedule
//!   and a flat string parameter set
//! - Push queues invoke a handler path themselves; pull queues wait for a
//!   worker to lease tasks
//! - Delivery is at-least-once; this layer never deduplicates
//!
//! ## Components
//!
//! - `QueueTask` / `TaskParams`: the wire-level task description
//! - `QueueClient`: submission boundary to the external delivery service
//! - `InMemoryTaskQueue`: in-process queue for tests/dev (push + pull leasing)
//! - `FlakyQueueClient`: fault-injecting wrapper for retry tests

pub mod client;
pub mod in_memory;
pub mod task;

pub use client::{QueueClient, QueueError};
pub use in_memory::{FlakyQueueClient, InMemoryTaskQueue, LeasedTask};
pub use task::{Method, QueueTask, Schedule, Service, TaskId, TaskParams};
