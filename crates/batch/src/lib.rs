//! Deferred task enqueueing for asynchronous operations started by flows.
//!
//! Flows that cannot finish their work inline (re-saving a resource once a
//! pending transfer or grace period lapses, deleting a contact or host after
//! reference checks, refreshing DNS after a host rename) hand it to a task
//! queue through [`AsyncTaskEnqueuer`].
//!
//! ```text
//! flow ──► AsyncTaskEnqueuer ──► Retrier ──► QueueClient ──► async-actions (push)
//!              │                                         ├─► async-delete-pull
//!              └─ typed request ─► TaskParams            └─► async-host-rename-pull
//! ```

pub mod async_task_enqueuer;
pub mod config;
pub mod error;
pub mod params;
pub mod requests;

pub use async_task_enqueuer::{AsyncTaskEnqueuer, MAX_ASYNC_ETA};
pub use config::BatchConfig;
pub use error::{ConfigError, EnqueueError, ParamError};
pub use params::{DeleteTaskParams, DnsRefreshTaskParams, ResaveTaskParams};
pub use requests::{DeleteRequest, DnsRefreshRequest, ResaveRequest};
