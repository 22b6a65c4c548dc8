//! Infrastructure layer: task queue boundary and transient-failure retry.

pub mod queue;
pub mod retry;

pub use queue::{
    FlakyQueueClient, InMemoryTaskQueue, LeasedTask, Method, QueueClient, QueueError, QueueTask,
    Schedule, Service, TaskId, TaskParams,
};
pub use retry::{BackoffStrategy, FakeSleeper, Retrier, RetryPolicy, Sleeper, ThreadSleeper};
