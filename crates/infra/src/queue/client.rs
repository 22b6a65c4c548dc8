//! Submission boundary to the external task delivery service.

use std::sync::Arc;

use super::task::{QueueTask, TaskId};

/// Queue client abstraction.
///
/// Implementations hand a task to a durable delivery service which guarantees
/// eventual at-least-once delivery. They must be safe for concurrent use: the
/// same client is shared by every caller in the process.
pub trait QueueClient: Send + Sync {
    /// Submit `task` to the queue named `queue`.
    fn submit(&self, queue: &str, task: &QueueTask) -> Result<TaskId, QueueError>;
}

/// Queue submission error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// The service is temporarily unavailable; the same submission may succeed later.
    #[error("transient queue failure: {0}")]
    Transient(String),
    /// The submission was rejected and will not succeed on retry.
    #[error("queue rejected task: {0}")]
    Permanent(String),
    #[error("unknown queue: {0}")]
    UnknownQueue(String),
}

impl QueueError {
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    pub fn permanent(msg: impl Into<String>) -> Self {
        Self::Permanent(msg.into())
    }

    /// Whether retrying the same submission may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, QueueError::Transient(_))
    }
}

impl<Q> QueueClient for Arc<Q>
where
    Q: QueueClient + ?Sized,
{
    fn submit(&self, queue: &str, task: &QueueTask) -> Result<TaskId, QueueError> {
        (**self).submit(queue, task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_errors_are_transient() {
        assert!(QueueError::transient("backend unavailable").is_transient());
        assert!(!QueueError::permanent("task too large").is_transient());
        assert!(!QueueError::UnknownQueue("nope".into()).is_transient());
    }

    #[test]
    fn error_display_includes_detail() {
        let err = QueueError::transient("deadline exceeded");
        assert!(err.to_string().contains("deadline exceeded"));
    }
}
