//! In-memory task queue and fault injection for tests/dev.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use registry_core::Clock;

use super::client::{QueueClient, QueueError};
use super::task::{QueueTask, TaskId, TaskParams};

#[derive(Debug, Clone)]
struct QueuedTask {
    id: TaskId,
    task: QueueTask,
    eta: DateTime<Utc>,
    lease_expires_at: Option<DateTime<Utc>>,
}

/// A pull task handed to a worker under a lease.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeasedTask {
    pub id: TaskId,
    pub params: TaskParams,
    pub eta: DateTime<Utc>,
}

/// In-process queue service.
///
/// - Only queues registered up front accept tasks
/// - ETAs are stamped from the injected clock at submission time
/// - Pull tasks can be leased once their ETA has passed; an expired lease makes
///   the task visible again (at-least-once)
#[derive(Debug)]
pub struct InMemoryTaskQueue<C> {
    clock: C,
    queues: RwLock<HashMap<String, Vec<QueuedTask>>>,
}

impl<C: Clock> InMemoryTaskQueue<C> {
    pub fn new<I, S>(clock: C, queue_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queues = queue_names
            .into_iter()
            .map(|name| (name.into(), Vec::new()))
            .collect();
        Self {
            clock,
            queues: RwLock::new(queues),
        }
    }

    /// All tasks currently held by `queue`, in submission order.
    pub fn tasks(&self, queue: &str) -> Vec<QueueTask> {
        let queues = self.queues.read().unwrap_or_else(PoisonError::into_inner);
        queues
            .get(queue)
            .map(|tasks| tasks.iter().map(|t| t.task.clone()).collect())
            .unwrap_or_default()
    }

    /// Total number of tasks held across all queues.
    pub fn total_tasks(&self) -> usize {
        let queues = self.queues.read().unwrap_or_else(PoisonError::into_inner);
        queues.values().map(Vec::len).sum()
    }

    /// Lease up to `max` eligible pull tasks from `queue` for `lease_duration`.
    pub fn lease_tasks(
        &self,
        queue: &str,
        max: usize,
        lease_duration: Duration,
    ) -> Result<Vec<LeasedTask>, QueueError> {
        let now = self.clock.now();
        let lease_expires_at = offset(now, lease_duration)?;
        let mut queues = self
            .queues
            .write()
            .map_err(|_| QueueError::permanent("queue lock poisoned"))?;
        let tasks = queues
            .get_mut(queue)
            .ok_or_else(|| QueueError::UnknownQueue(queue.to_string()))?;

        let mut candidates: Vec<&mut QueuedTask> = tasks
            .iter_mut()
            .filter(|t| {
                t.task.method.is_pull()
                    && t.eta <= now
                    && t.lease_expires_at.is_none_or(|expiry| expiry <= now)
            })
            .collect();
        candidates.sort_by_key(|t| t.eta);

        let leased = candidates
            .into_iter()
            .take(max)
            .map(|t| {
                t.lease_expires_at = Some(lease_expires_at);
                LeasedTask {
                    id: t.id,
                    params: t.task.params.clone(),
                    eta: t.eta,
                }
            })
            .collect();
        Ok(leased)
    }

    /// Remove a task once its worker has finished with it.
    pub fn delete_task(&self, queue: &str, id: TaskId) -> Result<(), QueueError> {
        let mut queues = self
            .queues
            .write()
            .map_err(|_| QueueError::permanent("queue lock poisoned"))?;
        let tasks = queues
            .get_mut(queue)
            .ok_or_else(|| QueueError::UnknownQueue(queue.to_string()))?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(QueueError::permanent(format!("task not found: {id}")));
        }
        Ok(())
    }
}

impl<C: Clock> QueueClient for InMemoryTaskQueue<C> {
    fn submit(&self, queue: &str, task: &QueueTask) -> Result<TaskId, QueueError> {
        let eta = offset(self.clock.now(), task.schedule.delay())?;
        let mut queues = self
            .queues
            .write()
            .map_err(|_| QueueError::permanent("queue lock poisoned"))?;
        let tasks = queues
            .get_mut(queue)
            .ok_or_else(|| QueueError::UnknownQueue(queue.to_string()))?;

        let id = TaskId::new();
        tasks.push(QueuedTask {
            id,
            task: task.clone(),
            eta,
            lease_expires_at: None,
        });
        debug!(queue, task_id = %id, %eta, "task accepted");
        Ok(id)
    }
}

/// `at + duration`, rejecting offsets past the representable date range.
fn offset(at: DateTime<Utc>, duration: Duration) -> Result<DateTime<Utc>, QueueError> {
    chrono::Duration::from_std(duration)
        .ok()
        .and_then(|delta| at.checked_add_signed(delta))
        .ok_or_else(|| QueueError::permanent(format!("duration out of range: {duration:?}")))
}

/// Queue client wrapper that fails on demand.
///
/// Scripted failures are consumed one per submission attempt, before the
/// inner client is reached. Every attempt is counted, successful or not.
#[derive(Debug)]
pub struct FlakyQueueClient<Q> {
    inner: Q,
    failures: Mutex<VecDeque<QueueError>>,
    attempts: AtomicUsize,
}

impl<Q: QueueClient> FlakyQueueClient<Q> {
    pub fn new(inner: Q) -> Self {
        Self {
            inner,
            failures: Mutex::new(VecDeque::new()),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Fail the next `times` attempts with `error`.
    pub fn fail_times(self, times: usize, error: QueueError) -> Self {
        if let Ok(mut failures) = self.failures.lock() {
            failures.extend(std::iter::repeat_n(error, times));
        }
        self
    }

    /// Number of physical submission attempts seen so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &Q {
        &self.inner
    }
}

impl<Q: QueueClient> QueueClient for FlakyQueueClient<Q> {
    fn submit(&self, queue: &str, task: &QueueTask) -> Result<TaskId, QueueError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let scripted = self
            .failures
            .lock()
            .map_err(|_| QueueError::permanent("failure script lock poisoned"))?
            .pop_front();
        match scripted {
            Some(err) => Err(err),
            None => self.inner.submit(queue, task),
        }
    }
}
