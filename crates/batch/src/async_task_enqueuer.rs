//! Helper to enqueue tasks for asynchronous operations in flows.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use registry_core::{Clock, EntityKey, EppResource, Host, RegistrarId, Trid};
use registry_infra::{
    QueueClient, QueueError, QueueTask, Retrier, RetryPolicy, Service, Sleeper, TaskId,
    ThreadSleeper,
};

use crate::config::BatchConfig;
use crate::error::EnqueueError;
use crate::params::{
    QUEUE_ASYNC_ACTIONS, QUEUE_ASYNC_DELETE, QUEUE_ASYNC_HOST_RENAME, RESAVE_ENTITY_PATH,
    ResaveTaskParams, format_instant,
};
use crate::requests::{DeleteRequest, DnsRefreshRequest, ResaveRequest};

/// Resaves further out than this are dropped instead of enqueued.
pub const MAX_ASYNC_ETA: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Enqueues resave, delete and DNS refresh tasks.
///
/// Holds no state between calls beyond its collaborators, so one instance can
/// be shared by every flow thread. Every submission goes through the
/// [`Retrier`], retrying only [`QueueError::Transient`] failures.
pub struct AsyncTaskEnqueuer<Q, S = ThreadSleeper> {
    queue: Q,
    retrier: Retrier<S>,
    clock: Arc<dyn Clock>,
    async_delete_delay: Duration,
}

impl<Q: QueueClient> AsyncTaskEnqueuer<Q, ThreadSleeper> {
    pub fn from_config(queue: Q, clock: Arc<dyn Clock>, config: &BatchConfig) -> Self {
        Self::new(
            queue,
            Retrier::new(config.retry.clone()),
            clock,
            config.async_delete_delay,
        )
    }
}

impl<Q: QueueClient, S: Sleeper> AsyncTaskEnqueuer<Q, S> {
    pub fn new(
        queue: Q,
        retrier: Retrier<S>,
        clock: Arc<dyn Clock>,
        async_delete_delay: Duration,
    ) -> Self {
        Self {
            queue,
            retrier,
            clock,
            async_delete_delay,
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        self.retrier.policy()
    }

    pub fn async_delete_delay(&self) -> Duration {
        self.async_delete_delay
    }

    /// Enqueue a task to re-save an entity at some point in the future.
    pub fn enqueue_async_resave<T: EppResource>(
        &self,
        entity_key: &EntityKey<T>,
        now: DateTime<Utc>,
        when_to_resave: DateTime<Utc>,
    ) -> Result<(), EnqueueError> {
        self.enqueue_async_resaves(entity_key, now, BTreeSet::from([when_to_resave]))
    }

    /// Enqueue a task to re-save an entity at some point(s) in the future.
    ///
    /// Multiple re-save times are chained one after the other: only the first
    /// is scheduled, and the task carries the rest so that its handler can
    /// re-enqueue itself for the next one (see [`Self::enqueue_next_resave`]).
    ///
    /// A first re-save more than [`MAX_ASYNC_ETA`] away is logged and dropped.
    pub fn enqueue_async_resaves<T: EppResource>(
        &self,
        entity_key: &EntityKey<T>,
        now: DateTime<Utc>,
        when_to_resave: BTreeSet<DateTime<Utc>>,
    ) -> Result<(), EnqueueError> {
        self.submit_resave(ResaveRequest::for_key(entity_key, now, when_to_resave)?)
    }

    /// Continue a resave chain from a delivered task.
    ///
    /// Enqueues the remaining re-save times with the injected clock as "now".
    /// Does nothing at the end of a chain.
    pub fn enqueue_next_resave(&self, task: &ResaveTaskParams) -> Result<(), EnqueueError> {
        if task.resave_times.is_empty() {
            return Ok(());
        }
        let request = ResaveRequest::new(
            task.resource_key.as_str(),
            self.clock.now(),
            task.resave_times.clone(),
        )?;
        self.submit_resave(request)
    }

    fn submit_resave(&self, request: ResaveRequest) -> Result<(), EnqueueError> {
        if request.delay() > MAX_ASYNC_ETA {
            info!(
                entity_key = request.resource_key(),
                first_resave = %format_instant(request.first_resave()),
                threshold_days = MAX_ASYNC_ETA.as_secs() / 86_400,
                "ignoring async re-save; past the ETA threshold"
            );
            return Ok(());
        }

        info!(
            entity_key = request.resource_key(),
            first_resave = %format_instant(request.first_resave()),
            chained = request.later_resaves().len(),
            "enqueuing async re-save"
        );
        let task = QueueTask::post_with_delay(
            RESAVE_ENTITY_PATH,
            Service::Backend,
            request.to_params(),
            request.delay(),
        );
        self.add_task_with_retry(QUEUE_ASYNC_ACTIONS, &task)?;
        Ok(())
    }

    /// Enqueue a task to asynchronously delete a contact or host.
    pub fn enqueue_async_delete<T: EppResource>(
        &self,
        resource_to_delete: &T,
        now: DateTime<Utc>,
        requesting_registrar_id: &RegistrarId,
        trid: &Trid,
        is_superuser: bool,
    ) -> Result<(), EnqueueError> {
        let request = DeleteRequest::new(
            resource_to_delete,
            now,
            requesting_registrar_id.clone(),
            trid.clone(),
            is_superuser,
        );
        info!(
            resource = request.resource_key(),
            registrar = %requesting_registrar_id,
            "enqueuing async deletion"
        );
        let task = QueueTask::pull(request.to_params()).with_countdown(self.async_delete_delay);
        self.add_task_with_retry(QUEUE_ASYNC_DELETE, &task)?;
        Ok(())
    }

    /// Enqueue a task to asynchronously refresh DNS for a renamed host.
    pub fn enqueue_async_dns_refresh(
        &self,
        host: &Host,
        now: DateTime<Utc>,
    ) -> Result<(), EnqueueError> {
        let request = DnsRefreshRequest::new(host, now);
        info!(host_key = %request.host_key(), "enqueuing async DNS refresh for renamed host");
        self.add_task_with_retry(QUEUE_ASYNC_HOST_RENAME, &QueueTask::pull(request.to_params()))?;
        Ok(())
    }

    /// Add a task with retrying, so a transient queue hiccup doesn't abort the
    /// whole flow.
    fn add_task_with_retry(&self, queue: &str, task: &QueueTask) -> Result<TaskId, QueueError> {
        self.retrier
            .call_with_retry(|| self.queue.submit(queue, task), QueueError::is_transient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use registry_core::{FakeClock, RepoId};
    use registry_infra::{FakeSleeper, InMemoryTaskQueue, Schedule};

    use crate::params::PARAM_RESAVE_TIMES;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()
    }

    fn enqueuer(
        clock: &FakeClock,
    ) -> AsyncTaskEnqueuer<Arc<InMemoryTaskQueue<FakeClock>>, FakeSleeper> {
        let queue = Arc::new(InMemoryTaskQueue::new(
            clock.clone(),
            [QUEUE_ASYNC_ACTIONS, QUEUE_ASYNC_DELETE, QUEUE_ASYNC_HOST_RENAME],
        ));
        AsyncTaskEnqueuer::new(
            queue,
            Retrier::with_sleeper(RetryPolicy::no_retry(), FakeSleeper::new()),
            Arc::new(clock.clone()),
            Duration::from_secs(90),
        )
    }

    #[test]
    fn resave_exactly_at_threshold_is_enqueued() {
        let clock = FakeClock::new(t0());
        let enqueuer = enqueuer(&clock);
        let key = Host::new(RepoId::new(), "ns1.example.tld").create_key();

        enqueuer
            .enqueue_async_resave(&key, t0(), t0() + chrono::Duration::days(30))
            .unwrap();

        let tasks = enqueuer.queue.tasks(QUEUE_ASYNC_ACTIONS);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].schedule, Schedule::Delay(MAX_ASYNC_ETA));
    }

    #[test]
    fn resave_one_milli_past_threshold_is_dropped() {
        let clock = FakeClock::new(t0());
        let enqueuer = enqueuer(&clock);
        let key = Host::new(RepoId::new(), "ns1.example.tld").create_key();

        let when = t0() + chrono::Duration::days(30) + chrono::Duration::milliseconds(1);
        enqueuer.enqueue_async_resave(&key, t0(), when).unwrap();

        assert_eq!(enqueuer.queue.total_tasks(), 0);
    }

    #[test]
    fn next_resave_uses_clock_and_shrinks_chain() {
        let clock = FakeClock::new(t0());
        let enqueuer = enqueuer(&clock);
        let hour = chrono::Duration::hours(1);

        clock.advance_by(hour);
        let delivered = ResaveTaskParams {
            resource_key: "Host:abc".into(),
            requested_time: t0(),
            resave_times: BTreeSet::from([t0() + hour * 2, t0() + hour * 3]),
        };
        enqueuer.enqueue_next_resave(&delivered).unwrap();

        let tasks = enqueuer.queue.tasks(QUEUE_ASYNC_ACTIONS);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].schedule, Schedule::Delay(Duration::from_secs(3600)));
        assert_eq!(
            tasks[0].params.get(PARAM_RESAVE_TIMES),
            Some("2000-01-01T03:00:00.000Z")
        );
    }

    #[test]
    fn next_resave_at_end_of_chain_is_noop() {
        let clock = FakeClock::new(t0());
        let enqueuer = enqueuer(&clock);
        let delivered = ResaveTaskParams {
            resource_key: "Host:abc".into(),
            requested_time: t0(),
            resave_times: BTreeSet::new(),
        };

        enqueuer.enqueue_next_resave(&delivered).unwrap();
        assert_eq!(enqueuer.queue.total_tasks(), 0);
    }
}
