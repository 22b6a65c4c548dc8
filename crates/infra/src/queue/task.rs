//! Wire-level task description.

use std::time::Duration;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// Identifier assigned to a task when a queue accepts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Backend service a push task is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Backend,
}

/// How the queue hands the task to its consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// The queue POSTs the parameters to `path` on `service`.
    Post { path: String, service: Service },
    /// The task waits until a worker leases it.
    Pull,
}

impl Method {
    pub fn post(path: impl Into<String>, service: Service) -> Self {
        Self::Post {
            path: path.into(),
            service,
        }
    }

    pub fn is_pull(&self) -> bool {
        matches!(self, Method::Pull)
    }
}

/// When a task becomes eligible for delivery.
///
/// `Delay` and `Countdown` both carry a relative duration but mean different
/// things: a `Delay` was derived from a target instant (ETA minus the logical
/// "now" of the request), a `Countdown` is a fixed wait after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
    Immediate,
    Delay(Duration),
    Countdown(Duration),
}

impl Schedule {
    /// Time between submission and eligibility.
    pub fn delay(&self) -> Duration {
        match self {
            Schedule::Immediate => Duration::ZERO,
            Schedule::Delay(d) | Schedule::Countdown(d) => *d,
        }
    }
}

/// Ordered string parameters attached to a task.
///
/// Keys are unique: inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskParams {
    entries: Vec<(String, String)>,
}

impl TaskParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Insert only when a value is present.
    pub fn insert_opt(&mut self, key: impl Into<String>, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for TaskParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A task ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueTask {
    pub method: Method,
    pub schedule: Schedule,
    pub params: TaskParams,
}

impl QueueTask {
    /// Pull task, eligible right away.
    pub fn pull(params: TaskParams) -> Self {
        Self {
            method: Method::Pull,
            schedule: Schedule::Immediate,
            params,
        }
    }

    /// POST task delivered to `path` on `service` once `delay` has elapsed.
    pub fn post_with_delay(
        path: impl Into<String>,
        service: Service,
        params: TaskParams,
        delay: Duration,
    ) -> Self {
        Self {
            method: Method::post(path, service),
            schedule: Schedule::Delay(delay),
            params,
        }
    }

    /// Replace the schedule with a fixed post-submission countdown.
    pub fn with_countdown(mut self, countdown: Duration) -> Self {
        self.schedule = Schedule::Countdown(countdown);
        self
    }
}
