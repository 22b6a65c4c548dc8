//! Strongly-typed async task requests.
//!
//! Each request is validated when built and only turns into the flat
//! [`TaskParams`] wire form through `to_params`, which is pure.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};

use registry_core::{EntityKey, EppResource, Host, RegistrarId, Trid, ValueObject};
use registry_infra::TaskParams;

use crate::error::EnqueueError;
use crate::params::{
    PARAM_CLIENT_TRANSACTION_ID, PARAM_HOST_KEY, PARAM_IS_SUPERUSER, PARAM_REQUESTED_TIME,
    PARAM_REQUESTING_CLIENT_ID, PARAM_RESAVE_TIMES, PARAM_RESOURCE_KEY,
    PARAM_SERVER_TRANSACTION_ID, format_instant,
};

/// Re-save one resource at one or more future instants.
///
/// Only the earliest instant is scheduled; later ones travel with the task so
/// the handler can enqueue the next link of the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResaveRequest {
    resource_key: String,
    requested_time: DateTime<Utc>,
    first_resave: DateTime<Utc>,
    later_resaves: Vec<DateTime<Utc>>,
    delay: Duration,
}

impl ResaveRequest {
    /// Build a request for an already stringified key.
    ///
    /// Fails when `resave_times` is empty or its earliest instant precedes
    /// `requested_time`.
    pub fn new(
        resource_key: impl Into<String>,
        requested_time: DateTime<Utc>,
        resave_times: BTreeSet<DateTime<Utc>>,
    ) -> Result<Self, EnqueueError> {
        let mut times = resave_times.into_iter();
        let first_resave = times
            .next()
            .ok_or_else(|| EnqueueError::invalid_schedule("no resave times given"))?;
        let delay = (first_resave - requested_time).to_std().map_err(|_| {
            EnqueueError::invalid_schedule(format!(
                "can't enqueue a resave to run in the past: {} is before {}",
                format_instant(first_resave),
                format_instant(requested_time)
            ))
        })?;

        Ok(Self {
            resource_key: resource_key.into(),
            requested_time,
            first_resave,
            later_resaves: times.collect(),
            delay,
        })
    }

    pub fn for_key<T: EppResource>(
        key: &EntityKey<T>,
        requested_time: DateTime<Utc>,
        resave_times: BTreeSet<DateTime<Utc>>,
    ) -> Result<Self, EnqueueError> {
        Self::new(key.stringify(), requested_time, resave_times)
    }

    pub fn resource_key(&self) -> &str {
        &self.resource_key
    }

    pub fn first_resave(&self) -> DateTime<Utc> {
        self.first_resave
    }

    pub fn later_resaves(&self) -> &[DateTime<Utc>] {
        &self.later_resaves
    }

    /// Time from the request until the first resave.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn to_params(&self) -> TaskParams {
        let mut params = TaskParams::new()
            .with(PARAM_RESOURCE_KEY, self.resource_key.as_str())
            .with(PARAM_REQUESTED_TIME, format_instant(self.requested_time));
        if !self.later_resaves.is_empty() {
            let joined = self
                .later_resaves
                .iter()
                .map(|t| format_instant(*t))
                .collect::<Vec<_>>()
                .join(",");
            params.insert(PARAM_RESAVE_TIMES, joined);
        }
        params
    }
}

impl ValueObject for ResaveRequest {}

/// Asynchronously delete a contact or host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    resource_key: String,
    requesting_registrar_id: RegistrarId,
    trid: Trid,
    is_superuser: bool,
    requested_time: DateTime<Utc>,
}

impl DeleteRequest {
    pub fn new<T: EppResource>(
        resource: &T,
        requested_time: DateTime<Utc>,
        requesting_registrar_id: RegistrarId,
        trid: Trid,
        is_superuser: bool,
    ) -> Self {
        Self {
            resource_key: resource.create_key().stringify(),
            requesting_registrar_id,
            trid,
            is_superuser,
            requested_time,
        }
    }

    pub fn resource_key(&self) -> &str {
        &self.resource_key
    }

    pub fn requesting_registrar_id(&self) -> &RegistrarId {
        &self.requesting_registrar_id
    }

    pub fn to_params(&self) -> TaskParams {
        let mut params = TaskParams::new()
            .with(PARAM_RESOURCE_KEY, self.resource_key.as_str())
            .with(PARAM_REQUESTING_CLIENT_ID, self.requesting_registrar_id.as_str())
            .with(PARAM_SERVER_TRANSACTION_ID, self.trid.server_transaction_id())
            .with(PARAM_IS_SUPERUSER, self.is_superuser.to_string())
            .with(PARAM_REQUESTED_TIME, format_instant(self.requested_time));
        params.insert_opt(PARAM_CLIENT_TRANSACTION_ID, self.trid.client_transaction_id());
        params
    }
}

impl ValueObject for DeleteRequest {}

/// Refresh DNS for a host that was renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRefreshRequest {
    host_key: EntityKey<Host>,
    requested_time: DateTime<Utc>,
}

impl DnsRefreshRequest {
    pub fn new(host: &Host, requested_time: DateTime<Utc>) -> Self {
        Self {
            host_key: host.create_key(),
            requested_time,
        }
    }

    pub fn host_key(&self) -> EntityKey<Host> {
        self.host_key
    }

    pub fn to_params(&self) -> TaskParams {
        TaskParams::new()
            .with(PARAM_HOST_KEY, self.host_key.stringify())
            .with(PARAM_REQUESTED_TIME, format_instant(self.requested_time))
    }
}

impl ValueObject for DnsRefreshRequest {}
