//! Task parameter vocabulary, queue names and handler-side decoding.
//!
//! Everything a handler needs to turn a delivered task back into typed values
//! lives here, next to the names the enqueuer writes.

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};

use registry_core::{EntityKey, Host, RegistrarId, Trid};
use registry_infra::TaskParams;

use crate::error::ParamError;

/// Parameter names used by async tasks.
pub const PARAM_RESOURCE_KEY: &str = "resourceKey";
pub const PARAM_REQUESTING_CLIENT_ID: &str = "requestingClientId";
pub const PARAM_CLIENT_TRANSACTION_ID: &str = "clientTransactionId";
pub const PARAM_SERVER_TRANSACTION_ID: &str = "serverTransactionId";
pub const PARAM_IS_SUPERUSER: &str = "isSuperuser";
pub const PARAM_HOST_KEY: &str = "hostKey";
pub const PARAM_REQUESTED_TIME: &str = "requestedTime";
pub const PARAM_RESAVE_TIMES: &str = "resaveTimes";

/// Queue names used by async tasks.
pub const QUEUE_ASYNC_ACTIONS: &str = "async-actions";
pub const QUEUE_ASYNC_DELETE: &str = "async-delete-pull";
pub const QUEUE_ASYNC_HOST_RENAME: &str = "async-host-rename-pull";

/// Handler path for resave tasks on the push queue.
pub const RESAVE_ENTITY_PATH: &str = "/_dr/task/resaveEntity";

/// Wire format of instants: ISO-8601 UTC, millisecond precision.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_instant(key: &str, value: &str) -> Result<DateTime<Utc>, ParamError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ParamError::InvalidInstant {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn required<'a>(params: &'a TaskParams, key: &str) -> Result<&'a str, ParamError> {
    params
        .get(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ParamError::Missing(key.to_string()))
}

fn optional(params: &TaskParams, key: &str) -> Option<String> {
    params.get(key).filter(|v| !v.is_empty()).map(str::to_string)
}

fn required_instant(params: &TaskParams, key: &str) -> Result<DateTime<Utc>, ParamError> {
    parse_instant(key, required(params, key)?)
}

/// Comma-joined instants; absent or empty means the empty set.
fn instant_set(params: &TaskParams, key: &str) -> Result<BTreeSet<DateTime<Utc>>, ParamError> {
    match params.get(key) {
        None => Ok(BTreeSet::new()),
        Some(joined) => joined
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_instant(key, s))
            .collect(),
    }
}

fn required_bool(params: &TaskParams, key: &str) -> Result<bool, ParamError> {
    let value = required(params, key)?;
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParamError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Decoded parameters of a resave task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResaveTaskParams {
    pub resource_key: String,
    pub requested_time: DateTime<Utc>,
    /// Instants still to run after this one; empty at the end of a chain.
    pub resave_times: BTreeSet<DateTime<Utc>>,
}

impl ResaveTaskParams {
    pub fn from_params(params: &TaskParams) -> Result<Self, ParamError> {
        Ok(Self {
            resource_key: required(params, PARAM_RESOURCE_KEY)?.to_string(),
            requested_time: required_instant(params, PARAM_REQUESTED_TIME)?,
            resave_times: instant_set(params, PARAM_RESAVE_TIMES)?,
        })
    }
}

/// Decoded parameters of an async delete task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTaskParams {
    pub resource_key: String,
    pub requesting_registrar_id: RegistrarId,
    pub server_transaction_id: String,
    pub client_transaction_id: Option<String>,
    pub is_superuser: bool,
    pub requested_time: DateTime<Utc>,
}

impl DeleteTaskParams {
    pub fn from_params(params: &TaskParams) -> Result<Self, ParamError> {
        Ok(Self {
            resource_key: required(params, PARAM_RESOURCE_KEY)?.to_string(),
            requesting_registrar_id: RegistrarId::new(required(
                params,
                PARAM_REQUESTING_CLIENT_ID,
            )?),
            server_transaction_id: required(params, PARAM_SERVER_TRANSACTION_ID)?.to_string(),
            client_transaction_id: optional(params, PARAM_CLIENT_TRANSACTION_ID),
            is_superuser: required_bool(params, PARAM_IS_SUPERUSER)?,
            requested_time: required_instant(params, PARAM_REQUESTED_TIME)?,
        })
    }

    pub fn trid(&self) -> Trid {
        Trid::create(
            self.client_transaction_id.clone(),
            self.server_transaction_id.clone(),
        )
    }
}

/// Decoded parameters of a DNS refresh task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRefreshTaskParams {
    pub host_key: EntityKey<Host>,
    pub requested_time: DateTime<Utc>,
}

impl DnsRefreshTaskParams {
    pub fn from_params(params: &TaskParams) -> Result<Self, ParamError> {
        let raw_key = required(params, PARAM_HOST_KEY)?;
        let host_key = EntityKey::parse(raw_key).map_err(|source| ParamError::InvalidKey {
            key: PARAM_HOST_KEY.to_string(),
            source,
        })?;
        Ok(Self {
            host_key,
            requested_time: required_instant(params, PARAM_REQUESTED_TIME)?,
        })
    }
}
