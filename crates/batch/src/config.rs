//! Configuration for async task enqueueing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use registry_infra::RetryPolicy;

use crate::error::ConfigError;

pub const ENV_ASYNC_DELETE_DELAY_SECS: &str = "ASYNC_DELETE_DELAY_SECS";
pub const ENV_RETRY_MAX_ATTEMPTS: &str = "TASK_RETRY_MAX_ATTEMPTS";
pub const ENV_RETRY_BASE_DELAY_MS: &str = "TASK_RETRY_BASE_DELAY_MS";
pub const ENV_RETRY_MAX_DELAY_MS: &str = "TASK_RETRY_MAX_DELAY_MS";

/// Upper bound accepted for the async delete countdown.
pub const MAX_ASYNC_DELETE_DELAY: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Countdown before an async delete task becomes leasable.
    pub async_delete_delay: Duration,
    /// Retry policy for transient queue failures.
    pub retry: RetryPolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            async_delete_delay: Duration::from_secs(90),
            retry: RetryPolicy::default(),
        }
    }
}

impl BatchConfig {
    /// Load from process environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secs) = parse_u64(&lookup, ENV_ASYNC_DELETE_DELAY_SECS)? {
            if secs > MAX_ASYNC_DELETE_DELAY.as_secs() {
                return Err(ConfigError::Invalid {
                    var: ENV_ASYNC_DELETE_DELAY_SECS.to_string(),
                    value: secs.to_string(),
                    reason: format!("exceeds {}s", MAX_ASYNC_DELETE_DELAY.as_secs()),
                });
            }
            config.async_delete_delay = Duration::from_secs(secs);
        }
        if let Some(attempts) = parse_u64(&lookup, ENV_RETRY_MAX_ATTEMPTS)? {
            config.retry.max_attempts = u32::try_from(attempts).map_err(|_| ConfigError::Invalid {
                var: ENV_RETRY_MAX_ATTEMPTS.to_string(),
                value: attempts.to_string(),
                reason: "too large".to_string(),
            })?;
        }
        if let Some(ms) = parse_u64(&lookup, ENV_RETRY_BASE_DELAY_MS)? {
            config.retry.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_u64(&lookup, ENV_RETRY_MAX_DELAY_MS)? {
            config.retry.max_delay = Duration::from_millis(ms);
        }

        if config.retry.base_delay > config.retry.max_delay {
            return Err(ConfigError::Invalid {
                var: ENV_RETRY_BASE_DELAY_MS.to_string(),
                value: config.retry.base_delay.as_millis().to_string(),
                reason: format!(
                    "exceeds {ENV_RETRY_MAX_DELAY_MS} ({}ms)",
                    config.retry.max_delay.as_millis()
                ),
            });
        }

        Ok(config)
    }
}

fn parse_u64<F>(lookup: &F, var: &str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                var: var.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}
