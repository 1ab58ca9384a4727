use super::backoff::BackoffPolicy;
use super::error::ConfigError;
use crate::MPSC::Queue::{MAX_QUEUE_CAPACITY, MIN_QUEUE_CAPACITY};
use crate::Slots::MAX_POOL_CAPACITY;
use std::time::Duration;

pub const ENV_QUEUE_CAPACITY: &str = "NETQ_QUEUE_CAPACITY";
pub const ENV_TABLE_CAPACITY: &str = "NETQ_TABLE_CAPACITY";
pub const ENV_BACKOFF_SLEEP_ROUNDS: &str = "NETQ_BACKOFF_SLEEP_ROUNDS";
pub const ENV_BACKOFF_SLEEP_US: &str = "NETQ_BACKOFF_SLEEP_US";

/// Sizing for one [`HandoffContext`](super::context::HandoffContext).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandoffConfig {
    /// Packet queue slots. Power of two in `2..=MAX_QUEUE_CAPACITY`.
    pub queue_capacity: usize,
    /// Connection table slots. Power of two in `1..=256`.
    pub table_capacity: usize,
    pub backoff: BackoffPolicy,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 128,
            table_capacity: 16,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl HandoffConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_table_capacity(mut self, capacity: usize) -> Self {
        self.table_capacity = capacity;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_capacity(self.queue_capacity, MIN_QUEUE_CAPACITY, MAX_QUEUE_CAPACITY)?;
        ConfigError::check_capacity(self.table_capacity, 1, MAX_POOL_CAPACITY)?;
        Ok(())
    }

    /// Defaults overridden by `NETQ_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a caller-supplied lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = parse_var::<usize, _>(&lookup, ENV_QUEUE_CAPACITY)? {
            config.queue_capacity = v;
        }
        if let Some(v) = parse_var::<usize, _>(&lookup, ENV_TABLE_CAPACITY)? {
            config.table_capacity = v;
        }
        if let Some(v) = parse_var::<u32, _>(&lookup, ENV_BACKOFF_SLEEP_ROUNDS)? {
            config.backoff.sleep_rounds = v;
        }
        if let Some(v) = parse_var::<u64, _>(&lookup, ENV_BACKOFF_SLEEP_US)? {
            config.backoff.sleep_interval = Duration::from_micros(v);
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_var<V, F>(lookup: &F, key: &'static str) -> Result<Option<V>, ConfigError>
where
    V: std::str::FromStr,
    F: Fn(&'static str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { key, value: raw }),
    }
}
