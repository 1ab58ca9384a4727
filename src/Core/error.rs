// Error taxonomy shared by the queue, the pool and the table.

use std::fmt;
use thiserror::Error;

/// Construction-time failure. Capacities are never rounded or clamped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("capacity must be greater than zero")]
    ZeroCapacity,

    #[error("capacity {0} is not a power of two")]
    NotPowerOfTwo(usize),

    #[error("capacity {capacity} is below the minimum of {min}")]
    BelowMinimum { capacity: usize, min: usize },

    #[error("capacity {capacity} exceeds the maximum of {max}")]
    AboveMaximum { capacity: usize, max: usize },

    #[error("cannot prefill {count} ids, only {room} free slots remain")]
    PrefillOutOfRange { count: usize, room: usize },

    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: &'static str, value: String },
}

impl ConfigError {
    /// Checks `capacity` against `[min, max]` and the power-of-two rule.
    pub(crate) fn check_capacity(capacity: usize, min: usize, max: usize) -> Result<(), Self> {
        if capacity == 0 {
            return Err(Self::ZeroCapacity);
        }
        if !capacity.is_power_of_two() {
            return Err(Self::NotPowerOfTwo(capacity));
        }
        if capacity < min {
            return Err(Self::BelowMinimum { capacity, min });
        }
        if capacity > max {
            return Err(Self::AboveMaximum { capacity, max });
        }
        Ok(())
    }
}

/// Rejected enqueue. The value is handed back so the caller can drop,
/// retry or reroute it.
#[derive(Clone, PartialEq, Eq, Error)]
pub enum EnqueueError<T> {
    #[error("queue is full")]
    Full(T),

    #[error("queue is closed")]
    Closed(T),
}

impl<T> EnqueueError<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(value) | Self::Closed(value) => value,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }
}

// Payloads are often opaque packets; keep them out of the debug output.
impl<T> fmt::Debug for EnqueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => f.write_str("Full(..)"),
            Self::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("slot pool is empty")]
    Empty,

    #[error("slot pool is full")]
    Full,

    #[error("id {id} is out of range for a pool of {capacity}")]
    OutOfRange { id: u8, capacity: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("no free slot id left in the table")]
    PoolEmpty,

    #[error("slot id {id} is out of range for capacity {capacity}")]
    OutOfRange { id: u8, capacity: usize },

    #[error("slot id {0} is not in use")]
    NotInUse(u8),

    /// The backing pool refused a released id. Only reachable if the
    /// pool was fed ids from outside the table.
    #[error("slot pool rejected released id {0}")]
    PoolRejected(u8),
}
