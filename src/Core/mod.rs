pub mod backoff;
pub mod config;
pub mod context;
pub mod error;
pub mod trace;

pub use backoff::BackoffPolicy;
pub use config::HandoffConfig;
pub use context::{HandoffContext, Tick};
pub use error::{ConfigError, EnqueueError, PoolError, TableError};
