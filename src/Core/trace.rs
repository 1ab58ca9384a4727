//! Structured logging for the handoff core, behind the `tracing` feature.
//!
//! Levels used by this crate:
//! - `info`: context started and stopped, ring queue closed (with the
//!   number of items still pending).
//! - `debug`: ring queue and slot pool construction, with capacity.
//! - `warn`: a release refused by a saturated slot pool, which means an id
//!   was released twice or came from elsewhere.
//! - `trace`: per-operation events on the hot path: enqueue rejected as
//!   full, non-empty drains with their count, table acquire and release.
//!
//! Without the feature the macros expand to nothing, so none of the above
//! costs anything on the producer or tick path.

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "netq_handoff=debug";

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to
/// [`DEFAULT_FILTER`]. A second call is a no-op.
#[cfg(feature = "tracing")]
pub fn init_tracing() {
    init_tracing_with(DEFAULT_FILTER);
}

/// Same as [`init_tracing`] with a caller-chosen fallback filter, e.g.
/// `"netq_handoff=trace"` to see every enqueue rejection.
#[cfg(feature = "tracing")]
pub fn init_tracing_with(default_filter: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // thread names identify the producer threads in tick_host output
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_names(true)
                .with_timer(fmt::time::uptime()),
        )
        .with(filter)
        .try_init();
}

#[cfg(not(feature = "tracing"))]
pub const fn init_tracing() {}

#[cfg(not(feature = "tracing"))]
pub const fn init_tracing_with(_default_filter: &str) {}

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, info, trace, warn};

// Swallows the same field/message syntax the tracing macros accept.
#[cfg(not(feature = "tracing"))]
macro_rules! noop {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use noop as debug;
#[cfg(not(feature = "tracing"))]
pub(crate) use noop as info;
#[cfg(not(feature = "tracing"))]
pub(crate) use noop as trace;
#[cfg(not(feature = "tracing"))]
pub(crate) use noop as warn;
