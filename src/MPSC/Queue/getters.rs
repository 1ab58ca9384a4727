use super::Queue::RingQueue;
use crate::Core::backoff::BackoffPolicy;
use std::sync::atomic::Ordering;

/// Monitoring accessors for RingQueue.
///
/// Cursor values are loaded with relaxed ordering; they are meant for
/// debugging and stats, not for synchronisation.
impl<T> RingQueue<T> {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Next ticket that will be handed to a producer.
    pub fn tail_cursor(&self) -> u32 {
        self.cursors.tail.load(Ordering::Relaxed)
    }

    /// Next ticket the consumer will read.
    pub fn head_cursor(&self) -> u32 {
        self.cursors.head.load(Ordering::Relaxed)
    }

    pub fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }
}
