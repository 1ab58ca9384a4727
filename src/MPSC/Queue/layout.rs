use crossbeam_utils::CachePadded;
use std::sync::atomic::AtomicU32;

/// Producer and consumer cursors of one ring.
///
/// Each cursor sits on its own cache line: producers hammer `tail` with
/// compare-exchange while the consumer advances `head` on every dequeue.
#[repr(C)]
pub struct QueueCursors {
    /// Next ticket to hand to a producer. Advanced by compare-exchange.
    pub tail: CachePadded<AtomicU32>,

    /// Next ticket the consumer will read. Written only by the consumer;
    /// atomic so that `len()` may read it from any thread.
    pub head: CachePadded<AtomicU32>,
}

impl QueueCursors {
    pub fn new() -> Self {
        Self {
            tail: CachePadded::new(AtomicU32::new(0)),
            head: CachePadded::new(AtomicU32::new(0)),
        }
    }
}

impl Default for QueueCursors {
    fn default() -> Self {
        Self::new()
    }
}
