use super::Queue::RingQueue;
use std::fmt;

// Debug proxy implementation that calls the standalone debug function
impl<T> fmt::Debug for RingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_ring_queue(self, f)
    }
}
