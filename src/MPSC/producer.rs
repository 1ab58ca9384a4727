// In src/MPSC/producer.rs
use crate::Core::error::EnqueueError;
use crate::MPSC::Queue::RingQueue;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Sending half of a queue. Cheap to clone; hand one to every receive
/// callback or connection handler.
pub struct Producer<T> {
    queue: Arc<RingQueue<T>>,
}

impl<T> Producer<T> {
    pub(crate) fn new(queue: Arc<RingQueue<T>>) -> Self {
        Self { queue }
    }

    /// Sends a value through the queue.
    ///
    /// # Returns
    /// * `Ok(())` if the value was queued
    /// * `Err(EnqueueError::Full(value))` if the consumer is too far behind
    /// * `Err(EnqueueError::Closed(value))` once the consumer side shut down
    pub fn send(&self, value: T) -> Result<(), EnqueueError<T>> {
        self.queue.enqueue(value)
    }

    /// Like [`send`](Self::send) but keeps retrying a full queue until
    /// `timeout` elapses.
    pub fn send_timeout(&self, value: T, timeout: Duration) -> Result<(), EnqueueError<T>> {
        self.queue.enqueue_with_timeout(value, timeout)
    }

    /// Close the queue for every producer. The consumer can still drain.
    pub fn close(&self) {
        self.queue.close();
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    pub(crate) fn queue(&self) -> &RingQueue<T> {
        &self.queue
    }
}

impl<T> Clone for Producer<T> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}

impl<T> fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_producer(self, f)
    }
}
