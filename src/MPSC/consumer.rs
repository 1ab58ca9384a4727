// src/MPSC/consumer.rs

use crate::MPSC::Queue::RingQueue;
use crossbeam_utils::Backoff;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Receiving half of a queue.
///
/// There is exactly one per queue and it cannot be cloned; every receive
/// method takes `&mut self`, which is what makes the single-consumer ring
/// safe to use. Dropping the consumer closes the queue so producers get
/// `Closed` instead of filling a ring nobody reads.
pub struct Consumer<T> {
    queue: Arc<RingQueue<T>>,
}

impl<T> Consumer<T> {
    pub(crate) fn new(queue: Arc<RingQueue<T>>) -> Self {
        Self { queue }
    }

    /// Receives a value if one is available. Never blocks.
    pub fn try_receive(&mut self) -> Option<T> {
        // SAFETY: `&mut self` on the only Consumer of this queue.
        unsafe { self.queue.try_dequeue() }
    }

    /// Hands everything available right now to `handler`.
    /// Returns the number of values processed.
    pub fn drain<F>(&mut self, handler: F) -> usize
    where
        F: FnMut(T),
    {
        // SAFETY: `&mut self` on the only Consumer of this queue.
        unsafe { self.queue.drain(handler) }
    }

    /// Polls for a value, waiting up to `timeout`.
    ///
    /// # Returns
    /// * `Some(value)` if a value arrived in time
    /// * `None` if the timeout was reached, or the queue is closed and empty
    pub fn receive_timeout(&mut self, timeout: Duration) -> Option<T> {
        let start = Instant::now();

        loop {
            if let Some(value) = self.try_receive() {
                return Some(value);
            }
            if self.queue.is_closed() && self.queue.is_empty() {
                return None;
            }
            let remaining = timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                return None;
            }
            std::thread::sleep(remaining.min(Duration::from_millis(1)));
        }
    }

    /// Closes the queue and drains it to completion.
    ///
    /// Waits for producers that already reserved a slot to publish it.
    /// Returns the number of values processed.
    pub fn finish<F>(&mut self, mut handler: F) -> usize
    where
        F: FnMut(T),
    {
        self.queue.close();

        let backoff = Backoff::new();
        let mut total = 0;
        loop {
            let n = self.drain(&mut handler);
            total += n;
            if self.queue.is_empty() {
                return total;
            }
            if n == 0 {
                backoff.snooze();
            }
        }
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

impl<T> Drop for Consumer<T> {
    fn drop(&mut self) {
        self.queue.close();
    }
}

impl<T> fmt::Debug for Consumer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_consumer(self, f)
    }
}
