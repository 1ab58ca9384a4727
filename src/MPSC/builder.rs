use super::{Consumer, Producer};
use crate::Core::backoff::BackoffPolicy;
use crate::Core::error::ConfigError;
use crate::MPSC::Queue::RingQueue;
use std::sync::Arc;

pub struct QueueBuilder {
    capacity: usize,
    backoff: BackoffPolicy,
}

impl Default for QueueBuilder {
    fn default() -> Self {
        Self {
            capacity: 128, // packet queue size of the host network layer
            backoff: BackoffPolicy::default(),
        }
    }
}

impl QueueBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// A bare queue; the caller upholds the single-consumer contract.
    pub fn build_queue<T>(self) -> Result<RingQueue<T>, ConfigError> {
        RingQueue::with_backoff(self.capacity, self.backoff)
    }

    /// A queue split into its cloneable producer and its unique consumer.
    pub fn build<T>(self) -> Result<(Producer<T>, Consumer<T>), ConfigError> {
        let queue = Arc::new(self.build_queue()?);
        Ok((Producer::new(Arc::clone(&queue)), Consumer::new(queue)))
    }
}

/// Shorthand for `QueueBuilder::new().with_capacity(capacity).build()`.
pub fn channel<T>(capacity: usize) -> Result<(Producer<T>, Consumer<T>), ConfigError> {
    QueueBuilder::new().with_capacity(capacity).build()
}
