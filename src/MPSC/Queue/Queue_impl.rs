use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering::{AcqRel, Acquire, Relaxed, Release};
use std::time::{Duration, Instant};

use super::layout::QueueCursors;
use super::Queue::{RingQueue, Slot, MAX_QUEUE_CAPACITY, MIN_QUEUE_CAPACITY};
use crate::Core::backoff::BackoffPolicy;
use crate::Core::error::{ConfigError, EnqueueError};
use crate::Core::trace;

impl<T> RingQueue<T> {
    /// Create a queue with `capacity` slots and the default backoff policy.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_backoff(capacity, BackoffPolicy::default())
    }

    pub fn with_backoff(capacity: usize, backoff: BackoffPolicy) -> Result<Self, ConfigError> {
        ConfigError::check_capacity(capacity, MIN_QUEUE_CAPACITY, MAX_QUEUE_CAPACITY)?;

        // Slot k starts free for ticket k.
        let slots: Box<[Slot<T>]> = (0..capacity).map(|k| Slot::new(k as u32)).collect();

        trace::debug!(capacity, "ring queue created");

        Ok(Self {
            cursors: QueueCursors::new(),
            slots,
            mask: (capacity - 1) as u32,
            closed: AtomicBool::new(false),
            backoff,
            #[cfg(debug_assertions)]
            consuming: AtomicBool::new(false),
        })
    }

    #[inline]
    fn slot(&self, pos: u32) -> &Slot<T> {
        &self.slots[(pos & self.mask) as usize]
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Approximate number of queued items.
    ///
    /// The two cursors are read one after the other, so under concurrent
    /// producers the result may already be stale when returned.
    pub fn len(&self) -> usize {
        // head first: head never passes tail, so the difference can't underflow
        let head = self.cursors.head.load(Acquire);
        let tail = self.cursors.tail.load(Acquire);
        (tail.wrapping_sub(head) as usize).min(self.capacity())
    }

    /// Enqueue `value`, callable from any number of threads.
    ///
    /// Returns `Closed` if the queue was closed before a ticket was
    /// reserved, and `Full` if the consumer did not free the target slot
    /// within the backoff budget.
    pub fn enqueue(&self, value: T) -> Result<(), EnqueueError<T>> {
        if self.is_closed() {
            return Err(EnqueueError::Closed(value));
        }

        let mut escalation = self.backoff.start();
        let mut pos = self.cursors.tail.load(Relaxed);

        loop {
            let slot = self.slot(pos);
            let seq = slot.sequence.load(Acquire);
            let dif = seq.wrapping_sub(pos) as i32;

            if dif == 0 {
                match self
                    .cursors
                    .tail
                    .compare_exchange_weak(pos, pos.wrapping_add(1), AcqRel, Relaxed)
                {
                    Ok(_) => {
                        // Ticket `pos` is ours until we publish.
                        unsafe {
                            (*slot.payload.get()).write(value);
                        }
                        slot.sequence.store(pos.wrapping_add(1), Release);
                        return Ok(());
                    }
                    Err(current) => {
                        pos = current;
                        escalation.contended();
                    }
                }
            } else if dif < 0 {
                // The slot still holds the previous lap: full.
                if !escalation.wait() {
                    trace::trace!(capacity = self.capacity(), "enqueue rejected, queue full");
                    return Err(EnqueueError::Full(value));
                }
                if self.is_closed() {
                    return Err(EnqueueError::Closed(value));
                }
                pos = self.cursors.tail.load(Relaxed);
            } else {
                // another producer took `pos`
                pos = self.cursors.tail.load(Relaxed);
            }
        }
    }

    /// Retry [`enqueue`](Self::enqueue) until it succeeds, the queue is
    /// closed, or `timeout` elapses (reported as `Full`).
    pub fn enqueue_with_timeout(&self, value: T, timeout: Duration) -> Result<(), EnqueueError<T>> {
        let deadline = Instant::now().checked_add(timeout);
        let mut value = value;

        loop {
            match self.enqueue(value) {
                Err(EnqueueError::Full(rejected)) => {
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        return Err(EnqueueError::Full(rejected));
                    }
                    value = rejected;
                    std::thread::yield_now();
                }
                other => return other,
            }
        }
    }

    /// Take the next item if it has been published.
    ///
    /// # Safety
    /// Only one thread may act as consumer: no two calls to `try_dequeue`
    /// or [`drain`](Self::drain) on the same queue may overlap. Debug
    /// builds panic when they do; release builds do not check.
    pub unsafe fn try_dequeue(&self) -> Option<T> {
        #[cfg(debug_assertions)]
        let _owner = OwnerCheck::enter(&self.consuming);

        let head = self.cursors.head.load(Relaxed);
        let slot = self.slot(head);

        if slot.sequence.load(Acquire) != head.wrapping_add(1) {
            return None;
        }

        // Moving the payload out leaves nothing behind in the slot.
        let value = unsafe { (*slot.payload.get()).assume_init_read() };

        // free the slot for the producer one lap ahead
        slot.sequence
            .store(head.wrapping_add(self.capacity() as u32), Release);
        self.cursors.head.store(head.wrapping_add(1), Release);

        Some(value)
    }

    /// Hand every item available right now to `handler`; returns the count.
    ///
    /// Stops at the tail observed on entry, so it terminates even while
    /// producers keep pushing.
    ///
    /// # Safety
    /// Same single-consumer contract as [`try_dequeue`](Self::try_dequeue).
    pub unsafe fn drain<F>(&self, mut handler: F) -> usize
    where
        F: FnMut(T),
    {
        let end = self.cursors.tail.load(Acquire);
        let mut count = 0;

        while self.cursors.head.load(Relaxed) != end {
            match unsafe { self.try_dequeue() } {
                Some(value) => {
                    handler(value);
                    count += 1;
                }
                // reserved but not yet published
                None => break,
            }
        }

        if count > 0 {
            trace::trace!(count, "drained ring queue");
        }
        count
    }

    /// Reject all further enqueues. Idempotent; queued items stay readable.
    pub fn close(&self) {
        if !self.closed.swap(true, AcqRel) {
            trace::info!(pending = self.len(), "ring queue closed");
        }
    }
}

impl<T> Drop for RingQueue<T> {
    fn drop(&mut self) {
        if !std::mem::needs_drop::<T>() {
            return;
        }
        let mask = self.mask;
        let mut head = *self.cursors.head.get_mut();
        loop {
            let slot = &mut self.slots[(head & mask) as usize];
            if *slot.sequence.get_mut() != head.wrapping_add(1) {
                break;
            }
            unsafe { slot.payload.get_mut().assume_init_drop() };
            head = head.wrapping_add(1);
        }
    }
}

#[cfg(debug_assertions)]
struct OwnerCheck<'a>(&'a AtomicBool);

#[cfg(debug_assertions)]
impl<'a> OwnerCheck<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        let busy = flag.swap(true, Acquire);
        assert!(!busy, "RingQueue: two consumers dequeued concurrently");
        Self(flag)
    }
}

#[cfg(debug_assertions)]
impl Drop for OwnerCheck<'_> {
    fn drop(&mut self) {
        self.0.store(false, Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// A queue whose cursors sit just below the `u32` wrap point.
    fn queue_at<T>(start: u32, capacity: usize) -> RingQueue<T> {
        let mut queue = RingQueue::with_backoff(capacity, BackoffPolicy::impatient()).unwrap();
        *queue.cursors.tail.get_mut() = start;
        *queue.cursors.head.get_mut() = start;
        for k in 0..capacity as u32 {
            let pos = start.wrapping_add(k);
            let index = (pos & queue.mask) as usize;
            *queue.slots[index].sequence.get_mut() = pos;
        }
        queue
    }

    #[test]
    fn fill_full_drain_across_u32_wrap() {
        let capacity = 4;
        let start = u32::MAX - 5;
        let queue = queue_at::<u32>(start, capacity);

        let mut next = 0u32;
        for lap in 0..50u32 {
            for _ in 0..capacity {
                queue.enqueue(next).unwrap();
                next += 1;
            }
            assert_eq!(queue.len(), capacity, "lap {lap}");
            assert_eq!(queue.enqueue(u32::MAX), Err(EnqueueError::Full(u32::MAX)));

            let mut seen = Vec::new();
            assert_eq!(unsafe { queue.drain(|v| seen.push(v)) }, capacity);
            let first = lap * capacity as u32;
            assert_eq!(seen, (first..first + capacity as u32).collect::<Vec<_>>());
            assert_eq!(unsafe { queue.try_dequeue() }, None);
            assert!(queue.is_empty());
        }

        let end = start.wrapping_add(200);
        assert!(end < start);
        assert_eq!(queue.head_cursor(), end);
        assert_eq!(queue.tail_cursor(), end);
    }

    #[test]
    fn one_dequeue_frees_one_enqueue_at_the_wrap() {
        let queue = queue_at::<u32>(u32::MAX - 1, 2);
        queue.enqueue(1).unwrap();
        queue.enqueue(2).unwrap();
        assert!(queue.enqueue(3).unwrap_err().is_full());

        // head is at u32::MAX, tail at 0
        assert_eq!(unsafe { queue.try_dequeue() }, Some(1));
        queue.enqueue(3).unwrap();
        assert!(queue.enqueue(4).unwrap_err().is_full());
        assert_eq!(unsafe { queue.try_dequeue() }, Some(2));
        assert_eq!(unsafe { queue.try_dequeue() }, Some(3));
    }

    #[test]
    fn drop_releases_payloads_straddling_the_wrap() {
        let shared = Arc::new(());
        {
            let queue = queue_at::<Arc<()>>(u32::MAX - 1, 8);
            for _ in 0..5 {
                queue.enqueue(Arc::clone(&shared)).unwrap();
            }
            assert_eq!(Arc::strong_count(&shared), 6);
        }
        assert_eq!(Arc::strong_count(&shared), 1);
    }
}
