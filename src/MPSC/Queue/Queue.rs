// Bounded MPSC ring shared by network receive callbacks and the host tick.

use super::layout::QueueCursors;
use crate::Core::backoff::BackoffPolicy;

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicBool, AtomicU32};

pub const MIN_QUEUE_CAPACITY: usize = 2;

/// Keeps the outstanding ticket distance far below 2^31 so that wrapping
/// `u32` sequence comparisons stay unambiguous.
pub const MAX_QUEUE_CAPACITY: usize = 1 << 20;

/// A single slot in the ring.
///
/// The sequence number is the whole handoff protocol:
/// - `sequence == pos`: free for the producer holding ticket `pos`.
/// - `sequence == pos + 1`: holds data for the consumer at `head == pos`.
/// - after the consumer reads, `sequence = pos + capacity`, which frees the
///   slot for the producer of the next lap.
#[repr(C, align(64))]
pub struct Slot<T> {
    pub(crate) sequence: AtomicU32,
    pub(crate) payload: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Slot<T> {
    pub(crate) const fn new(sequence: u32) -> Self {
        Self {
            sequence: AtomicU32::new(sequence),
            payload: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }
}

/// Bounded lock-free multi-producer, single-consumer queue.
///
/// ### Concurrency Design:
/// - **Producers** (`enqueue`, any thread): wait for the slot at `tail` to be
///   free, claim the ticket by compare-exchange on `tail`, write the payload
///   inline and publish with `sequence = ticket + 1`.
/// - **Consumer** (`try_dequeue`, exactly one thread): reads the slot at
///   `head`, moves the payload out and hands the slot to the next lap.
///
/// A producer that finds the queue full backs off (spin, yield, short
/// sleep) for a bounded number of rounds and then reports `Full`. It never
/// holds a ticket while doing so, so giving up leaves no gap for the
/// consumer to stall on.
pub struct RingQueue<T> {
    pub(crate) cursors: QueueCursors,

    pub(crate) slots: Box<[Slot<T>]>,

    /// `capacity - 1`.
    pub(crate) mask: u32,

    pub(crate) closed: AtomicBool,

    pub(crate) backoff: BackoffPolicy,

    /// Set while a dequeue is running; catches overlapping consumers.
    #[cfg(debug_assertions)]
    pub(crate) consuming: AtomicBool,
}

// Slot payloads are only touched by the thread owning the current
// generation, as enforced by the sequence protocol.
unsafe impl<T: Send> Send for RingQueue<T> {}
unsafe impl<T: Send> Sync for RingQueue<T> {}
