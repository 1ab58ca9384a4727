// Bounded lock-free pool of small integer ids: the same sequence-number
// ring as the packet queue, but with contended cursors on both ends.

use crossbeam_utils::{Backoff, CachePadded};
use std::sync::atomic::Ordering::{AcqRel, Acquire, Relaxed, Release};
use std::sync::atomic::{AtomicU32, AtomicU8};

use crate::Core::error::{ConfigError, PoolError};
use crate::Core::trace;

/// Ids are `u8`, so a pool can never hold more than 256 of them.
pub const MAX_POOL_CAPACITY: usize = 256;

/// One pool cell. `sequence` follows the same protocol as the queue's
/// slots; the id itself is a plain atomic byte.
#[repr(C)]
pub(crate) struct PoolSlot {
    pub(crate) sequence: AtomicU32,
    pub(crate) id: AtomicU8,
}

/// Multi-acquirer, multi-releaser pool of `u8` ids.
///
/// `try_release` advances the enqueue cursor and `try_acquire` the dequeue
/// cursor, both by compare-exchange, so any number of threads may do
/// either concurrently. Neither call waits for the other side: an empty
/// or saturated pool is reported immediately.
pub struct SlotPool {
    /// Enqueue cursor, advanced by `try_release`.
    pub(crate) enqueue_pos: CachePadded<AtomicU32>,

    /// Dequeue cursor, advanced by `try_acquire`.
    pub(crate) dequeue_pos: CachePadded<AtomicU32>,

    pub(crate) slots: Box<[PoolSlot]>,

    pub(crate) mask: u32,
}

impl SlotPool {
    /// Create an empty pool. `capacity` must be a power of two in `1..=256`.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        ConfigError::check_capacity(capacity, 1, MAX_POOL_CAPACITY)?;

        let slots: Box<[PoolSlot]> = (0..capacity)
            .map(|k| PoolSlot {
                sequence: AtomicU32::new(k as u32),
                id: AtomicU8::new(0),
            })
            .collect();

        trace::debug!(capacity, "slot pool created");

        Ok(Self {
            enqueue_pos: CachePadded::new(AtomicU32::new(0)),
            dequeue_pos: CachePadded::new(AtomicU32::new(0)),
            slots,
            mask: (capacity - 1) as u32,
        })
    }

    /// A pool holding every id `0..capacity`.
    pub fn with_ids(capacity: usize) -> Result<Self, ConfigError> {
        let mut pool = Self::new(capacity)?;
        pool.prefill(capacity)?;
        Ok(pool)
    }

    /// Seed the pool with ids `0..count` in order.
    ///
    /// Takes `&mut self`: seeding happens before the pool is shared.
    pub fn prefill(&mut self, count: usize) -> Result<(), ConfigError> {
        let room = self.capacity() - self.len();
        if count > room {
            return Err(ConfigError::PrefillOutOfRange { count, room });
        }
        for id in 0..count {
            // Cannot be full: room was checked and nobody else holds the pool.
            self.try_release(id as u8)
                .map_err(|_| ConfigError::PrefillOutOfRange { count, room })?;
        }
        Ok(())
    }

    #[inline]
    fn slot(&self, pos: u32) -> &PoolSlot {
        &self.slots[(pos & self.mask) as usize]
    }

    /// Take an id out of the pool.
    pub fn try_acquire(&self) -> Result<u8, PoolError> {
        let backoff = Backoff::new();
        let mut pos = self.dequeue_pos.load(Relaxed);

        loop {
            let slot = self.slot(pos);
            let seq = slot.sequence.load(Acquire);
            let dif = seq.wrapping_sub(pos.wrapping_add(1)) as i32;

            if dif == 0 {
                match self
                    .dequeue_pos
                    .compare_exchange_weak(pos, pos.wrapping_add(1), AcqRel, Relaxed)
                {
                    Ok(_) => {
                        let id = slot.id.load(Relaxed);
                        // hand the cell to the releaser one lap ahead
                        slot.sequence
                            .store(pos.wrapping_add(self.capacity() as u32), Release);
                        return Ok(id);
                    }
                    Err(current) => {
                        pos = current;
                        backoff.spin();
                    }
                }
            } else if dif < 0 {
                return Err(PoolError::Empty);
            } else {
                // another acquirer got there first
                pos = self.dequeue_pos.load(Relaxed);
            }
        }
    }

    /// Return `id` to the pool.
    ///
    /// `Full` means more ids were released than acquired: a double release
    /// or an id that never came from this pool. Ids at or above the
    /// capacity are refused with `OutOfRange`.
    pub fn try_release(&self, id: u8) -> Result<(), PoolError> {
        if id as usize >= self.capacity() {
            return Err(PoolError::OutOfRange {
                id,
                capacity: self.capacity(),
            });
        }
        let backoff = Backoff::new();
        let mut pos = self.enqueue_pos.load(Relaxed);

        loop {
            let slot = self.slot(pos);
            let seq = slot.sequence.load(Acquire);
            let dif = seq.wrapping_sub(pos) as i32;

            if dif == 0 {
                match self
                    .enqueue_pos
                    .compare_exchange_weak(pos, pos.wrapping_add(1), AcqRel, Relaxed)
                {
                    Ok(_) => {
                        slot.id.store(id, Relaxed);
                        slot.sequence.store(pos.wrapping_add(1), Release);
                        return Ok(());
                    }
                    Err(current) => {
                        pos = current;
                        backoff.spin();
                    }
                }
            } else if dif < 0 {
                trace::warn!(id, "release into a saturated slot pool");
                return Err(PoolError::Full);
            } else {
                pos = self.enqueue_pos.load(Relaxed);
            }
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Approximate number of ids currently in the pool.
    pub fn len(&self) -> usize {
        let dequeued = self.dequeue_pos.load(Acquire);
        let enqueued = self.enqueue_pos.load(Acquire);
        (enqueued.wrapping_sub(dequeued) as usize).min(self.capacity())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SlotPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::Debug::StructDebug::debug_slot_pool(self, f)
    }
}
