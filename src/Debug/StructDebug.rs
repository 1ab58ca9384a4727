use crate::MPSC::Queue::RingQueue;
use crate::MPSC::{Consumer, Producer};
use crate::Slots::{SlotPool, SlotTable};
use std::fmt;

/// Debug function for RingQueue
///
/// Shows capacity, occupancy and cursors; never touches payloads.
pub fn debug_ring_queue<T>(queue: &RingQueue<T>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RingQueue")
        .field("capacity", &queue.capacity())
        .field("len", &queue.len())
        .field("head", &queue.head_cursor())
        .field("tail", &queue.tail_cursor())
        .field("closed", &queue.is_closed())
        .finish()
}

pub fn debug_producer<T>(producer: &Producer<T>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Producer").field(producer.queue()).finish()
}

pub fn debug_consumer<T>(consumer: &Consumer<T>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Consumer").field(consumer.queue()).finish()
}

/// Debug function for SlotPool
pub fn debug_slot_pool(pool: &SlotPool, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SlotPool")
        .field("capacity", &pool.capacity())
        .field("available", &pool.len())
        .finish()
}

/// Debug function for SlotTable
///
/// Lists in-use ids only; values stay opaque.
pub fn debug_slot_table<T>(table: &SlotTable<T>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SlotTable")
        .field("capacity", &table.capacity())
        .field("in_use", &table.ids())
        .finish_non_exhaustive()
}
