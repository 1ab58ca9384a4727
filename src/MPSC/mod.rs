mod builder;
mod consumer;
mod producer;

pub use builder::{channel, QueueBuilder};
pub use consumer::Consumer;
pub use producer::Producer;

pub mod Queue {
    pub mod Queue;
    pub mod Queue_impl;
    pub mod layout;
    mod debug;
    mod getters;
    pub use Queue::{RingQueue, Slot, MAX_QUEUE_CAPACITY, MIN_QUEUE_CAPACITY}; // re-export for stable path
}
