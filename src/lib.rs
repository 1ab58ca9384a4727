// Module naming follows project convention (MPSC = Multi-Producer Single-Consumer)
#[allow(non_snake_case)]
pub mod MPSC;
#[allow(non_snake_case)]
pub mod Slots;
#[allow(non_snake_case)]
pub mod Core;
#[allow(non_snake_case)]
pub mod Debug {
    pub mod StructDebug;
}

pub use Core::{
    BackoffPolicy, ConfigError, EnqueueError, HandoffConfig, HandoffContext, PoolError,
    TableError, Tick,
};
pub use MPSC::Queue::RingQueue;
pub use MPSC::{channel, Consumer, Producer, QueueBuilder};
pub use Slots::{SlotPool, SlotTable};
