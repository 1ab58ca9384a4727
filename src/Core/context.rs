use super::config::HandoffConfig;
use super::error::{ConfigError, EnqueueError};
use super::trace;
use crate::MPSC::{Consumer, Producer, QueueBuilder};
use crate::Slots::SlotTable;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Host-owned handoff state: packet ingress plus the connection registry.
///
/// Created once at startup by the embedding host and cloned into every
/// producer context (receive callbacks, per-connection handlers). The
/// matching [`Tick`] is the only way to read the packet queue.
pub struct HandoffContext<P, C> {
    packets: Producer<P>,
    connections: Arc<SlotTable<C>>,
}

/// Consumer side of a [`HandoffContext`], driven by the host's periodic tick.
pub struct Tick<P> {
    packets: Consumer<P>,
}

impl<P, C> HandoffContext<P, C> {
    pub fn build(config: HandoffConfig) -> Result<(Self, Tick<P>), ConfigError> {
        config.validate()?;

        let (producer, consumer) = QueueBuilder::new()
            .with_capacity(config.queue_capacity)
            .with_backoff(config.backoff)
            .build()?;
        let connections = Arc::new(SlotTable::new(config.table_capacity)?);

        trace::info!(
            queue_capacity = config.queue_capacity,
            table_capacity = config.table_capacity,
            "handoff context started"
        );

        Ok((
            Self {
                packets: producer,
                connections,
            },
            Tick { packets: consumer },
        ))
    }

    /// Queue a packet for the next tick.
    pub fn push(&self, packet: P) -> Result<(), EnqueueError<P>> {
        self.packets.send(packet)
    }

    pub fn push_timeout(&self, packet: P, timeout: Duration) -> Result<(), EnqueueError<P>> {
        self.packets.send_timeout(packet, timeout)
    }

    pub fn connections(&self) -> &SlotTable<C> {
        &self.connections
    }

    pub fn packets(&self) -> &Producer<P> {
        &self.packets
    }

    /// Stop accepting packets. The tick can still drain what is queued.
    pub fn shutdown(&self) {
        self.packets.close();
    }

    pub fn is_shut_down(&self) -> bool {
        self.packets.is_closed()
    }
}

impl<P, C> Clone for HandoffContext<P, C> {
    fn clone(&self) -> Self {
        Self {
            packets: self.packets.clone(),
            connections: Arc::clone(&self.connections),
        }
    }
}

impl<P> Tick<P> {
    /// One tick: process every packet available now.
    pub fn run<F>(&mut self, handler: F) -> usize
    where
        F: FnMut(P),
    {
        self.packets.drain(handler)
    }

    /// Close the packet queue and drain it to completion.
    pub fn finish<F>(mut self, handler: F) -> usize
    where
        F: FnMut(P),
    {
        let drained = self.packets.finish(handler);
        trace::info!(drained, "handoff context stopped");
        drained
    }

    /// Approximate number of packets waiting for the next tick.
    pub fn pending(&self) -> usize {
        self.packets.len()
    }
}

impl<P, C> fmt::Debug for HandoffContext<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandoffContext")
            .field("packets", &self.packets)
            .field("connections", &self.connections)
            .finish()
    }
}

impl<P> fmt::Debug for Tick<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tick").field("packets", &self.packets).finish()
    }
}
