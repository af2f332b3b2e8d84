//! The transport contract the session drives.
//!
//! The engine never touches sockets. A transport delivers connect/disconnect
//! edges and decoded inbound messages as an ordered event stream, and accepts
//! fire-and-forget outbound packets. Per-connection message order must be
//! preserved; `recv` must be cancel-safe because the reactor polls it inside
//! a `select!` loop.
//!
//! [`MemoryTransport`] is an in-process loopback used by the test suites and
//! by embedders that splice the engine onto their own socket layer through a
//! pair of channels.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::message::{Message, Packet};

/// What a transport reports upward.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    Packet(Message),
}

#[async_trait]
pub trait Transport: Send + 'static {
    /// Establish the connection. A `Connected` event must follow on `recv`.
    async fn connect(&mut self) -> Result<()>;

    /// Tear the connection down. A `Disconnected` event must follow.
    async fn disconnect(&mut self);

    /// Fire-and-forget send of one packet.
    async fn send(&mut self, packet: Packet) -> Result<()>;

    /// Next inbound event, in arrival order. `None` means the transport is
    /// gone for good.
    async fn recv(&mut self) -> Option<TransportEvent>;
}

/// Channel-backed loopback transport.
pub struct MemoryTransport {
    events_tx: mpsc::UnboundedSender<TransportEvent>,
    events_rx: mpsc::UnboundedReceiver<TransportEvent>,
    outbound_tx: mpsc::UnboundedSender<Packet>,
}

/// The far end of a [`MemoryTransport`]: inject inbound events, observe
/// outbound packets.
pub struct MemoryHarness {
    pub events: mpsc::UnboundedSender<TransportEvent>,
    pub outbound: mpsc::UnboundedReceiver<Packet>,
}

/// Create a connected transport/harness pair.
pub fn memory_pair() -> (MemoryTransport, MemoryHarness) {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    (
        MemoryTransport {
            events_tx: events_tx.clone(),
            events_rx,
            outbound_tx,
        },
        MemoryHarness {
            events: events_tx,
            outbound: outbound_rx,
        },
    )
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn connect(&mut self) -> Result<()> {
        let _ = self.events_tx.send(TransportEvent::Connected);
        Ok(())
    }

    async fn disconnect(&mut self) {
        let _ = self.events_tx.send(TransportEvent::Disconnected);
    }

    async fn send(&mut self, packet: Packet) -> Result<()> {
        self.outbound_tx
            .send(packet)
            .map_err(|_| anyhow::anyhow!("transport harness dropped"))
    }

    async fn recv(&mut self) -> Option<TransportEvent> {
        self.events_rx.recv().await
    }
}
