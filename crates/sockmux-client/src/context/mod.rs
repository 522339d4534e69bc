//! Per-packet context handed to handlers.
//!
//! A `Context` binds one decoded inbound packet to the connection's writer
//! factory. It is cheap to clone and `'static`, so a handler may move it into
//! a spawned task and keep emitting after the handler itself has returned.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use sockmux_core::error::{Error, Result};
use sockmux_core::protocol::codec;
use sockmux_core::{Packet, PacketType};

use crate::connection::WriterFactory;

#[derive(Clone)]
pub struct Context {
    writers: Arc<dyn WriterFactory>,
    packet: Arc<Packet>,
    event: Arc<str>,
}

impl Context {
    /// Bind `packet` to `writers`. Fails when an EVENT/ACK body does not start
    /// with a string event name.
    pub fn new(writers: Arc<dyn WriterFactory>, packet: Packet) -> Result<Self> {
        let event = packet.event_name()?.unwrap_or_default();
        Ok(Self {
            writers,
            packet: Arc::new(packet),
            event: event.into(),
        })
    }

    /// Event name, or `""` for packet types that carry none.
    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn namespace(&self) -> &str {
        &self.packet.namespace
    }

    pub fn packet_type(&self) -> PacketType {
        self.packet.packet_type
    }

    pub fn ack_id(&self) -> Option<u64> {
        self.packet.ack_id
    }

    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    /// Decode the positional arguments (event name excluded) into `T`,
    /// typically a tuple: `let (n, s): (i64, String) = ctx.args()?;`.
    pub fn args<T: DeserializeOwned>(&self) -> Result<T> {
        let items = self.packet.arg_items()?;
        let joined = items.iter().map(|raw| raw.get()).collect::<Vec<_>>().join(",");
        serde_json::from_str(&format!("[{joined}]"))
            .map_err(|e| Error::InvalidArgs(e.to_string()))
    }

    /// Decode the argument at `index` (event name excluded).
    pub fn arg<T: DeserializeOwned>(&self, index: usize) -> Result<T> {
        let items = self.packet.arg_items()?;
        let raw = items
            .get(index)
            .ok_or_else(|| Error::InvalidArgs(format!("no argument at index {index}")))?;
        serde_json::from_str(raw.get()).map_err(|e| Error::InvalidArgs(e.to_string()))
    }

    /// Send `event` with `args` (a tuple, or `()` for none) in this packet's
    /// namespace. Succeeds once the message is queued; delivery is not confirmed.
    pub async fn emit<A>(&self, event: &str, args: &A) -> Result<()>
    where
        A: Serialize + Sync + ?Sized,
    {
        let frame = codec::encode_event(&self.packet.namespace, event, args)?;
        self.send(&frame).await;
        Ok(())
    }

    /// Send a bare DISCONNECT for this packet's namespace.
    pub async fn disconnect(&self) -> Result<()> {
        let frame = codec::encode_disconnect(&self.packet.namespace);
        self.send(&frame).await;
        Ok(())
    }

    async fn send(&self, frame: &[u8]) {
        let mut writer = self.writers.new_writer();
        writer.write(frame);
        writer.flush().await;
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("packet", &self.packet)
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}
