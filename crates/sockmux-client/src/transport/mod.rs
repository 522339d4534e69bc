//! Transport boundary.
//!
//! A transport is split once into a sink (owned by the connection's write pump)
//! and a frame stream (owned by the connection's guarded reader), so the
//! underlying socket never sees concurrent writers or concurrent readers.

pub mod memory;
pub mod ws;

use async_trait::async_trait;
use bytes::Bytes;

use sockmux_core::error::Result;

/// One inbound transport frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Bytes),
    Ping,
    Pong,
    Close,
}

/// Write half: one message in, one text frame out.
#[async_trait]
pub trait FrameSink: Send + 'static {
    async fn send_text(&mut self, text: String) -> Result<()>;
    async fn close(&mut self) -> Result<()>;
}

/// Read half. `None` means the peer is gone.
#[async_trait]
pub trait FrameStream: Send + 'static {
    async fn next_frame(&mut self) -> Option<Result<Frame>>;
}

/// An already-connected duplex transport.
pub trait Transport: Send + 'static {
    type Sink: FrameSink;
    type Stream: FrameStream;

    fn split(self) -> (Self::Sink, Self::Stream);
}
