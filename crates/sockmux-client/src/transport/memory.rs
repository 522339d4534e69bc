//! In-process transport backed by bounded channels.
//!
//! `pair` returns the client side (`MemoryTransport`) and a `MemoryPeer` that
//! plays the remote end. A peer that stops calling `recv` stalls the client's
//! write pump once `capacity` frames are buffered.

use async_trait::async_trait;
use tokio::sync::mpsc;

use sockmux_core::error::{Error, Result};

use crate::transport::{Frame, FrameSink, FrameStream, Transport};

pub struct MemoryTransport {
    outbound: mpsc::Sender<Frame>,
    inbound: mpsc::Receiver<Frame>,
}

/// Remote end of a `MemoryTransport`.
pub struct MemoryPeer {
    tx: mpsc::Sender<Frame>,
    rx: mpsc::Receiver<Frame>,
}

pub fn pair(capacity: usize) -> (MemoryTransport, MemoryPeer) {
    let (client_tx, peer_rx) = mpsc::channel(capacity.max(1));
    let (peer_tx, client_rx) = mpsc::channel(capacity.max(1));
    (
        MemoryTransport {
            outbound: client_tx,
            inbound: client_rx,
        },
        MemoryPeer {
            tx: peer_tx,
            rx: peer_rx,
        },
    )
}

impl MemoryPeer {
    /// Deliver a frame to the client.
    pub async fn send(&self, frame: Frame) -> Result<()> {
        self.tx
            .send(frame)
            .await
            .map_err(|_| Error::Transport("client side dropped".into()))
    }

    pub async fn send_text(&self, text: impl Into<String>) -> Result<()> {
        self.send(Frame::Text(text.into())).await
    }

    /// Next frame written by the client; `None` once the client side is gone.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }
}

pub struct MemorySink {
    tx: mpsc::Sender<Frame>,
}

pub struct MemoryFrames {
    rx: mpsc::Receiver<Frame>,
}

impl Transport for MemoryTransport {
    type Sink = MemorySink;
    type Stream = MemoryFrames;

    fn split(self) -> (Self::Sink, Self::Stream) {
        (
            MemorySink { tx: self.outbound },
            MemoryFrames { rx: self.inbound },
        )
    }
}

#[async_trait]
impl FrameSink for MemorySink {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.tx
            .send(Frame::Text(text))
            .await
            .map_err(|_| Error::Transport("peer dropped".into()))
    }

    async fn close(&mut self) -> Result<()> {
        // a stalled peer must not block shutdown
        let _ = self.tx.try_send(Frame::Close);
        Ok(())
    }
}

#[async_trait]
impl FrameStream for MemoryFrames {
    async fn next_frame(&mut self) -> Option<Result<Frame>> {
        self.rx.recv().await.map(Ok)
    }
}
