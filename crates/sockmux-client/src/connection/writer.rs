//! Framed writers: buffer one message privately, then hand it to the write queue.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// One outbound message under construction.
#[async_trait]
pub trait MessageWriter: Send {
    /// Append to the private buffer.
    fn write(&mut self, buf: &[u8]);
    /// Submit the buffered bytes as one message.
    async fn flush(self: Box<Self>);
}

/// Source of fresh writers (implemented by `Connection`).
pub trait WriterFactory: Send + Sync {
    fn new_writer(&self) -> Box<dyn MessageWriter>;
}

/// Buffering writer bound to a connection's queue and shutdown signal.
#[derive(Debug)]
pub struct FramedWriter {
    queue: mpsc::Sender<Bytes>,
    shutdown: CancellationToken,
    buf: BytesMut,
}

impl FramedWriter {
    pub(crate) fn new(queue: mpsc::Sender<Bytes>, shutdown: CancellationToken) -> Self {
        Self {
            queue,
            shutdown,
            buf: BytesMut::new(),
        }
    }

    pub fn write(&mut self, buf: &[u8]) {
        self.buf.extend_from_slice(buf);
    }

    /// Enqueue the whole buffer as one message.
    ///
    /// Waits while the queue is full. Once the connection is shutting down the
    /// message is dropped instead; either way this never fails, so callers
    /// cannot tell a sent message from one dropped during close.
    pub async fn flush(self) {
        let FramedWriter {
            queue,
            shutdown,
            buf,
        } = self;

        if shutdown.is_cancelled() {
            tracing::debug!(len = buf.len(), "connection closed; message dropped");
            return;
        }

        let len = buf.len();
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                tracing::debug!(len, "connection closing; message dropped");
            }
            res = queue.send(buf.freeze()) => {
                if res.is_err() {
                    tracing::debug!(len, "write pump gone; message dropped");
                }
            }
        }
    }
}

#[async_trait]
impl MessageWriter for FramedWriter {
    fn write(&mut self, buf: &[u8]) {
        FramedWriter::write(self, buf);
    }

    async fn flush(self: Box<Self>) {
        FramedWriter::flush(*self).await;
    }
}
