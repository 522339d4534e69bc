//! Connection: exclusive owner of one transport.
//!
//! - Writes: any number of `FramedWriter`s feed one bounded queue; a single
//!   write-pump task is the only writer to the transport.
//! - Reads: `next_message` holds the read half behind a mutex, so there is at
//!   most one active reader.
//! - Shutdown: one cancellation token observed by the pump, every writer, and
//!   the reader. `close` may be called any number of times. The transport close
//!   is bounded by `ConnOptions::close_timeout`, after which both halves are
//!   dropped, so a peer that stopped reading cannot stall shutdown.

mod writer;

use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use sockmux_core::error::{Error, Result};

use crate::config::ConnOptions;
use crate::transport::{Frame, FrameSink, FrameStream, Transport};

pub use writer::{FramedWriter, MessageWriter, WriterFactory};

// Extra time `close` allows the pump beyond the transport close itself.
const PUMP_GRACE: Duration = Duration::from_millis(500);

pub struct Connection {
    queue: mpsc::Sender<Bytes>,
    shutdown: CancellationToken,
    reader: Mutex<Option<Box<dyn FrameStream>>>,
    pump: Mutex<Option<JoinHandle<Result<()>>>>,
    close_timeout: Duration,
}

impl Connection {
    /// Take ownership of an already-connected transport and start its write pump.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new<T: Transport>(transport: T, options: &ConnOptions) -> Self {
        let (sink, stream) = transport.split();
        let (queue, rx) = mpsc::channel(options.queue_size.max(1));
        let shutdown = CancellationToken::new();
        let pump = tokio::spawn(write_pump(
            sink,
            rx,
            shutdown.clone(),
            options.close_timeout,
        ));

        Self {
            queue,
            shutdown,
            reader: Mutex::new(Some(Box::new(stream))),
            pump: Mutex::new(Some(pump)),
            close_timeout: options.close_timeout,
        }
    }

    pub fn new_writer(&self) -> FramedWriter {
        FramedWriter::new(self.queue.clone(), self.shutdown.clone())
    }

    /// Wait for the next inbound text message.
    ///
    /// Ping/Pong frames are skipped. A binary frame is `UnsupportedFrame`; peer
    /// close, end of stream, and local shutdown are `Closed`.
    pub async fn next_message(&self) -> Result<Bytes> {
        let mut guard = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return Err(Error::Closed),
            guard = self.reader.lock() => guard,
        };
        let Some(reader) = guard.as_mut() else {
            return Err(Error::Closed);
        };

        loop {
            let frame = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return Err(Error::Closed),
                frame = reader.next_frame() => frame,
            };

            match frame {
                Some(Ok(Frame::Text(text))) => return Ok(Bytes::from(text)),
                Some(Ok(Frame::Binary(data))) => {
                    return Err(Error::UnsupportedFrame(format!(
                        "binary frame of {} bytes (only text frames are supported)",
                        data.len()
                    )));
                }
                Some(Ok(Frame::Ping | Frame::Pong)) => continue,
                Some(Ok(Frame::Close)) | None => return Err(Error::Closed),
                Some(Err(e)) => return Err(e),
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Signal shutdown, wait for the write pump to exit, and return the
    /// transport's close result. Later calls return `Ok(())`.
    ///
    /// Returns within roughly `close_timeout` even when the peer has stopped
    /// reading; the transport is dropped rather than closed gracefully then.
    pub async fn close(&self) -> Result<()> {
        self.shutdown.cancel();

        // a pending reader observes the token and releases the lock promptly
        drop(self.reader.lock().await.take());

        let pump = self.pump.lock().await.take();
        let Some(mut handle) = pump else {
            return Ok(());
        };
        match tokio::time::timeout(self.close_timeout + PUMP_GRACE, &mut handle).await {
            Ok(joined) => {
                joined.map_err(|e| Error::Transport(format!("write pump failed: {e}")))?
            }
            Err(_) => {
                handle.abort();
                tracing::warn!("write pump did not stop in time; aborted");
                Err(Error::Transport("write pump did not stop in time".into()))
            }
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("queued", &(self.queue.max_capacity() - self.queue.capacity()))
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl WriterFactory for Connection {
    fn new_writer(&self) -> Box<dyn MessageWriter> {
        Box::new(Connection::new_writer(self))
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn write_pump<S: FrameSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<Bytes>,
    shutdown: CancellationToken,
    close_timeout: Duration,
) -> Result<()> {
    loop {
        let message = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            message = rx.recv() => match message {
                Some(m) => m,
                None => break,
            },
        };

        let text = match String::from_utf8(message.to_vec()) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "dropping non-utf8 outbound message");
                continue;
            }
        };

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            res = sink.send_text(text) => {
                if let Err(e) = res {
                    // best-effort: one failed message does not stop the pump
                    tracing::warn!(error = %e, "outbound message dropped");
                }
            }
        }
    }

    tracing::debug!("write pump stopping");
    match tokio::time::timeout(close_timeout, sink.close()).await {
        Ok(res) => res,
        Err(_) => {
            tracing::warn!(?close_timeout, "transport close timed out; dropping it");
            Err(Error::Transport(format!(
                "transport close timed out after {close_timeout:?}"
            )))
        }
    }
}
