//! Dispatch loop: read, decode, build a context, hand it to the root handler.
//!
//! Per-message failures (malformed packet, bad event name) are logged and the
//! message dropped. Channel-level failures (non-text frame, transport error)
//! close the connection and end the loop with that error. A closed transport
//! (peer close, end of stream, local shutdown) also closes the connection, so
//! contexts still held by handler tasks stop writing, and ends the loop cleanly.

use std::sync::Arc;

use sockmux_core::error::{DecodeError, Error, Result};
use sockmux_core::protocol::codec;

use crate::connection::{Connection, WriterFactory};
use crate::context::Context;
use crate::dispatch::Handler;

/// Run until the connection closes. Packets are dispatched one at a time, in
/// arrival order; handlers that need concurrency spawn their own tasks.
pub async fn serve(conn: Arc<Connection>, handler: Arc<dyn Handler>) -> Result<()> {
    let writers: Arc<dyn WriterFactory> = conn.clone();

    loop {
        let message = match conn.next_message().await {
            Ok(message) => message,
            Err(Error::Closed) => {
                tracing::debug!("connection closed; dispatch loop exiting");
                if let Err(e) = conn.close().await {
                    tracing::warn!(error = %e, "close after transport shutdown failed");
                }
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind().as_str(), "read failed; closing connection");
                if let Err(close_err) = conn.close().await {
                    tracing::warn!(error = %close_err, "close after read failure failed");
                }
                return Err(e);
            }
        };

        let packet = match codec::decode(&message) {
            Ok(packet) => packet,
            Err(DecodeError::Empty) => continue,
            Err(e) => {
                tracing::warn!(error = %e, len = message.len(), "dropping malformed packet");
                continue;
            }
        };

        let ctx = match Context::new(writers.clone(), packet) {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::warn!(error = %e, "dropping packet without usable event name");
                continue;
            }
        };

        tracing::debug!(
            packet_type = %ctx.packet_type(),
            namespace = ctx.namespace(),
            event = ctx.event(),
            "dispatching packet"
        );
        handler.handle(ctx).await;
    }
}
