//! sockmux demo client
//!
//! - Dials the endpoint from `sockmux.yaml` (or the path given as first arg)
//! - On CONNECT: emits `/message` once per second, 30 times, then disconnects
//! - On EVENT `news`: logs the payload
//!
//! The peer must speak bare packets over WebSocket text frames (`0`, `2[...]`).
//! There is no Engine.IO handshake, so a stock `/socket.io/?EIO=...` endpoint
//! would read the outgoing `2[...]` frames as pings.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

use sockmux_client::{config, dial, session, EventMux, PacketTypeMux};
use sockmux_core::{PacketType, Result};

#[derive(Serialize)]
struct Hello {
    id: u32,
    msg: &'static str,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "sockmux.yaml".to_string());
    let cfg = config::load_from_file(&path)?;

    let conn = Arc::new(dial(&cfg.url, &cfg.conn_options()).await?);

    let root = PacketTypeMux::new();
    root.handle_fn(PacketType::Connect, |ctx| async move {
        tokio::spawn(async move {
            for id in 0..30 {
                if let Err(e) = ctx.emit("/message", &(Hello { id, msg: "hello" },)).await {
                    tracing::warn!(error = %e, "emit failed");
                }
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            if let Err(e) = ctx.disconnect().await {
                tracing::warn!(error = %e, "disconnect failed");
            }
        });
    });

    let events = EventMux::new();
    events.handle_fn("news", |ctx| async move {
        match ctx.args::<(Value,)>() {
            Ok((news,)) => tracing::info!(%news, "news"),
            Err(e) => tracing::warn!(error = %e, "bad news payload"),
        }
    });
    root.handle(PacketType::Event, events);

    tracing::info!(url = %cfg.url, "sockmux demo client starting");
    session::serve(conn, Arc::new(root)).await
}
