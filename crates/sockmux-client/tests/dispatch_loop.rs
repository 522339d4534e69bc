//! Dispatch loop over an in-memory transport.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use sockmux_client::transport::{memory, Frame};
use sockmux_client::{session, ConnOptions, Connection, EventMux, NamespaceMux, PacketTypeMux};
use sockmux_core::PacketType;

const PROMPT: Duration = Duration::from_secs(2);

fn router(seen: mpsc::UnboundedSender<String>) -> PacketTypeMux {
    let events = EventMux::new();
    {
        let seen = seen.clone();
        events.handle_fn("known", move |ctx| {
            let seen = seen.clone();
            async move {
                let (n,): (i64,) = ctx.args().unwrap();
                seen.send(format!("known:{n}")).unwrap();
                ctx.emit("ack", &(n,)).await.unwrap();
            }
        });
    }

    let chat = EventMux::new();
    {
        let seen = seen.clone();
        chat.handle_fn("msg", move |ctx| {
            let seen = seen.clone();
            async move {
                let text: String = ctx.arg(0).unwrap();
                seen.send(format!("{}:{text}", ctx.namespace())).unwrap();
            }
        });
    }
    let namespaces = NamespaceMux::new();
    namespaces.handle("/", events);
    namespaces.handle("/chat", chat);

    let root = PacketTypeMux::new();
    root.handle(PacketType::Event, namespaces);
    root.handle_fn(PacketType::Connect, move |ctx| {
        let seen = seen.clone();
        async move {
            seen.send(format!("connect:{}", ctx.namespace())).unwrap();
        }
    });
    root
}

#[tokio::test]
async fn misses_and_malformed_packets_do_not_stop_dispatch() {
    let (transport, mut peer) = memory::pair(16);
    let conn = Arc::new(Connection::new(transport, &ConnOptions::default()));
    let (seen_tx, mut seen) = mpsc::unbounded_channel();
    let serve = tokio::spawn(session::serve(conn.clone(), Arc::new(router(seen_tx))));

    for text in [
        "0",
        "2[\"unknown\",1]",
        "2{\"not\":\"an array\"}",
        "",
        "2[42]",
        "3[\"no ack route\"]",
        "2/nowhere,[\"msg\",\"x\"]",
        "2[\"known\",5]",
        "2/chat,[\"msg\",\"hi\"]",
    ] {
        peer.send_text(text).await.unwrap();
    }

    assert_eq!(timeout(PROMPT, seen.recv()).await.unwrap().unwrap(), "connect:/");
    assert_eq!(timeout(PROMPT, seen.recv()).await.unwrap().unwrap(), "known:5");
    assert_eq!(timeout(PROMPT, seen.recv()).await.unwrap().unwrap(), "/chat:hi");
    assert_eq!(
        timeout(PROMPT, peer.recv()).await.unwrap(),
        Some(Frame::Text("2[\"ack\",5]\n".to_string()))
    );

    peer.send(Frame::Close).await.unwrap();
    timeout(PROMPT, serve).await.unwrap().unwrap().unwrap();
    assert!(conn.is_closed());
}

#[tokio::test]
async fn peer_close_stops_late_emits() {
    let (transport, mut peer) = memory::pair(16);
    let conn = Arc::new(Connection::new(transport, &ConnOptions::default()));

    // a handler that keeps its context past the dispatch call
    let (held_tx, mut held) = mpsc::unbounded_channel();
    let events = EventMux::new();
    events.handle_fn("keep", move |ctx| {
        let held_tx = held_tx.clone();
        async move { held_tx.send(ctx).unwrap() }
    });
    let serve = tokio::spawn(session::serve(conn.clone(), Arc::new(events)));

    peer.send_text("2[\"keep\"]").await.unwrap();
    let ctx = timeout(PROMPT, held.recv()).await.unwrap().unwrap();

    peer.send(Frame::Close).await.unwrap();
    timeout(PROMPT, serve).await.unwrap().unwrap().unwrap();
    assert!(conn.is_closed());

    // the pump's own close frame is the last thing the peer sees
    assert_eq!(timeout(PROMPT, peer.recv()).await.unwrap(), Some(Frame::Close));
    timeout(PROMPT, ctx.emit("after", &())).await.unwrap().unwrap();
    assert!(timeout(Duration::from_millis(100), peer.recv()).await.unwrap_or(None).is_none());
}

#[tokio::test]
async fn binary_frame_ends_loop_and_closes() {
    let (transport, peer) = memory::pair(16);
    let conn = Arc::new(Connection::new(transport, &ConnOptions::default()));
    let (seen_tx, _seen) = mpsc::unbounded_channel();
    let serve = tokio::spawn(session::serve(conn.clone(), Arc::new(router(seen_tx))));

    peer.send(Frame::Binary(bytes::Bytes::from_static(b"\x01"))).await.unwrap();

    let err = timeout(PROMPT, serve).await.unwrap().unwrap().unwrap_err();
    assert_eq!(err.kind().as_str(), "UNSUPPORTED_FRAME");
    assert!(conn.is_closed());
}

#[tokio::test]
async fn local_close_ends_loop_cleanly() {
    let (transport, _peer) = memory::pair(16);
    let conn = Arc::new(Connection::new(transport, &ConnOptions::default()));
    let (seen_tx, _seen) = mpsc::unbounded_channel();
    let serve = tokio::spawn(session::serve(conn.clone(), Arc::new(router(seen_tx))));

    tokio::time::sleep(Duration::from_millis(50)).await;
    conn.close().await.unwrap();
    timeout(PROMPT, serve).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn last_registration_wins() {
    let (transport, peer) = memory::pair(16);
    let conn = Arc::new(Connection::new(transport, &ConnOptions::default()));
    let (tx, mut rx) = mpsc::unbounded_channel::<&'static str>();

    let events = EventMux::new();
    let first = tx.clone();
    events.handle_fn("e", move |_ctx| {
        let first = first.clone();
        async move { first.send("first").unwrap() }
    });
    events.handle_fn("e", move |_ctx| {
        let tx = tx.clone();
        async move { tx.send("second").unwrap() }
    });
    assert_eq!(events.events(), vec!["e".to_string()]);

    let serve = tokio::spawn(session::serve(conn.clone(), Arc::new(events)));
    peer.send_text("2[\"e\"]").await.unwrap();
    assert_eq!(timeout(PROMPT, rx.recv()).await.unwrap(), Some("second"));

    conn.close().await.unwrap();
    timeout(PROMPT, serve).await.unwrap().unwrap().unwrap();
}
