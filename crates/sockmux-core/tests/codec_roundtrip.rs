//! Encode/decode agreement for event names.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use sockmux_core::protocol::codec::{decode, encode_disconnect, encode_event};
use sockmux_core::{PacketType, ROOT_NAMESPACE};

#[test]
fn event_name_survives_roundtrip() {
    for name in ["message", "/message", "with space", "ünïcödé", "quote\"d", ""] {
        let wire = encode_event(ROOT_NAMESPACE, name, &()).unwrap();
        let packet = decode(&wire).unwrap();
        assert_eq!(packet.packet_type, PacketType::Event);
        assert_eq!(packet.event_name().unwrap().as_deref(), Some(name));
        assert!(packet.arg_items().unwrap().is_empty());
    }
}

#[test]
fn namespaced_event_roundtrip_keeps_args() {
    let wire = encode_event("/chat", "send", &("hi", 2, [1, 2])).unwrap();
    let packet = decode(&wire).unwrap();
    assert_eq!(packet.namespace, "/chat");
    let args = packet.arg_items().unwrap();
    assert_eq!(args.len(), 3);
    assert_eq!(args[2].get(), "[1,2]");
}

#[test]
fn disconnect_roundtrip() {
    let packet = decode(&encode_disconnect("/chat")).unwrap();
    assert_eq!(packet.packet_type, PacketType::Disconnect);
    assert_eq!(packet.namespace, "/chat");
    assert!(packet.body.is_none());
}
