//! Text packet codec (panic-free).
//!
//! Parsing rules:
//! - Never index by byte offset; split only at positions returned by `find`.
//! - Never `unwrap()` / `expect()` / `panic!()` in production paths.
//!
//! Encoded EVENT frames end with a line break; peers parse the body as JSON,
//! where trailing whitespace is insignificant.

use bytes::Bytes;
use serde::Serialize;
use serde_json::value::RawValue;

use crate::error::{DecodeError, Error, Result};
use crate::protocol::packet::{Packet, PacketType, ROOT_NAMESPACE};

/// Decode one inbound message into a `Packet`.
pub fn decode(input: &[u8]) -> std::result::Result<Packet, DecodeError> {
    let text = std::str::from_utf8(input)
        .map_err(|e| DecodeError::InvalidBody(format!("message is not utf-8: {e}")))?
        .trim_end();

    let mut chars = text.chars();
    let Some(digit) = chars.next() else {
        return Err(DecodeError::Empty);
    };
    let packet_type = PacketType::from_digit(digit).ok_or(DecodeError::InvalidType(digit))?;
    let mut rest = chars.as_str();

    // Binary packets announce an attachment count (`<n>-`); attachments themselves
    // are not supported, so the count is validated and dropped.
    if packet_type.is_binary() {
        let (count, tail) = take_digits(rest);
        if let Some(tail) = tail.strip_prefix('-') {
            count
                .parse::<u32>()
                .map_err(|_| DecodeError::InvalidAttachments)?;
            rest = tail;
        }
    }

    let mut namespace = ROOT_NAMESPACE.to_string();
    if rest.starts_with('/') {
        let (ns, tail) = rest.split_once(',').unwrap_or((rest, ""));
        namespace = ns.to_string();
        rest = tail;
    }

    let (ack, tail) = take_digits(rest);
    let ack_id = if ack.is_empty() {
        None
    } else {
        Some(ack.parse::<u64>().map_err(|_| DecodeError::InvalidAckId)?)
    };
    rest = tail.trim();

    let body = if rest.is_empty() {
        if packet_type.has_body() {
            return Err(DecodeError::MissingBody(packet_type.as_str()));
        }
        None
    } else {
        let raw = RawValue::from_string(rest.to_string())
            .map_err(|e| DecodeError::InvalidBody(e.to_string()))?;
        if packet_type.has_body() && !raw.get().starts_with('[') {
            return Err(DecodeError::InvalidBody(format!(
                "{} body must be a JSON array",
                packet_type
            )));
        }
        Some(raw)
    };

    tracing::trace!(packet_type = %packet_type, %namespace, ?ack_id, "packet decoded");

    Ok(Packet {
        packet_type,
        namespace,
        ack_id,
        body,
    })
}

/// Encode an EVENT: `2[<ns>,]["event",args...]\n`.
///
/// `args` must serialize to a JSON array (use a tuple, e.g. `(1, "x")`) or to
/// `null` (`()` for no arguments). Nothing is produced on failure.
pub fn encode_event<A>(namespace: &str, event: &str, args: &A) -> Result<Bytes>
where
    A: Serialize + ?Sized,
{
    let args_json =
        serde_json::to_vec(args).map_err(|e| Error::Serialization(e.to_string()))?;
    let inner: &[u8] = if args_json.as_slice() == b"null" {
        b""
    } else {
        args_json
            .strip_prefix(b"[")
            .and_then(|a| a.strip_suffix(b"]"))
            .ok_or_else(|| {
                Error::Serialization("arguments must serialize as a sequence (use a tuple)".into())
            })?
    };
    let name = serde_json::to_vec(event).map_err(|e| Error::Serialization(e.to_string()))?;

    let mut frame = Vec::with_capacity(namespace.len() + name.len() + inner.len() + 6);
    frame.push(PacketType::Event.as_digit());
    push_namespace(&mut frame, namespace);
    frame.push(b'[');
    frame.extend_from_slice(&name);
    if !inner.is_empty() {
        frame.push(b',');
        frame.extend_from_slice(inner);
    }
    frame.push(b']');
    frame.push(b'\n');
    Ok(Bytes::from(frame))
}

/// Encode a bare DISCONNECT for `namespace`.
pub fn encode_disconnect(namespace: &str) -> Bytes {
    let mut frame = vec![PacketType::Disconnect.as_digit()];
    push_namespace(&mut frame, namespace);
    Bytes::from(frame)
}

/// Encode any packet back to its wire form (no trailing line break).
pub fn encode_packet(packet: &Packet) -> Bytes {
    let mut frame = vec![packet.packet_type.as_digit()];
    push_namespace(&mut frame, &packet.namespace);
    if let Some(id) = packet.ack_id {
        frame.extend_from_slice(id.to_string().as_bytes());
    }
    if let Some(body) = packet.body.as_deref() {
        frame.extend_from_slice(body.get().as_bytes());
    }
    Bytes::from(frame)
}

fn push_namespace(frame: &mut Vec<u8>, namespace: &str) {
    if namespace.is_empty() || namespace == ROOT_NAMESPACE {
        return;
    }
    if !namespace.starts_with('/') {
        frame.push(b'/');
    }
    frame.extend_from_slice(namespace.as_bytes());
    frame.push(b',');
}

fn take_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Custom {
        id: u32,
        msg: &'static str,
    }

    #[test]
    fn encode_event_literals() {
        assert_eq!(&encode_event("/", "hello", &()).unwrap()[..], b"2[\"hello\"]\n");
        assert_eq!(
            &encode_event("/", "string", &("hoge",)).unwrap()[..],
            b"2[\"string\",\"hoge\"]\n"
        );
        assert_eq!(&encode_event("/", "number", &(1,)).unwrap()[..], b"2[\"number\",1]\n");
        let custom = Custom { id: 15, msg: "hello" };
        assert_eq!(
            &encode_event("/", "custom", &(custom,)).unwrap()[..],
            b"2[\"custom\",{\"id\":15,\"msg\":\"hello\"}]\n"
        );
    }

    #[test]
    fn encode_event_in_namespace() {
        let b = encode_event("/chat", "join", &("room",)).unwrap();
        assert_eq!(&b[..], b"2/chat,[\"join\",\"room\"]\n");
    }

    #[test]
    fn non_sequence_args_fail_without_output() {
        let err = encode_event("/", "bad", &42).unwrap_err();
        assert_eq!(err.kind().as_str(), "SERIALIZATION");
    }

    #[test]
    fn unserializable_args_fail() {
        use std::collections::HashMap;
        let mut m: HashMap<(u8, u8), u8> = HashMap::new();
        m.insert((1, 2), 3);
        let err = encode_event("/", "bad", &(m,)).unwrap_err();
        assert_eq!(err.kind().as_str(), "SERIALIZATION");
    }

    #[test]
    fn disconnect_is_bare_digit() {
        assert_eq!(&encode_disconnect("/")[..], b"1");
        assert_eq!(&encode_disconnect("/chat")[..], b"1/chat,");
    }

    #[test]
    fn decode_namespace_and_ack() {
        let p = decode(b"2/chat,17[\"msg\",\"hi\"]").unwrap();
        assert_eq!(p.packet_type, PacketType::Event);
        assert_eq!(p.namespace, "/chat");
        assert_eq!(p.ack_id, Some(17));
        assert_eq!(p.event_name().unwrap().as_deref(), Some("msg"));
    }

    #[test]
    fn decode_binary_attachment_count_is_skipped() {
        let p = decode(b"51-/ns,[\"upload\",{\"_placeholder\":true,\"num\":0}]").unwrap();
        assert_eq!(p.packet_type, PacketType::BinaryEvent);
        assert_eq!(p.namespace, "/ns");
        assert_eq!(p.ack_id, None);
    }

    #[test]
    fn empty_input_is_end_of_input() {
        assert_eq!(decode(b"").unwrap_err(), DecodeError::Empty);
        assert_eq!(decode(b"\n").unwrap_err(), DecodeError::Empty);
    }

    #[test]
    fn encode_packet_matches_decode() {
        let p = decode(b"3/chat,5[\"ok\"]").unwrap();
        assert_eq!(&encode_packet(&p)[..], b"3/chat,5[\"ok\"]");
    }
}
