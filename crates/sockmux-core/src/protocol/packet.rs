//! Decoded packet model.
//!
//! The body is kept as `RawValue` so consumers can parse it lazily, into
//! whatever shape they need, as many times as they need.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use crate::error::DecodeError;

/// Namespace used when a packet names none.
pub const ROOT_NAMESPACE: &str = "/";

/// Protocol-level discriminant of one packet (wire digits `0`..`6`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PacketType {
    #[default]
    Connect,
    Disconnect,
    Event,
    Ack,
    Error,
    BinaryEvent,
    BinaryAck,
}

impl PacketType {
    /// Parse the leading wire digit.
    pub fn from_digit(c: char) -> Option<Self> {
        match c {
            '0' => Some(PacketType::Connect),
            '1' => Some(PacketType::Disconnect),
            '2' => Some(PacketType::Event),
            '3' => Some(PacketType::Ack),
            '4' => Some(PacketType::Error),
            '5' => Some(PacketType::BinaryEvent),
            '6' => Some(PacketType::BinaryAck),
            _ => None,
        }
    }

    pub fn as_digit(self) -> u8 {
        match self {
            PacketType::Connect => b'0',
            PacketType::Disconnect => b'1',
            PacketType::Event => b'2',
            PacketType::Ack => b'3',
            PacketType::Error => b'4',
            PacketType::BinaryEvent => b'5',
            PacketType::BinaryAck => b'6',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PacketType::Connect => "CONNECT",
            PacketType::Disconnect => "DISCONNECT",
            PacketType::Event => "EVENT",
            PacketType::Ack => "ACK",
            PacketType::Error => "ERROR",
            PacketType::BinaryEvent => "BINARY_EVENT",
            PacketType::BinaryAck => "BINARY_ACK",
        }
    }

    /// Whether a JSON array body is mandatory for this type.
    pub fn has_body(self) -> bool {
        matches!(
            self,
            PacketType::Event | PacketType::Ack | PacketType::BinaryEvent | PacketType::BinaryAck
        )
    }

    /// Whether element 0 of the body is the event name.
    pub fn carries_event_name(self) -> bool {
        self.has_body()
    }

    pub fn is_binary(self) -> bool {
        matches!(self, PacketType::BinaryEvent | PacketType::BinaryAck)
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded protocol unit. Immutable once decoded.
#[derive(Debug, Clone)]
pub struct Packet {
    pub packet_type: PacketType,
    /// Logical sub-channel; `ROOT_NAMESPACE` when absent on the wire.
    pub namespace: String,
    /// Correlates an ACK reply to a prior EVENT.
    pub ack_id: Option<u64>,
    /// Raw JSON payload (lazy parsing).
    pub body: Option<Box<RawValue>>,
}

impl Default for Packet {
    fn default() -> Self {
        Self::new(PacketType::default())
    }
}

impl Packet {
    /// Bodiless packet in the root namespace.
    pub fn new(packet_type: PacketType) -> Self {
        Self {
            packet_type,
            namespace: ROOT_NAMESPACE.to_string(),
            ack_id: None,
            body: None,
        }
    }

    /// Attach a raw JSON body (validated for syntax only).
    pub fn with_body(mut self, raw: &str) -> Result<Self, DecodeError> {
        let body = RawValue::from_string(raw.to_string())
            .map_err(|e| DecodeError::InvalidBody(e.to_string()))?;
        self.body = Some(body);
        Ok(self)
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_ack_id(mut self, ack_id: u64) -> Self {
        self.ack_id = Some(ack_id);
        self
    }

    pub fn is_root_namespace(&self) -> bool {
        self.namespace.is_empty() || self.namespace == ROOT_NAMESPACE
    }

    /// Split the array body into its raw elements. A missing body is an empty list.
    pub fn items(&self) -> Result<Vec<&RawValue>, DecodeError> {
        let Some(body) = self.body.as_deref() else {
            return Ok(Vec::new());
        };
        serde_json::from_str::<Vec<&RawValue>>(body.get())
            .map_err(|e| DecodeError::InvalidBody(format!("expected JSON array: {e}")))
    }

    /// Event name stored in element 0, for types that carry one.
    pub fn event_name(&self) -> Result<Option<String>, DecodeError> {
        if !self.packet_type.carries_event_name() {
            return Ok(None);
        }
        let items = self.items()?;
        let Some(first) = items.first() else {
            return Err(DecodeError::MissingBody(self.packet_type.as_str()));
        };
        let name: String = serde_json::from_str(first.get())
            .map_err(|e| DecodeError::InvalidBody(format!("event name must be a string: {e}")))?;
        Ok(Some(name))
    }

    /// Positional arguments, with the event name slot removed.
    pub fn arg_items(&self) -> Result<Vec<&RawValue>, DecodeError> {
        let mut items = self.items()?;
        if self.packet_type.carries_event_name() && !items.is_empty() {
            items.remove(0);
        }
        Ok(items)
    }

    /// Parse the whole body as `T` (useful for CONNECT/ERROR payloads).
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<Option<T>, DecodeError> {
        let Some(body) = self.body.as_deref() else {
            return Ok(None);
        };
        serde_json::from_str(body.get())
            .map(Some)
            .map_err(|e| DecodeError::InvalidBody(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn event_name_is_first_element() {
        let p = Packet::new(PacketType::Event)
            .with_body(r#"["reply",1,2,3,4,5,6,7]"#)
            .unwrap();
        assert_eq!(p.event_name().unwrap().as_deref(), Some("reply"));
        assert_eq!(p.arg_items().unwrap().len(), 7);
    }

    #[test]
    fn connect_has_no_event_name() {
        let p = Packet::new(PacketType::Connect);
        assert_eq!(p.event_name().unwrap(), None);
        assert!(p.items().unwrap().is_empty());
        assert!(p.is_root_namespace());
    }

    #[test]
    fn non_string_event_name_is_rejected() {
        let p = Packet::new(PacketType::Event).with_body("[1,2]").unwrap();
        assert!(matches!(p.event_name(), Err(DecodeError::InvalidBody(_))));
    }

    #[test]
    fn empty_event_array_is_missing_body() {
        let p = Packet::new(PacketType::Event).with_body("[]").unwrap();
        assert_eq!(p.event_name(), Err(DecodeError::MissingBody("EVENT")));
    }
}
