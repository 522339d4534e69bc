//! Protocol modules (packet model + text codec).
//!
//! One transport message carries exactly one packet:
//! `<type digit>[<namespace>,][<ack id>][<JSON body>]`.
//!
//! All parsers are panic-free: malformed input is reported as `DecodeError`
//! instead of panicking or indexing raw buffers.

pub mod codec;
pub mod packet;

pub use packet::{Packet, PacketType, ROOT_NAMESPACE};
