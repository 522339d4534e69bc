//! sockmux core: transport-agnostic packet model, wire codec, and error types.
//!
//! This crate defines the wire-level contracts shared by the client runtime and
//! any other consumer of the protocol. It carries no transport or runtime
//! dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! Malformed inbound text surfaces as `DecodeError`, never as a crash.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{DecodeError, Error, ErrorKind, Result};
pub use protocol::{Packet, PacketType, ROOT_NAMESPACE};
