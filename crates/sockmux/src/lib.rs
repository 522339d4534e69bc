//! Top-level facade crate for sockmux.
//!
//! Re-exports the packet core and the client library so users can depend on a
//! single crate.

pub mod core {
    pub use sockmux_core::*;
}

pub mod client {
    pub use sockmux_client::*;
}

pub use sockmux_client::{
    dial, session, Connection, ConnOptions, Context, EventMux, Handler, NamespaceMux,
    PacketTypeMux,
};
pub use sockmux_core::{Error, Packet, PacketType, Result};
