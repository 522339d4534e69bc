//! Dispatch module exports.
//!
//! Re-exports the handler capability and the three multiplexers so downstream
//! consumers can depend on this module directly.

pub mod handler;
pub mod mux;

pub use handler::{handler_fn, Handler, HandlerFn};
pub use mux::{EventMux, NamespaceMux, PacketTypeMux};
