//! sockmux client library entry.
//!
//! This crate wires the transport, connection (write pump + guarded reader),
//! per-packet context, and multiplexers into a client stack. It is consumed by
//! the demo binary (`main.rs`) and by integration tests.

pub mod config;
pub mod connection;
pub mod context;
pub mod dispatch;
pub mod session;
pub mod transport;

pub use config::{ClientConfig, ConnOptions};
pub use connection::{Connection, FramedWriter, MessageWriter, WriterFactory};
pub use context::Context;
pub use dispatch::{handler_fn, EventMux, Handler, HandlerFn, NamespaceMux, PacketTypeMux};
pub use transport::ws::dial;
