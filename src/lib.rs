//! x11wire - server-side X11 wire codec
//!
//! Decodes the byte streams of X11 clients into structured requests and
//! encodes structured replies, errors and setup responses back into wire
//! bytes. Rendering and window management belong to the host; moving bytes
//! over sockets belongs to the transport. This crate sits in between.
//!
//! - [`protocol`]: pure codec (binary views, request layouts, replies)
//! - [`connection`]: per-client framing and sequence numbers
//! - [`server`]: the engine routing transport traffic to a [`server::Host`]

pub mod connection;
pub mod error;
pub mod protocol;
pub mod server;

pub use connection::{Connection, ConnectionEvent, ConnectionId, ConnectionState};
pub use error::{CodecError, ConnectionError, EngineError};
pub use protocol::{Record, Reply, Request, RequestHeader};
pub use server::{Engine, EngineConfig, Host, Transport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
