//! X11 protocol wire codec
//!
//! Requests in, replies, errors and setup responses out. Everything here is
//! pure: no I/O and no connection state.

pub mod encoder;
pub mod errors;
pub mod extras;
pub mod opcodes;
pub mod parser;
pub mod replies;
pub mod requests;
pub mod setup;
pub mod types;
pub mod values;
pub mod view;

pub use encoder::*;
pub use errors::*;
pub use extras::*;
pub use opcodes::*;
pub use parser::*;
pub use replies::*;
pub use requests::*;
pub use setup::*;
pub use types::*;
pub use values::*;
pub use view::*;

/// X11 protocol version
pub const PROTOCOL_MAJOR_VERSION: u16 = 11;
pub const PROTOCOL_MINOR_VERSION: u16 = 0;

/// Padding helper - X11 requires data to be padded to 4-byte boundaries
pub fn pad(n: usize) -> usize {
    (4 - (n % 4)) % 4
}

/// Calculate padded length
pub fn padded_len(n: usize) -> usize {
    n + pad(n)
}
