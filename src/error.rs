//! Error types for the wire codec and the engine.

use thiserror::Error;

/// Failure of a single decode or encode call.
///
/// These never outlive the call that produced them: the record (or reply)
/// being processed is abandoned, nothing else is affected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Read or write past the end of a byte region.
    #[error("access of {width} bytes at offset {offset} exceeds region of {len} bytes")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },

    /// A field holds a value outside its protocol range.
    #[error("invalid value {value:#x} for {field}")]
    InvalidValue { field: &'static str, value: u32 },

    /// No decoder is registered for this opcode.
    #[error("no decoder for opcode {0}")]
    UnsupportedOpcode(u8),
}

/// Connection-scoped fatal errors. The connection that raised one is closed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// The record loop could not make progress: a zero-length record, or
    /// more records in one chunk than the configured cap.
    #[error("framing guard tripped after {iterations} records (declared length {declared_len})")]
    FramingGuardTripped {
        iterations: usize,
        declared_len: usize,
    },

    /// The setup handshake could not be decoded.
    #[error("setup decode failed: {0}")]
    SetupDecode(CodecError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Errors surfaced by the engine's entry points.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Inbound traffic or a submission names a connection that is not registered.
    #[error("no connection registered for id {0}")]
    UnknownConnection(String),

    /// A connection id that is not 19 bytes of hex.
    #[error("malformed connection id {0:?}")]
    InvalidConnectionId(String),

    /// A binary frame too short to carry a connection id.
    #[error("data frame of {0} bytes is shorter than a connection id")]
    ShortFrame(usize),

    /// An unrecognised control-channel message.
    #[error("unknown control message {0:?}")]
    BadControlMessage(String),

    /// A reply was submitted before the client finished its setup handshake.
    #[error("connection {0} has not completed setup")]
    NotEstablished(String),

    /// A connection hit a fatal error and was closed.
    #[error("connection {id} closed: {source}")]
    Connection {
        id: String,
        #[source]
        source: ConnectionError,
    },

    #[error("encode failed: {0}")]
    Encode(#[from] CodecError),

    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}
