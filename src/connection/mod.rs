//! Per-client protocol state
//!
//! A `Connection` owns the reassembly buffer for one client. Chunks of the
//! client's byte stream go in through [`Connection::feed`]; the setup
//! request and every complete record come out through a callback, in
//! stream order, with sequence numbers assigned.

mod id;

pub use id::{ConnectionId, CONNECTION_ID_LEN};

use bytes::{Buf, BytesMut};

use crate::error::{CodecError, ConnectionError};
use crate::protocol::{
    BinaryView, ByteOrder, GenericReason, Record, ReplyEncoder, Request, RequestHeader,
    RequestParser, SetupRequest, ValueListDecoder, WireValueDecoder, HEADER_LEN,
};

/// Default cap on records split out of a single chunk
pub const DEFAULT_MAX_RECORDS_PER_CHUNK: usize = 65_536;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Waiting for the client's setup prolog
    AwaitingSetup,
    /// Setup decoded; bytes are requests from here on
    Established,
}

/// What a connection hands upward while consuming input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Setup(SetupRequest),
    Request(Record),
    /// A record's body did not match its opcode's layout. Always followed
    /// by a generic `Request` event for the same header.
    DecodeError {
        header: RequestHeader,
        error: CodecError,
    },
}

pub struct Connection<D = WireValueDecoder> {
    id: ConnectionId,
    state: ConnectionState,
    byte_order: Option<ByteOrder>,
    /// Sequence number the next record will get
    sequence: u32,
    buffer: BytesMut,
    parser: RequestParser<D>,
    max_records: usize,
}

impl Connection<WireValueDecoder> {
    pub fn new(id: ConnectionId) -> Self {
        Connection::with_parser(id, RequestParser::new(), DEFAULT_MAX_RECORDS_PER_CHUNK)
    }
}

impl<D: ValueListDecoder> Connection<D> {
    pub fn with_parser(id: ConnectionId, parser: RequestParser<D>, max_records: usize) -> Self {
        Connection {
            id,
            state: ConnectionState::AwaitingSetup,
            byte_order: None,
            sequence: 1,
            buffer: BytesMut::new(),
            parser,
            max_records,
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Client byte order, known once setup has been decoded
    pub fn byte_order(&self) -> Option<ByteOrder> {
        self.byte_order
    }

    /// Sequence number the next record will be assigned
    pub fn next_sequence(&self) -> u32 {
        self.sequence
    }

    /// Bytes held back waiting for the rest of a record
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Encoder for replies to this client, once its byte order is known
    pub fn reply_encoder(&self) -> Option<ReplyEncoder> {
        self.byte_order.map(ReplyEncoder::new)
    }

    /// Consume one inbound chunk.
    ///
    /// Every complete unit in the buffer is passed to `emit` before this
    /// returns. An error is fatal for the connection; the caller is
    /// expected to drop it.
    pub fn feed<F>(&mut self, chunk: &[u8], mut emit: F) -> Result<(), ConnectionError>
    where
        F: FnMut(ConnectionEvent),
    {
        self.buffer.extend_from_slice(chunk);

        if self.state == ConnectionState::AwaitingSetup {
            let decoded = SetupRequest::decode(&self.buffer).map_err(ConnectionError::SetupDecode)?;
            let Some((setup, used)) = decoded else {
                log::debug!("{}: waiting for setup, {} bytes buffered", self.id, self.buffer.len());
                return Ok(());
            };
            self.buffer.advance(used);
            self.byte_order = Some(setup.byte_order);
            self.sequence = 1;
            self.state = ConnectionState::Established;
            log::info!(
                "{}: setup complete, protocol {}.{}, byte order {:?}",
                self.id,
                setup.protocol_major_version,
                setup.protocol_minor_version,
                setup.byte_order
            );
            emit(ConnectionEvent::Setup(setup));
        }

        self.split_records(&mut emit)
    }

    fn split_records<F>(&mut self, emit: &mut F) -> Result<(), ConnectionError>
    where
        F: FnMut(ConnectionEvent),
    {
        let Some(byte_order) = self.byte_order else {
            return Ok(());
        };

        let mut iterations = 0;
        while self.buffer.len() >= HEADER_LEN {
            let view = BinaryView::new(&self.buffer[..], byte_order);
            let header = RequestHeader::parse(&view, self.sequence)?;
            let record_len = header.byte_len();

            if record_len == 0 {
                log::error!("{}: zero-length record with opcode {}", self.id, header.opcode);
                return Err(ConnectionError::FramingGuardTripped {
                    iterations,
                    declared_len: record_len,
                });
            }
            if record_len > self.buffer.len() {
                break;
            }

            iterations += 1;
            if iterations > self.max_records {
                log::error!("{}: more than {} records in one chunk", self.id, self.max_records);
                return Err(ConnectionError::FramingGuardTripped {
                    iterations,
                    declared_len: record_len,
                });
            }

            let record = self.buffer.split_to(record_len);
            let body = BinaryView::new(&record[HEADER_LEN..], byte_order);
            let request = match self.parser.parse(&header, &body) {
                Ok(request) => request,
                Err(CodecError::UnsupportedOpcode(opcode)) => {
                    let reason = match header.known_opcode() {
                        Some(known) => {
                            log::warn!("{}: no decoder for {} ({})", self.id, known, opcode);
                            GenericReason::Unsupported
                        }
                        None => {
                            log::warn!("{}: unknown opcode {}", self.id, opcode);
                            GenericReason::Unknown
                        }
                    };
                    Request::Generic { reason }
                }
                Err(error) => {
                    log::warn!(
                        "{}: failed to decode opcode {} (sequence {}): {}",
                        self.id,
                        header.opcode,
                        header.sequence,
                        error
                    );
                    emit(ConnectionEvent::DecodeError { header, error });
                    Request::Generic {
                        reason: GenericReason::Undecodable,
                    }
                }
            };

            self.sequence = self.sequence.wrapping_add(1);
            emit(ConnectionEvent::Request(Record { header, request }));
        }

        Ok(())
    }
}
