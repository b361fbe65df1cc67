//! Connection engine
//!
//! The engine sits between the transport, which multiplexes every client
//! over one channel, and the host, which performs requests and produces
//! results. It owns the connection registry, answers the control channel,
//! routes data frames to their connection and frames outbound payloads.
//!
//! Everything runs to completion on the caller's thread: one control
//! message or data frame is fully processed, host callbacks included,
//! before the entry point returns. A host that wants to answer a request
//! records what it needs in `on_request` and calls the `submit_*` methods
//! once control is back with its owner.

use std::collections::HashMap;
use std::io;
use std::net::IpAddr;

use crate::connection::{
    Connection, ConnectionEvent, ConnectionId, ConnectionState, CONNECTION_ID_LEN,
    DEFAULT_MAX_RECORDS_PER_CHUNK,
};
use crate::error::{CodecError, EngineError};
use crate::protocol::{
    ByteOrder, HostFamily, Record, Reply, ReplyEncoder, RequestHeader, RequestParser,
    SetupRequest, SetupResponse, ValueListDecoder, WireValueDecoder, X11Error,
};

/// Upward interface: what the engine tells its host
pub trait Host {
    /// A connection was opened by the transport
    fn on_new_connection(
        &mut self,
        _id: &ConnectionId,
        _address: IpAddr,
        _port: u16,
        _family: HostFamily,
    ) {
    }

    /// The transport asks for the screen description
    fn on_screen_query(&mut self, _id: &ConnectionId) {}

    /// The client's setup prolog arrived; answer with `Engine::submit_setup`
    fn on_setup(&mut self, id: &ConnectionId, setup: &SetupRequest);

    fn on_request(&mut self, id: &ConnectionId, record: Record);

    /// A record failed to decode. A generic record for the same header
    /// follows through `on_request`.
    fn on_decode_error(&mut self, _id: &ConnectionId, _header: &RequestHeader, _error: &CodecError) {
    }

    fn on_connection_closed(&mut self, _id: &ConnectionId) {}
}

/// Downward interface: the multiplexed channel to the clients
pub trait Transport {
    /// Send one `[id len][id][payload]` frame
    fn send_frame(&mut self, frame: &[u8]) -> io::Result<()>;

    /// Send a control-channel message
    fn send_text(&mut self, text: &str) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Records split out of one data frame before the connection is
    /// considered stuck and closed
    pub max_records_per_chunk: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_records_per_chunk: DEFAULT_MAX_RECORDS_PER_CHUNK,
        }
    }
}

pub struct Engine<H, T, D = WireValueDecoder> {
    host: H,
    transport: T,
    config: EngineConfig,
    value_decoder: D,
    connections: HashMap<ConnectionId, Connection<D>>,
}

impl<H: Host, T: Transport> Engine<H, T, WireValueDecoder> {
    pub fn new(host: H, transport: T, config: EngineConfig) -> Self {
        Engine::with_value_decoder(host, transport, config, WireValueDecoder)
    }
}

impl<H: Host, T: Transport, D: ValueListDecoder + Clone> Engine<H, T, D> {
    /// Use `value_decoder` for the bitmask-selected attribute blocks of
    /// every connection
    pub fn with_value_decoder(host: H, transport: T, config: EngineConfig, value_decoder: D) -> Self {
        Engine {
            host,
            transport,
            config,
            value_decoder,
            connections: HashMap::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection<D>> {
        self.connections.get(id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Handle one control-channel message
    pub fn handle_control(&mut self, message: &str) -> Result<(), EngineError> {
        let mut words = message.split_whitespace();
        match (words.next(), words.next()) {
            (Some("SCR"), Some(id)) => {
                let id = parse_id(id)?;
                log::debug!("{}: screen query", id);
                self.host.on_screen_query(&id);
            }
            (Some("NEW"), Some(id)) => {
                let id = parse_id(id)?;
                self.open(id);
            }
            (Some("END"), Some(id)) => {
                let id = parse_id(id)?;
                self.close(&id);
            }
            (Some("PING"), None) => self.transport.send_text("PONG")?,
            (Some("PONG"), None) => log::trace!("PONG received"),
            _ => {
                log::warn!("Unknown control message: {:?}", message);
                return Err(EngineError::BadControlMessage(message.to_string()));
            }
        }
        Ok(())
    }

    /// Handle one data frame: a connection id followed by client bytes
    pub fn handle_data(&mut self, frame: &[u8]) -> Result<(), EngineError> {
        let id = ConnectionId::from_slice(frame).ok_or(EngineError::ShortFrame(frame.len()))?;
        let Some(connection) = self.connections.get_mut(&id) else {
            log::warn!("Dropping {} bytes for unknown connection {}", frame.len(), id);
            return Err(EngineError::UnknownConnection(id.to_hex()));
        };

        let host = &mut self.host;
        let result = connection.feed(&frame[CONNECTION_ID_LEN..], |event| match event {
            ConnectionEvent::Setup(setup) => host.on_setup(&id, &setup),
            ConnectionEvent::Request(record) => host.on_request(&id, record),
            ConnectionEvent::DecodeError { header, error } => {
                host.on_decode_error(&id, &header, &error)
            }
        });

        if let Err(source) = result {
            log::error!("{}: closing connection: {}", id, source);
            self.close(&id);
            return Err(EngineError::Connection {
                id: id.to_hex(),
                source,
            });
        }
        Ok(())
    }

    /// Encode and send a reply to the request with `sequence`
    pub fn submit_reply(
        &mut self,
        id: &ConnectionId,
        sequence: u32,
        reply: &Reply,
    ) -> Result<(), EngineError> {
        let byte_order = self.established(id)?;
        let payload = ReplyEncoder::new(byte_order).encode(sequence, reply)?;
        log::debug!("{}: reply {} for sequence {}", id, reply.opcode(), sequence);
        self.send(id, &payload)
    }

    /// Send bytes that were encoded elsewhere, such as events
    pub fn submit_raw(&mut self, id: &ConnectionId, payload: &[u8]) -> Result<(), EngineError> {
        if !self.connections.contains_key(id) {
            return Err(EngineError::UnknownConnection(id.to_hex()));
        }
        self.send(id, payload)
    }

    /// Answer the client's setup request
    pub fn submit_setup(
        &mut self,
        id: &ConnectionId,
        response: &SetupResponse,
    ) -> Result<(), EngineError> {
        let byte_order = self.established(id)?;
        let payload = response.encode(byte_order)?;
        self.send(id, &payload)
    }

    pub fn submit_error(&mut self, id: &ConnectionId, error: &X11Error) -> Result<(), EngineError> {
        let byte_order = self.established(id)?;
        log::debug!("{}: sending {}", id, error);
        let payload = error.encode(byte_order)?;
        self.send(id, &payload)
    }

    fn open(&mut self, id: ConnectionId) {
        let parser = RequestParser::with_value_decoder(self.value_decoder.clone());
        let connection = Connection::with_parser(id, parser, self.config.max_records_per_chunk);
        if self.connections.insert(id, connection).is_some() {
            log::warn!("{}: NEW for a live connection, state reset", id);
        }
        log::info!("{}: connection opened", id);
        self.host
            .on_new_connection(&id, id.address(), id.port(), id.family());
    }

    /// Drop a connection and its buffered bytes. Closing twice is harmless.
    fn close(&mut self, id: &ConnectionId) {
        match self.connections.remove(id) {
            Some(connection) => {
                log::info!(
                    "{}: connection closed, {} bytes discarded",
                    id,
                    connection.buffered()
                );
                self.host.on_connection_closed(id);
            }
            None => log::debug!("{}: already closed", id),
        }
    }

    fn established(&self, id: &ConnectionId) -> Result<ByteOrder, EngineError> {
        let connection = self
            .connections
            .get(id)
            .ok_or_else(|| EngineError::UnknownConnection(id.to_hex()))?;
        match (connection.state(), connection.byte_order()) {
            (ConnectionState::Established, Some(byte_order)) => Ok(byte_order),
            _ => Err(EngineError::NotEstablished(id.to_hex())),
        }
    }

    fn send(&mut self, id: &ConnectionId, payload: &[u8]) -> Result<(), EngineError> {
        self.transport.send_frame(&frame(id, payload))?;
        Ok(())
    }
}

fn parse_id(text: &str) -> Result<ConnectionId, EngineError> {
    ConnectionId::from_hex(text).ok_or_else(|| EngineError::InvalidConnectionId(text.to_string()))
}

/// Build an outbound frame: `[id len][hex id][payload]`
pub fn frame(id: &ConnectionId, payload: &[u8]) -> Vec<u8> {
    let hex = id.to_hex();
    let mut out = Vec::with_capacity(1 + hex.len() + payload.len());
    out.push(hex.len() as u8);
    out.extend_from_slice(hex.as_bytes());
    out.extend_from_slice(payload);
    out
}

/// Split an outbound frame back into its connection id and payload
pub fn split_frame(frame: &[u8]) -> Option<(ConnectionId, &[u8])> {
    let (&id_len, rest) = frame.split_first()?;
    let id_len = id_len as usize;
    let text = std::str::from_utf8(rest.get(..id_len)?).ok()?;
    Some((ConnectionId::from_hex(text)?, &rest[id_len..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectionError;
    use crate::protocol::{Atom, ErrorCode, InternAtomReply, SetupFailed, REPLY_BLOCK_LEN};

    #[derive(Debug, PartialEq)]
    enum HostEvent {
        New(IpAddr, u16, HostFamily),
        Screen,
        Setup(u16),
        Request(u8, u32),
        DecodeError(u32),
        Closed,
    }

    #[derive(Default)]
    struct RecordingHost {
        events: Vec<(ConnectionId, HostEvent)>,
    }

    impl Host for RecordingHost {
        fn on_new_connection(
            &mut self,
            id: &ConnectionId,
            address: IpAddr,
            port: u16,
            family: HostFamily,
        ) {
            self.events.push((*id, HostEvent::New(address, port, family)));
        }

        fn on_screen_query(&mut self, id: &ConnectionId) {
            self.events.push((*id, HostEvent::Screen));
        }

        fn on_setup(&mut self, id: &ConnectionId, setup: &SetupRequest) {
            self.events
                .push((*id, HostEvent::Setup(setup.protocol_major_version)));
        }

        fn on_request(&mut self, id: &ConnectionId, record: Record) {
            self.events.push((
                *id,
                HostEvent::Request(record.header.opcode, record.sequence()),
            ));
        }

        fn on_decode_error(&mut self, id: &ConnectionId, header: &RequestHeader, _error: &CodecError) {
            self.events.push((*id, HostEvent::DecodeError(header.sequence)));
        }

        fn on_connection_closed(&mut self, id: &ConnectionId) {
            self.events.push((*id, HostEvent::Closed));
        }
    }

    #[derive(Default)]
    struct RecordingTransport {
        frames: Vec<Vec<u8>>,
        texts: Vec<String>,
    }

    impl Transport for RecordingTransport {
        fn send_frame(&mut self, frame: &[u8]) -> io::Result<()> {
            self.frames.push(frame.to_vec());
            Ok(())
        }

        fn send_text(&mut self, text: &str) -> io::Result<()> {
            self.texts.push(text.to_string());
            Ok(())
        }
    }

    type TestEngine = Engine<RecordingHost, RecordingTransport>;

    fn engine() -> TestEngine {
        Engine::new(
            RecordingHost::default(),
            RecordingTransport::default(),
            EngineConfig::default(),
        )
    }

    fn client() -> ConnectionId {
        ConnectionId::from_peer("10.1.2.3".parse().unwrap(), 40000)
    }

    fn data(id: &ConnectionId, bytes: &[u8]) -> Vec<u8> {
        let mut frame = id.as_bytes().to_vec();
        frame.extend_from_slice(bytes);
        frame
    }

    fn established(engine: &mut TestEngine, id: &ConnectionId) {
        engine.handle_control(&format!("NEW {}", id.to_hex())).unwrap();
        engine
            .handle_data(&data(id, &[b'l', 0, 11, 0, 0, 0, 0, 0, 0, 0, 0, 0]))
            .unwrap();
    }

    #[test]
    fn test_new_connection_and_requests() {
        let mut engine = engine();
        let id = client();
        established(&mut engine, &id);
        engine
            .handle_data(&data(&id, &[43, 0, 1, 0, 126, 0, 1, 0]))
            .unwrap();

        let events: Vec<&HostEvent> = engine.host().events.iter().map(|(_, e)| e).collect();
        assert_eq!(
            events,
            vec![
                &HostEvent::New("10.1.2.3".parse().unwrap(), 40000, HostFamily::Internet),
                &HostEvent::Setup(11),
                &HostEvent::Request(43, 1),
                &HostEvent::Request(126, 2),
            ]
        );
        assert_eq!(engine.connection_count(), 1);
    }

    #[test]
    fn test_decode_error_reaches_host() {
        let mut engine = engine();
        let id = client();
        established(&mut engine, &id);
        engine.handle_data(&data(&id, &[8, 0, 1, 0])).unwrap();

        let tail: Vec<&HostEvent> = engine.host().events[2..].iter().map(|(_, e)| e).collect();
        assert_eq!(tail, vec![&HostEvent::DecodeError(1), &HostEvent::Request(8, 1)]);
    }

    #[test]
    fn test_submit_reply_is_framed() {
        let mut engine = engine();
        let id = client();
        established(&mut engine, &id);

        let reply = Reply::InternAtom(InternAtomReply {
            atom: Atom::new(0x45),
        });
        engine.submit_reply(&id, 7, &reply).unwrap();

        let sent = &engine.transport().frames[0];
        let (to, payload) = split_frame(sent).unwrap();
        assert_eq!(to, id);
        assert_eq!(sent[0], 38);
        assert_eq!(payload.len(), REPLY_BLOCK_LEN);
        assert_eq!(payload[0], 1);
        assert_eq!(&payload[2..4], &[7, 0]);
        assert_eq!(&payload[8..12], &[0x45, 0, 0, 0]);
    }

    #[test]
    fn test_submit_before_setup() {
        let mut engine = engine();
        let id = client();
        engine.handle_control(&format!("NEW {}", id.to_hex())).unwrap();

        let error = X11Error::new(ErrorCode::Window, 1, 0, 8);
        assert!(matches!(
            engine.submit_error(&id, &error),
            Err(EngineError::NotEstablished(_))
        ));
        engine.submit_raw(&id, &[1, 2, 3, 4]).unwrap();
        assert_eq!(split_frame(&engine.transport().frames[0]).unwrap().1, &[1, 2, 3, 4]);
    }

    #[test]
    fn test_submit_setup_and_error() {
        let mut engine = engine();
        let id = client();
        established(&mut engine, &id);

        let failed = SetupResponse::Failed(SetupFailed {
            protocol_major_version: 11,
            protocol_minor_version: 0,
            reason: "no".to_string(),
        });
        engine.submit_setup(&id, &failed).unwrap();
        let error = X11Error::new(ErrorCode::Window, 3, 0x1234, 8);
        engine.submit_error(&id, &error).unwrap();

        let frames = &engine.transport().frames;
        assert_eq!(split_frame(&frames[0]).unwrap().1[0], 0);
        let packet = split_frame(&frames[1]).unwrap().1;
        assert_eq!(packet.len(), 32);
        assert_eq!(&packet[..4], &[0, 3, 3, 0]);
    }

    #[test]
    fn test_end_is_idempotent() {
        let mut engine = engine();
        let id = client();
        established(&mut engine, &id);

        engine.handle_control(&format!("END {}", id.to_hex())).unwrap();
        engine.handle_control(&format!("END {}", id.to_hex())).unwrap();
        assert_eq!(engine.connection_count(), 0);

        let closed = engine
            .host()
            .events
            .iter()
            .filter(|(_, e)| *e == HostEvent::Closed)
            .count();
        assert_eq!(closed, 1);
        assert!(matches!(
            engine.handle_data(&data(&id, &[127, 0, 1, 0])),
            Err(EngineError::UnknownConnection(_))
        ));
    }

    #[test]
    fn test_ping_and_screen_query() {
        let mut engine = engine();
        let id = client();
        engine.handle_control("PING").unwrap();
        engine.handle_control("PONG").unwrap();
        engine.handle_control(&format!("SCR {}", id.to_hex())).unwrap();

        assert_eq!(engine.transport().texts, vec!["PONG".to_string()]);
        assert_eq!(engine.host().events, vec![(id, HostEvent::Screen)]);
    }

    #[test]
    fn test_bad_control_messages() {
        let mut engine = engine();
        assert!(matches!(
            engine.handle_control("HELLO"),
            Err(EngineError::BadControlMessage(_))
        ));
        assert!(matches!(
            engine.handle_control("NEW"),
            Err(EngineError::BadControlMessage(_))
        ));
        assert!(matches!(
            engine.handle_control("NEW 1234"),
            Err(EngineError::InvalidConnectionId(_))
        ));
    }

    #[test]
    fn test_short_frame() {
        let mut engine = engine();
        assert!(matches!(
            engine.handle_data(&[0u8; 10]),
            Err(EngineError::ShortFrame(10))
        ));
    }

    #[test]
    fn test_framing_guard_closes_only_that_connection() {
        let mut engine = engine();
        let bad = client();
        let good = ConnectionId::from_peer("10.1.2.4".parse().unwrap(), 40001);
        established(&mut engine, &bad);
        established(&mut engine, &good);

        let result = engine.handle_data(&data(&bad, &[127, 0, 0, 0]));
        match result {
            Err(EngineError::Connection { id, source }) => {
                assert_eq!(id, bad.to_hex());
                assert!(matches!(source, ConnectionError::FramingGuardTripped { .. }));
            }
            other => panic!("expected a closed connection, got {:?}", other),
        }
        assert!(engine.connection(&bad).is_none());
        assert!(engine.host().events.contains(&(bad, HostEvent::Closed)));

        engine.handle_data(&data(&good, &[127, 0, 1, 0])).unwrap();
        assert_eq!(
            engine.host().events.last(),
            Some(&(good, HostEvent::Request(127, 1)))
        );
        assert_eq!(
            engine.connection(&good).map(|c| c.next_sequence()),
            Some(2)
        );
    }
}
