//! End-to-end decoding of a client byte stream, however it is chunked.

use proptest::prelude::*;

use x11wire::connection::{Connection, ConnectionEvent, ConnectionId};
use x11wire::protocol::{
    Atom, ByteOrder, GenericReason, PropertyMode, Request, TextItem, Value, Window,
    WindowAttribute,
};
use x11wire::ConnectionError;

/// Little-endian record builder
struct Stream(Vec<u8>);

impl Stream {
    fn new() -> Self {
        Stream(Vec::new())
    }

    fn u8(mut self, v: u8) -> Self {
        self.0.push(v);
        self
    }

    fn u16(mut self, v: u16) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    fn u32(mut self, v: u32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    fn bytes(mut self, v: &[u8]) -> Self {
        self.0.extend_from_slice(v);
        self
    }

    fn pad(mut self) -> Self {
        while self.0.len() % 4 != 0 {
            self.0.push(0);
        }
        self
    }
}

fn client_stream() -> Vec<u8> {
    Stream::new()
        // Setup: LSB first, 11.0, MIT-MAGIC-COOKIE-1 with 16 bytes of data
        .bytes(&[b'l', 0])
        .u16(11)
        .u16(0)
        .u16(18)
        .u16(16)
        .u16(0)
        .bytes(b"MIT-MAGIC-COOKIE-1")
        .pad()
        .bytes(&[0xaa; 16])
        // CreateWindow, depth 24, background-pixel and event-mask set
        .bytes(&[1, 24])
        .u16(10)
        .u32(0x0020_0001)
        .u32(0x0000_0100)
        .u16(10)
        .u16(20)
        .u16(100)
        .u16(50)
        .u16(1)
        .u16(1)
        .u32(0)
        .u32((1 << 1) | (1 << 11))
        .u32(0x00ff_ffff)
        .u32(0x0002_8000)
        // InternAtom "WM_NAME"
        .bytes(&[16, 0])
        .u16(4)
        .u16(7)
        .u16(0)
        .bytes(b"WM_NAME")
        .pad()
        // ChangeProperty Replace WM_NAME STRING "hello"
        .bytes(&[18, 0])
        .u16(8)
        .u32(0x0020_0001)
        .u32(39)
        .u32(31)
        .u8(8)
        .bytes(&[0, 0, 0])
        .u32(5)
        .bytes(b"hello")
        .pad()
        // Unknown opcode
        .bytes(&[126, 9])
        .u16(2)
        .u32(0xdead_beef)
        // MapWindow too short to hold its window
        .bytes(&[8, 0])
        .u16(1)
        // MapWindow
        .bytes(&[8, 0])
        .u16(2)
        .u32(0x0020_0001)
        // PolyText8 with one item
        .bytes(&[74, 0])
        .u16(5)
        .u32(0x0020_0001)
        .u32(0x0020_0002)
        .u16(5)
        .u16(15)
        .bytes(&[2, 0, b'h', b'i'])
        // GetInputFocus
        .bytes(&[43, 0])
        .u16(1)
        .0
}

fn test_id() -> ConnectionId {
    ConnectionId::from_peer("192.0.2.7".parse().unwrap(), 6001)
}

fn feed_chunks(stream: &[u8], sizes: &[usize]) -> Result<Vec<ConnectionEvent>, ConnectionError> {
    let mut conn = Connection::new(test_id());
    let mut events = Vec::new();
    let mut rest = stream;
    let mut sizes = sizes.iter().cycle();
    while !rest.is_empty() {
        let size = sizes.next().copied().unwrap_or(rest.len()).min(rest.len());
        let (chunk, tail) = rest.split_at(size);
        conn.feed(chunk, |event| events.push(event))?;
        rest = tail;
    }
    Ok(events)
}

fn requests(events: &[ConnectionEvent]) -> Vec<(u32, &Request)> {
    events
        .iter()
        .filter_map(|event| match event {
            ConnectionEvent::Request(record) => Some((record.sequence(), &record.request)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_whole_stream() {
    let events = feed_chunks(&client_stream(), &[usize::MAX]).unwrap();

    let ConnectionEvent::Setup(setup) = &events[0] else {
        panic!("first event should be the setup request");
    };
    assert_eq!(setup.byte_order, ByteOrder::LSBFirst);
    assert_eq!(setup.protocol_major_version, 11);
    assert_eq!(setup.authorization_protocol_name, "MIT-MAGIC-COOKIE-1");
    assert_eq!(setup.authorization_protocol_data, vec![0xaa; 16]);

    let requests = requests(&events);
    let sequences: Vec<u32> = requests.iter().map(|(seq, _)| *seq).collect();
    assert_eq!(sequences, (1..=8).collect::<Vec<u32>>());

    match requests[0].1 {
        Request::CreateWindow(req) => {
            assert_eq!(req.depth, 24);
            assert_eq!(req.wid, Window::new(0x0020_0001));
            assert_eq!((req.x, req.y, req.width, req.height), (10, 20, 100, 50));
            assert_eq!(
                req.values.get(WindowAttribute::BackgroundPixel),
                Some(Value::Card32(0x00ff_ffff))
            );
            assert_eq!(
                req.values.get(WindowAttribute::EventMask),
                Some(Value::Card32(0x0002_8000))
            );
        }
        other => panic!("expected CreateWindow, got {:?}", other),
    }
    match requests[1].1 {
        Request::InternAtom(req) => {
            assert_eq!(req.name, "WM_NAME");
            assert!(!req.only_if_exists);
        }
        other => panic!("expected InternAtom, got {:?}", other),
    }
    match requests[2].1 {
        Request::ChangeProperty(req) => {
            assert_eq!(req.mode, PropertyMode::Replace);
            assert_eq!(req.property, Atom::WM_NAME);
            assert_eq!(req.type_, Atom::STRING);
            assert_eq!(req.data, b"hello".to_vec());
        }
        other => panic!("expected ChangeProperty, got {:?}", other),
    }
    assert_eq!(
        requests[3].1,
        &Request::Generic {
            reason: GenericReason::Unknown
        }
    );
    assert_eq!(
        requests[4].1,
        &Request::Generic {
            reason: GenericReason::Undecodable
        }
    );
    assert!(matches!(requests[5].1, Request::MapWindow(_)));
    match requests[6].1 {
        Request::PolyText8(req) => {
            assert_eq!(
                req.items,
                vec![TextItem::Text {
                    delta: 0,
                    text: "hi".to_string()
                }]
            );
        }
        other => panic!("expected PolyText8, got {:?}", other),
    }
    assert_eq!(requests[7].1, &Request::GetInputFocus);
}

#[test]
fn test_unknown_opcode_header_is_kept() {
    let events = feed_chunks(&client_stream(), &[usize::MAX]).unwrap();
    let record = events
        .iter()
        .find_map(|event| match event {
            ConnectionEvent::Request(record) if record.header.opcode == 126 => Some(record),
            _ => None,
        })
        .unwrap();
    assert_eq!(record.header.data_byte, 9);
    assert_eq!(record.header.length_quads, 2);
    assert_eq!(record.sequence(), 4);
}

#[test]
fn test_byte_at_a_time() {
    let stream = client_stream();
    let whole = feed_chunks(&stream, &[usize::MAX]).unwrap();
    let bytewise = feed_chunks(&stream, &[1]).unwrap();
    assert_eq!(whole, bytewise);
}

#[test]
fn test_repeated_zero_length_records() {
    let mut stream = vec![b'l', 0, 11, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    stream.extend_from_slice(&[127, 0, 1, 0]);
    stream.extend(std::iter::repeat([127u8, 0, 0, 0]).take(1000).flatten());

    let result = feed_chunks(&stream, &[usize::MAX]);
    assert!(matches!(
        result,
        Err(ConnectionError::FramingGuardTripped {
            declared_len: 0,
            ..
        })
    ));
}

proptest! {
    #[test]
    fn chunking_does_not_change_records(sizes in prop::collection::vec(1usize..48, 1..24)) {
        let stream = client_stream();
        let whole = feed_chunks(&stream, &[usize::MAX]).unwrap();
        let chunked = feed_chunks(&stream, &sizes).unwrap();
        prop_assert_eq!(whole, chunked);
    }

    #[test]
    fn sequences_have_no_gaps(opcodes in prop::collection::vec(prop_oneof![Just(43u8), Just(126u8), Just(127u8), Just(13u8)], 0..64)) {
        let mut stream = vec![b'B', 0, 0, 11, 0, 0, 0, 0, 0, 0, 0, 0];
        for opcode in &opcodes {
            stream.extend_from_slice(&[*opcode, 0, 0, 1]);
        }
        let events = feed_chunks(&stream, &[7]).unwrap();
        let sequences: Vec<u32> = requests(&events).iter().map(|(seq, _)| *seq).collect();
        prop_assert_eq!(sequences, (1..=opcodes.len() as u32).collect::<Vec<u32>>());
    }
}
