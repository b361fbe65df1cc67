//! Core X11 protocol types
//!
//! These types represent the fundamental data types used in the X11 protocol.
//! They are kept minimal and close to the wire protocol for efficiency.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// X11 resource ID - used for windows, pixmaps, graphics contexts, etc.
/// In X11, all objects are identified by 29-bit IDs.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XID(pub u32);

impl XID {
    pub const NONE: XID = XID(0);

    pub fn new(id: u32) -> Self {
        XID(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for XID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

macro_rules! resource_id {
    ($($(#[$meta:meta])* $name:ident;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name(pub XID);

            impl $name {
                pub const NONE: $name = $name(XID::NONE);

                pub fn new(id: u32) -> Self {
                    $name(XID::new(id))
                }

                pub fn id(&self) -> XID {
                    self.0
                }
            }
        )+
    };
}

resource_id! {
    /// Window ID
    Window;
    /// Pixmap ID
    Pixmap;
    /// Drawable - a Window or a Pixmap. The wire does not say which.
    Drawable;
    /// Graphics Context ID
    GContext;
    /// Colormap ID
    Colormap;
    /// Cursor ID
    Cursor;
    /// Font ID
    Font;
}

/// Atom - interned string identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atom(pub u32);

impl Atom {
    pub const NONE: Atom = Atom(0);
    pub const PRIMARY: Atom = Atom(1);
    pub const STRING: Atom = Atom(31);
    pub const WM_NAME: Atom = Atom(39);

    pub fn new(id: u32) -> Self {
        Atom(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

/// Visual ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualID(pub u32);

impl VisualID {
    pub fn new(id: u32) -> Self {
        VisualID(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

/// Timestamp (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub u32);

impl Timestamp {
    pub const CURRENT_TIME: Timestamp = Timestamp(0);

    pub fn new(ms: u32) -> Self {
        Timestamp(ms)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

/// Keycode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Keycode(pub u8);

/// Point (x, y coordinate)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i16,
    pub y: i16,
}

impl Point {
    pub fn new(x: i16, y: i16) -> Self {
        Point { x, y }
    }
}

/// Rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rectangle {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
}

impl Rectangle {
    pub fn new(x: i16, y: i16, width: u16, height: u16) -> Self {
        Rectangle {
            x,
            y,
            width,
            height,
        }
    }
}

/// Segment (for drawing line segments)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub x1: i16,
    pub y1: i16,
    pub x2: i16,
    pub y2: i16,
}

/// Arc (for drawing arcs and ellipses)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arc {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub angle1: i16, // Start angle in 1/64 degrees
    pub angle2: i16, // Arc extent in 1/64 degrees
}

/// 16-bit-per-channel color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

/// Window class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowClass {
    CopyFromParent = 0,
    InputOutput = 1,
    InputOnly = 2,
}

impl WindowClass {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(WindowClass::CopyFromParent),
            1 => Some(WindowClass::InputOutput),
            2 => Some(WindowClass::InputOnly),
            _ => None,
        }
    }
}

/// Map state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapState {
    Unmapped = 0,
    Unviewable = 1,
    Viewable = 2,
}

/// Coordinate mode for point lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateMode {
    /// Every point is relative to the drawable origin
    Origin = 0,
    /// Every point after the first is relative to the previous one
    Previous = 1,
}

impl CoordinateMode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CoordinateMode::Origin),
            1 => Some(CoordinateMode::Previous),
            _ => None,
        }
    }
}

/// ChangeProperty mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyMode {
    Replace = 0,
    Prepend = 1,
    Append = 2,
}

impl PropertyMode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(PropertyMode::Replace),
            1 => Some(PropertyMode::Prepend),
            2 => Some(PropertyMode::Append),
            _ => None,
        }
    }
}

/// Image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Bitmap = 0,
    XYPixmap = 1,
    ZPixmap = 2,
}

impl ImageFormat {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ImageFormat::Bitmap),
            1 => Some(ImageFormat::XYPixmap),
            2 => Some(ImageFormat::ZPixmap),
            _ => None,
        }
    }
}

/// SetCloseDownMode mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDownMode {
    Destroy = 0,
    RetainPermanent = 1,
    RetainTemporary = 2,
}

impl CloseDownMode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CloseDownMode::Destroy),
            1 => Some(CloseDownMode::RetainPermanent),
            2 => Some(CloseDownMode::RetainTemporary),
            _ => None,
        }
    }
}

/// Host address family, as used by ChangeHosts and ListHosts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostFamily {
    Internet = 0,
    DECnet = 1,
    Chaos = 2,
    ServerInterpreted = 5,
    InternetV6 = 6,
}

impl HostFamily {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(HostFamily::Internet),
            1 => Some(HostFamily::DECnet),
            2 => Some(HostFamily::Chaos),
            5 => Some(HostFamily::ServerInterpreted),
            6 => Some(HostFamily::InternetV6),
            _ => None,
        }
    }
}

/// A host entry in the access control list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAddress {
    pub family: HostFamily,
    pub address: Vec<u8>,
}

impl HostAddress {
    pub fn from_ip(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(v4) => HostAddress {
                family: HostFamily::Internet,
                address: v4.octets().to_vec(),
            },
            IpAddr::V6(v6) => HostAddress {
                family: HostFamily::InternetV6,
                address: v6.octets().to_vec(),
            },
        }
    }

    /// The address as an IP, for the Internet families
    pub fn ip(&self) -> Option<IpAddr> {
        match (self.family, self.address.len()) {
            (HostFamily::Internet, 4) => {
                let octets: [u8; 4] = self.address[..].try_into().ok()?;
                Some(IpAddr::V4(Ipv4Addr::from(octets)))
            }
            (HostFamily::InternetV6, 16) => {
                let octets: [u8; 16] = self.address[..].try_into().ok()?;
                Some(IpAddr::V6(Ipv6Addr::from(octets)))
            }
            _ => None,
        }
    }
}

/// Byte order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LSBFirst = 0,
    MSBFirst = 1,
}

impl ByteOrder {
    /// Byte order selected by the first byte of the setup prolog.
    /// 'B' (0x42) means MSB first; anything else is taken as LSB first.
    pub fn from_setup_byte(byte: u8) -> Self {
        if byte == b'B' {
            ByteOrder::MSBFirst
        } else {
            ByteOrder::LSBFirst
        }
    }

    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            ByteOrder::LSBFirst
        } else {
            ByteOrder::MSBFirst
        }
    }
}
