//! X11 protocol error codes and error packets
//!
//! These are errors sent to the client, not errors of this crate; see
//! `crate::error` for those.

use std::fmt;

use super::requests::RequestHeader;
use super::types::ByteOrder;
use super::view::BinaryView;
use crate::error::CodecError;

/// Size of an error packet
pub const ERROR_PACKET_LEN: usize = 32;

macro_rules! error_codes {
    ($($name:ident = $value:literal => $text:literal,)+) => {
        /// X11 error codes as defined in the protocol
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(u8)]
        pub enum ErrorCode {
            $($name = $value,)+
        }

        impl ErrorCode {
            pub fn from_u8(code: u8) -> Option<Self> {
                match code {
                    $($value => Some(ErrorCode::$name),)+
                    _ => None,
                }
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(ErrorCode::$name => $text,)+
                }
            }
        }
    };
}

error_codes! {
    Request = 1 => "Request: bad request code",
    Value = 2 => "Value: integer parameter out of range",
    Window = 3 => "Window: invalid Window parameter",
    Pixmap = 4 => "Pixmap: invalid Pixmap parameter",
    Atom = 5 => "Atom: invalid Atom parameter",
    Cursor = 6 => "Cursor: invalid Cursor parameter",
    Font = 7 => "Font: invalid Font parameter",
    Match = 8 => "Match: parameter mismatch",
    Drawable = 9 => "Drawable: invalid Drawable parameter",
    Access = 10 => "Access: attempt to access private resource",
    Alloc = 11 => "Alloc: insufficient resources",
    Colormap = 12 => "Colormap: invalid Colormap parameter",
    GContext = 13 => "GContext: invalid GC parameter",
    IDChoice = 14 => "IDChoice: invalid resource ID for this connection",
    Name = 15 => "Name: font or color name doesn't exist",
    Length = 16 => "Length: request length incorrect",
    Implementation = 17 => "Implementation: server implementation error",
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// X11 error packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct X11Error {
    pub code: ErrorCode,
    /// Full sequence number; only the low 16 bits go on the wire
    pub sequence: u32,
    pub bad_value: u32,
    pub minor_opcode: u16,
    pub major_opcode: u8,
}

impl X11Error {
    pub fn new(code: ErrorCode, sequence: u32, bad_value: u32, major_opcode: u8) -> Self {
        X11Error {
            code,
            sequence,
            bad_value,
            minor_opcode: 0,
            major_opcode,
        }
    }

    /// An error answering the request described by `header`
    pub fn for_request(code: ErrorCode, header: &RequestHeader, bad_value: u32) -> Self {
        X11Error::new(code, header.sequence, bad_value, header.opcode)
    }

    /// The error a client should see for a record that failed to decode
    pub fn from_decode_failure(header: &RequestHeader, error: &CodecError) -> Self {
        match error {
            CodecError::OutOfBounds { .. } => X11Error::for_request(ErrorCode::Length, header, 0),
            CodecError::InvalidValue { value, .. } => {
                X11Error::for_request(ErrorCode::Value, header, *value)
            }
            CodecError::UnsupportedOpcode(_) => {
                X11Error::for_request(ErrorCode::Implementation, header, 0)
            }
        }
    }

    /// Encode to the 32-byte wire form
    pub fn encode(&self, byte_order: ByteOrder) -> Result<Vec<u8>, CodecError> {
        let mut view = BinaryView::alloc(ERROR_PACKET_LEN, byte_order);
        view.write_u8(0, 0)?;
        view.write_u8(1, self.code as u8)?;
        view.write_u16(2, self.sequence as u16)?;
        view.write_u32(4, self.bad_value)?;
        view.write_u16(8, self.minor_opcode)?;
        view.write_u8(10, self.major_opcode)?;
        Ok(view.into_inner())
    }
}

impl fmt::Display for X11Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X11 Error: {} (sequence: {}, value: 0x{:08x}, major: {}, minor: {})",
            self.code, self.sequence, self.bad_value, self.major_opcode, self.minor_opcode
        )
    }
}

impl std::error::Error for X11Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let error = X11Error::new(ErrorCode::Window, 0x0002_0005, 0x0040_0001, 8);
        let bytes = error.encode(ByteOrder::LSBFirst).unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[..11], &[0, 3, 5, 0, 1, 0, 0x40, 0, 0, 0, 8]);
        assert!(bytes[11..].iter().all(|&b| b == 0));

        let bytes = error.encode(ByteOrder::MSBFirst).unwrap();
        assert_eq!(&bytes[2..8], &[0, 5, 0, 0x40, 0, 1]);
    }

    #[test]
    fn test_from_decode_failure() {
        let header = RequestHeader {
            opcode: 1,
            data_byte: 0,
            length_quads: 8,
            sequence: 12,
        };
        let value = X11Error::from_decode_failure(
            &header,
            &CodecError::InvalidValue {
                field: "window-class",
                value: 9,
            },
        );
        assert_eq!(value.code, ErrorCode::Value);
        assert_eq!(value.bad_value, 9);
        assert_eq!(value.sequence, 12);
        assert_eq!(value.major_opcode, 1);

        let length = X11Error::from_decode_failure(
            &header,
            &CodecError::OutOfBounds {
                offset: 28,
                width: 4,
                len: 28,
            },
        );
        assert_eq!(length.code, ErrorCode::Length);
    }

    #[test]
    fn test_code_lookup() {
        assert_eq!(ErrorCode::from_u8(16), Some(ErrorCode::Length));
        assert_eq!(ErrorCode::from_u8(0), None);
        assert!(ErrorCode::Match.to_string().starts_with("Match"));
    }
}
