//! Variable-length reply tails
//!
//! Replies carry a fixed 32-byte block followed by a variable tail whose
//! length, in 4-byte units, is written into the header. `ExtrasList` builds
//! that tail as an ordered list of typed values. The order of `push` calls
//! is the wire order; nothing is sorted.

use super::types::HostAddress;
use super::view::BinaryView;
use super::{pad, padded_len};
use crate::error::CodecError;

/// A single value in a reply tail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extra {
    Card8(u8),
    Card16(u16),
    Int16(i16),
    Card32(u32),
    Bytes(Vec<u8>),
    /// Text without a length prefix
    Str(String),
    /// Text with a one-byte length prefix (STR in the protocol encoding)
    XStr(String),
    /// A HOST entry: family, unused byte, address length, padded address
    Host(HostAddress),
}

/// ISO 8859-1 bytes for `text`; characters outside the range become '?'
pub fn latin1_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

impl Extra {
    pub fn byte_len(&self) -> usize {
        match self {
            Extra::Card8(_) => 1,
            Extra::Card16(_) | Extra::Int16(_) => 2,
            Extra::Card32(_) => 4,
            Extra::Bytes(bytes) => bytes.len(),
            Extra::Str(text) => text.chars().count(),
            Extra::XStr(text) => 1 + text.chars().count().min(u8::MAX as usize),
            Extra::Host(host) => 4 + padded_len(host.address.len()),
        }
    }

    fn write_into<B>(&self, view: &mut BinaryView<B>, offset: usize) -> Result<usize, CodecError>
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        match self {
            Extra::Card8(value) => {
                view.write_u8(offset, *value)?;
                Ok(offset + 1)
            }
            Extra::Card16(value) => {
                view.write_u16(offset, *value)?;
                Ok(offset + 2)
            }
            Extra::Int16(value) => {
                view.write_i16(offset, *value)?;
                Ok(offset + 2)
            }
            Extra::Card32(value) => {
                view.write_u32(offset, *value)?;
                Ok(offset + 4)
            }
            Extra::Bytes(bytes) => view.write_bytes(offset, bytes),
            Extra::Str(text) => view.write_bytes(offset, &latin1_bytes(text)),
            Extra::XStr(text) => {
                let mut bytes = latin1_bytes(text);
                bytes.truncate(u8::MAX as usize);
                view.write_u8(offset, bytes.len() as u8)?;
                view.write_bytes(offset + 1, &bytes)
            }
            Extra::Host(host) => {
                view.write_u8(offset, host.family as u8)?;
                view.write_u8(offset + 1, 0)?;
                view.write_u16(offset + 2, host.address.len() as u16)?;
                let end = view.write_bytes(offset + 4, &host.address)?;
                for i in 0..pad(host.address.len()) {
                    view.write_u8(end + i, 0)?;
                }
                Ok(end + pad(host.address.len()))
            }
        }
    }
}

/// Ordered list of reply tail values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtrasList {
    items: Vec<Extra>,
}

impl ExtrasList {
    pub fn new() -> Self {
        ExtrasList::default()
    }

    pub fn push(&mut self, value: Extra) {
        self.items.push(value);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Extra> {
        self.items.iter()
    }

    /// Encoded size of every element, in bytes
    pub fn byte_len(&self) -> usize {
        self.items.iter().map(Extra::byte_len).sum()
    }

    /// Append zero bytes until the encoded size is a multiple of 4.
    /// Must run before the size is used for a header length field.
    pub fn pad(&mut self) {
        for _ in 0..pad(self.byte_len()) {
            self.items.push(Extra::Card8(0));
        }
    }

    /// Serialize every element at `offset`, returning the end offset
    pub fn write_into<B>(&self, view: &mut BinaryView<B>, offset: usize) -> Result<usize, CodecError>
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        self.items
            .iter()
            .try_fold(offset, |offset, item| item.write_into(view, offset))
    }
}

impl Extend<Extra> for ExtrasList {
    fn extend<I: IntoIterator<Item = Extra>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}
