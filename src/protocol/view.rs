//! Endian-aware binary view
//!
//! `BinaryView` wraps a byte region together with the byte order of the
//! connection it belongs to. Every multi-byte read and write goes through
//! the view, so decoders never have to care which order the client picked.

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};

use super::types::ByteOrder;
use crate::error::CodecError;

/// A byte region read and written in a fixed byte order
#[derive(Debug, Clone)]
pub struct BinaryView<B> {
    bytes: B,
    byte_order: ByteOrder,
}

impl BinaryView<Vec<u8>> {
    /// Allocate a zero-filled view of `len` bytes
    pub fn alloc(len: usize, byte_order: ByteOrder) -> Self {
        BinaryView {
            bytes: vec![0u8; len],
            byte_order,
        }
    }
}

impl<B: AsRef<[u8]>> BinaryView<B> {
    pub fn new(bytes: B, byte_order: ByteOrder) -> Self {
        BinaryView { bytes, byte_order }
    }

    pub fn len(&self) -> usize {
        self.bytes.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_ref()
    }

    pub fn into_inner(self) -> B {
        self.bytes
    }

    fn range(&self, offset: usize, width: usize) -> Result<&[u8], CodecError> {
        let len = self.len();
        match offset.checked_add(width) {
            Some(end) if end <= len => Ok(&self.bytes.as_ref()[offset..end]),
            _ => Err(CodecError::OutOfBounds { offset, width, len }),
        }
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, CodecError> {
        Ok(self.range(offset, 1)?[0])
    }

    pub fn read_i8(&self, offset: usize) -> Result<i8, CodecError> {
        Ok(self.read_u8(offset)? as i8)
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16, CodecError> {
        let bytes = self.range(offset, 2)?;
        Ok(match self.byte_order {
            ByteOrder::MSBFirst => BigEndian::read_u16(bytes),
            ByteOrder::LSBFirst => LittleEndian::read_u16(bytes),
        })
    }

    pub fn read_i16(&self, offset: usize) -> Result<i16, CodecError> {
        Ok(self.read_u16(offset)? as i16)
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32, CodecError> {
        let bytes = self.range(offset, 4)?;
        Ok(match self.byte_order {
            ByteOrder::MSBFirst => BigEndian::read_u32(bytes),
            ByteOrder::LSBFirst => LittleEndian::read_u32(bytes),
        })
    }

    pub fn read_i32(&self, offset: usize) -> Result<i32, CodecError> {
        Ok(self.read_u32(offset)? as i32)
    }

    /// Raw bytes in `[start, end)`
    pub fn read_bytes(&self, start: usize, end: usize) -> Result<&[u8], CodecError> {
        self.range(start, end.saturating_sub(start))
    }

    /// Decode `[start, end)` as single-byte (ISO 8859-1) text
    pub fn read_string(&self, start: usize, end: usize) -> Result<String, CodecError> {
        Ok(self
            .read_bytes(start, end)?
            .iter()
            .map(|&b| b as char)
            .collect())
    }

    /// Borrowed view over the whole region, in the current byte order
    pub fn as_view(&self) -> BinaryView<&[u8]> {
        BinaryView::new(self.as_bytes(), self.byte_order)
    }

    /// Copy the whole region into `dst` at `offset`, returning the end offset
    pub fn copy_into<D>(&self, dst: &mut BinaryView<D>, offset: usize) -> Result<usize, CodecError>
    where
        D: AsRef<[u8]> + AsMut<[u8]>,
    {
        dst.write_bytes(offset, self.as_bytes())
    }
}

impl<'a> BinaryView<&'a [u8]> {
    /// Sub-view over `[start, end)`. The sub-view borrows the bytes, not
    /// this view, and takes this view's byte order as it is now; later
    /// changes to either view are not shared.
    pub fn slice(&self, start: usize, end: usize) -> Result<BinaryView<&'a [u8]>, CodecError> {
        let bytes: &'a [u8] = self.bytes;
        let width = end.saturating_sub(start);
        let region = start
            .checked_add(width)
            .and_then(|end| bytes.get(start..end))
            .ok_or(CodecError::OutOfBounds {
                offset: start,
                width,
                len: bytes.len(),
            })?;
        Ok(BinaryView::new(region, self.byte_order))
    }

    /// Sub-view from `start` to the end of the region
    pub fn tail(&self, start: usize) -> Result<BinaryView<&'a [u8]>, CodecError> {
        self.slice(start, self.bytes.len())
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> BinaryView<B> {
    fn range_mut(&mut self, offset: usize, width: usize) -> Result<&mut [u8], CodecError> {
        let len = self.len();
        match offset.checked_add(width) {
            Some(end) if end <= len => Ok(&mut self.bytes.as_mut()[offset..end]),
            _ => Err(CodecError::OutOfBounds { offset, width, len }),
        }
    }

    pub fn write_u8(&mut self, offset: usize, value: u8) -> Result<(), CodecError> {
        self.range_mut(offset, 1)?[0] = value;
        Ok(())
    }

    pub fn write_i8(&mut self, offset: usize, value: i8) -> Result<(), CodecError> {
        self.write_u8(offset, value as u8)
    }

    pub fn write_bool(&mut self, offset: usize, value: bool) -> Result<(), CodecError> {
        self.write_u8(offset, u8::from(value))
    }

    pub fn write_u16(&mut self, offset: usize, value: u16) -> Result<(), CodecError> {
        let byte_order = self.byte_order;
        let bytes = self.range_mut(offset, 2)?;
        match byte_order {
            ByteOrder::MSBFirst => BigEndian::write_u16(bytes, value),
            ByteOrder::LSBFirst => LittleEndian::write_u16(bytes, value),
        }
        Ok(())
    }

    pub fn write_i16(&mut self, offset: usize, value: i16) -> Result<(), CodecError> {
        self.write_u16(offset, value as u16)
    }

    pub fn write_u32(&mut self, offset: usize, value: u32) -> Result<(), CodecError> {
        let byte_order = self.byte_order;
        let bytes = self.range_mut(offset, 4)?;
        match byte_order {
            ByteOrder::MSBFirst => BigEndian::write_u32(bytes, value),
            ByteOrder::LSBFirst => LittleEndian::write_u32(bytes, value),
        }
        Ok(())
    }

    pub fn write_i32(&mut self, offset: usize, value: i32) -> Result<(), CodecError> {
        self.write_u32(offset, value as u32)
    }

    /// Copy `bytes` in at `offset`, returning the end offset
    pub fn write_bytes(&mut self, offset: usize, bytes: &[u8]) -> Result<usize, CodecError> {
        self.range_mut(offset, bytes.len())?.copy_from_slice(bytes);
        Ok(offset + bytes.len())
    }
}
