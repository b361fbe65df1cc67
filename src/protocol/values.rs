//! Bitmask-selected value lists
//!
//! CreateWindow, ChangeWindowAttributes, ConfigureWindow, CreateGC and
//! ChangeGC carry a mask word followed by one value per set bit, in
//! ascending bit order. Each value occupies a 4-byte slot on the wire; the
//! field table says how the slot is interpreted.
//!
//! Decoding is behind the `ValueListDecoder` trait so a host can plug in its
//! own tables. `WireValueDecoder` implements the core protocol encoding;
//! `PackedValueDecoder` reads each value at its natural width of 2 or 4
//! bytes, for peers that pack value lists.

use std::fmt;

use super::view::BinaryView;
use crate::error::CodecError;

/// How a value slot is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Card8,
    Card16,
    Int16,
    Card32,
    Bool,
}

/// A decoded value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Card8(u8),
    Card16(u16),
    Int16(i16),
    Card32(u32),
    Bool(bool),
}

impl ValueKind {
    /// Bytes taken by a value of this kind in a packed list
    pub fn packed_width(self) -> usize {
        match self {
            ValueKind::Card32 => 4,
            ValueKind::Card8 | ValueKind::Card16 | ValueKind::Int16 | ValueKind::Bool => 2,
        }
    }
}

impl Value {
    /// Interpret a raw 4-byte slot
    pub fn from_slot(kind: ValueKind, slot: u32) -> Self {
        match kind {
            ValueKind::Card8 => Value::Card8(slot as u8),
            ValueKind::Card16 => Value::Card16(slot as u16),
            ValueKind::Int16 => Value::Int16(slot as u16 as i16),
            ValueKind::Card32 => Value::Card32(slot),
            ValueKind::Bool => Value::Bool(slot & 0xff != 0),
        }
    }

    pub fn as_u32(self) -> u32 {
        match self {
            Value::Card8(v) => v as u32,
            Value::Card16(v) => v as u32,
            Value::Int16(v) => v as i32 as u32,
            Value::Card32(v) => v,
            Value::Bool(v) => v as u32,
        }
    }

    pub fn as_i32(self) -> i32 {
        match self {
            Value::Int16(v) => v as i32,
            other => other.as_u32() as i32,
        }
    }
}

/// A field of a bitmask-selected value list
pub trait ValueField: Copy + Eq + fmt::Debug + 'static {
    /// Every field, indexed by bit position
    const FIELDS: &'static [Self];

    fn bit(self) -> u32;

    fn kind(self) -> ValueKind;

    fn from_bit(bit: u32) -> Option<Self> {
        Self::FIELDS.get(bit as usize).copied()
    }
}

/// Fields named by `mask`, in bit order. Bits past the table are rejected.
pub fn fields_in_mask<F: ValueField>(mask: u32) -> Result<Vec<F>, CodecError> {
    if F::FIELDS.len() < 32 && mask >> F::FIELDS.len() != 0 {
        return Err(CodecError::InvalidValue {
            field: "value-mask",
            value: mask,
        });
    }
    Ok((0..32)
        .filter(|bit| mask & (1 << bit) != 0)
        .filter_map(F::from_bit)
        .collect())
}

/// Ordered (field, value) pairs, in ascending bit order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueList<F> {
    entries: Vec<(F, Value)>,
}

impl<F: ValueField> ValueList<F> {
    pub fn new() -> Self {
        ValueList {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, field: F, value: Value) {
        self.entries.push((field, value));
    }

    pub fn get(&self, field: F) -> Option<Value> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(F, Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The mask these entries would be encoded with
    pub fn mask(&self) -> u32 {
        self.entries
            .iter()
            .fold(0, |mask, (field, _)| mask | (1 << field.bit()))
    }
}

impl<F: ValueField> Default for ValueList<F> {
    fn default() -> Self {
        ValueList::new()
    }
}

/// Decodes a value list from a mask and the bytes that follow it
pub trait ValueListDecoder {
    fn decode<F: ValueField>(
        &self,
        mask: u32,
        region: &BinaryView<&[u8]>,
    ) -> Result<ValueList<F>, CodecError>;
}

/// Core protocol encoding: one 4-byte slot per set bit
#[derive(Debug, Clone, Copy, Default)]
pub struct WireValueDecoder;

impl ValueListDecoder for WireValueDecoder {
    fn decode<F: ValueField>(
        &self,
        mask: u32,
        region: &BinaryView<&[u8]>,
    ) -> Result<ValueList<F>, CodecError> {
        let mut values = ValueList::new();
        for (index, field) in fields_in_mask::<F>(mask)?.into_iter().enumerate() {
            let slot = region.read_u32(index * 4)?;
            values.push(field, Value::from_slot(field.kind(), slot));
        }
        Ok(values)
    }
}

/// Packed encoding: 16-bit and smaller values take 2 bytes, 32-bit values 4
#[derive(Debug, Clone, Copy, Default)]
pub struct PackedValueDecoder;

impl ValueListDecoder for PackedValueDecoder {
    fn decode<F: ValueField>(
        &self,
        mask: u32,
        region: &BinaryView<&[u8]>,
    ) -> Result<ValueList<F>, CodecError> {
        let mut values = ValueList::new();
        let mut offset = 0;
        for field in fields_in_mask::<F>(mask)? {
            let kind = field.kind();
            let raw = match kind.packed_width() {
                4 => region.read_u32(offset)?,
                _ => region.read_u16(offset)? as u32,
            };
            values.push(field, Value::from_slot(kind, raw));
            offset += kind.packed_width();
        }
        Ok(values)
    }
}

macro_rules! value_fields {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $kind:ident,)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($variant,)+
        }

        impl ValueField for $name {
            const FIELDS: &'static [Self] = &[$($name::$variant,)+];

            fn bit(self) -> u32 {
                self as u32
            }

            fn kind(self) -> ValueKind {
                match self {
                    $($name::$variant => ValueKind::$kind,)+
                }
            }
        }
    };
}

value_fields! {
    /// CreateWindow / ChangeWindowAttributes value-mask bits
    WindowAttribute {
        BackgroundPixmap => Card32,
        BackgroundPixel => Card32,
        BorderPixmap => Card32,
        BorderPixel => Card32,
        BitGravity => Card8,
        WinGravity => Card8,
        BackingStore => Card8,
        BackingPlanes => Card32,
        BackingPixel => Card32,
        OverrideRedirect => Bool,
        SaveUnder => Bool,
        EventMask => Card32,
        DoNotPropagateMask => Card32,
        Colormap => Card32,
        Cursor => Card32,
    }
}

value_fields! {
    /// CreateGC / ChangeGC / CopyGC component bits
    GcAttribute {
        Function => Card8,
        PlaneMask => Card32,
        Foreground => Card32,
        Background => Card32,
        LineWidth => Card16,
        LineStyle => Card8,
        CapStyle => Card8,
        JoinStyle => Card8,
        FillStyle => Card8,
        FillRule => Card8,
        Tile => Card32,
        Stipple => Card32,
        TileStippleXOrigin => Int16,
        TileStippleYOrigin => Int16,
        Font => Card32,
        SubwindowMode => Card8,
        GraphicsExposures => Bool,
        ClipXOrigin => Int16,
        ClipYOrigin => Int16,
        ClipMask => Card32,
        DashOffset => Card16,
        Dashes => Card8,
        ArcMode => Card8,
    }
}

value_fields! {
    /// ConfigureWindow value-mask bits
    ConfigureField {
        X => Int16,
        Y => Int16,
        Width => Card16,
        Height => Card16,
        BorderWidth => Card16,
        Sibling => Card32,
        StackMode => Card8,
    }
}
