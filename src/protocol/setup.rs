//! X11 connection setup protocol
//!
//! The client opens with a 12-byte prolog followed by the authorization
//! protocol name and data, each padded to 4 bytes. The server answers with
//! a `SetupResponse`.

use super::extras::{Extra, ExtrasList};
use super::types::*;
use super::view::BinaryView;
use super::{padded_len, PROTOCOL_MAJOR_VERSION};
use crate::error::CodecError;

/// Size of the fixed setup prolog
pub const SETUP_PROLOG_LEN: usize = 12;

/// Connection setup request from client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupRequest {
    pub byte_order: ByteOrder,
    pub protocol_major_version: u16,
    pub protocol_minor_version: u16,
    pub authorization_protocol_name: String,
    pub authorization_protocol_data: Vec<u8>,
}

impl SetupRequest {
    /// Decode a setup request from the start of `bytes`.
    ///
    /// Returns `Ok(None)` until the prolog and both authorization spans
    /// have arrived, otherwise the request and the number of bytes it
    /// occupied.
    pub fn decode(bytes: &[u8]) -> Result<Option<(SetupRequest, usize)>, CodecError> {
        if bytes.len() < SETUP_PROLOG_LEN {
            return Ok(None);
        }

        // Byte 0: byte order ('B' = MSB, anything else LSB)
        let view = BinaryView::new(bytes, ByteOrder::from_setup_byte(bytes[0]));

        let protocol_major_version = view.read_u16(2)?;
        let protocol_minor_version = view.read_u16(4)?;
        let name_len = view.read_u16(6)? as usize;
        let data_len = view.read_u16(8)? as usize;

        let data_start = SETUP_PROLOG_LEN + padded_len(name_len);
        let total = data_start + padded_len(data_len);
        if bytes.len() < total {
            return Ok(None);
        }

        if protocol_major_version != PROTOCOL_MAJOR_VERSION {
            return Err(CodecError::InvalidValue {
                field: "protocol-major-version",
                value: protocol_major_version as u32,
            });
        }

        let request = SetupRequest {
            byte_order: view.byte_order(),
            protocol_major_version,
            protocol_minor_version,
            authorization_protocol_name: view
                .read_string(SETUP_PROLOG_LEN, SETUP_PROLOG_LEN + name_len)?,
            authorization_protocol_data: view
                .read_bytes(data_start, data_start + data_len)?
                .to_vec(),
        };
        Ok(Some((request, total)))
    }
}

/// Setup response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStatus {
    Failed = 0,
    Success = 1,
    Authenticate = 2,
}

/// Pixmap format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    pub depth: u8,
    pub bits_per_pixel: u8,
    pub scanline_pad: u8,
}

impl Format {
    fn push_into(&self, extras: &mut ExtrasList) {
        extras.push(Extra::Card8(self.depth));
        extras.push(Extra::Card8(self.bits_per_pixel));
        extras.push(Extra::Card8(self.scanline_pad));
        extras.push(Extra::Bytes(vec![0; 5]));
    }
}

/// Visual type information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualType {
    pub visual_id: VisualID,
    pub class: u8,
    pub bits_per_rgb_value: u8,
    pub colormap_entries: u16,
    pub red_mask: u32,
    pub green_mask: u32,
    pub blue_mask: u32,
}

impl VisualType {
    fn push_into(&self, extras: &mut ExtrasList) {
        extras.push(Extra::Card32(self.visual_id.get()));
        extras.push(Extra::Card8(self.class));
        extras.push(Extra::Card8(self.bits_per_rgb_value));
        extras.push(Extra::Card16(self.colormap_entries));
        extras.push(Extra::Card32(self.red_mask));
        extras.push(Extra::Card32(self.green_mask));
        extras.push(Extra::Card32(self.blue_mask));
        extras.push(Extra::Card32(0));
    }
}

/// Depth information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Depth {
    pub depth: u8,
    pub visuals: Vec<VisualType>,
}

impl Depth {
    fn push_into(&self, extras: &mut ExtrasList) {
        extras.push(Extra::Card8(self.depth));
        extras.push(Extra::Card8(0));
        extras.push(Extra::Card16(self.visuals.len() as u16));
        extras.push(Extra::Card32(0));
        for visual in &self.visuals {
            visual.push_into(extras);
        }
    }
}

/// Screen information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub root: Window,
    pub default_colormap: Colormap,
    pub white_pixel: u32,
    pub black_pixel: u32,
    pub current_input_masks: u32,
    pub width_in_pixels: u16,
    pub height_in_pixels: u16,
    pub width_in_millimeters: u16,
    pub height_in_millimeters: u16,
    pub min_installed_maps: u16,
    pub max_installed_maps: u16,
    pub root_visual: VisualID,
    pub backing_stores: u8,
    pub save_unders: bool,
    pub root_depth: u8,
    pub allowed_depths: Vec<Depth>,
}

impl Screen {
    fn push_into(&self, extras: &mut ExtrasList) {
        extras.push(Extra::Card32(self.root.id().get()));
        extras.push(Extra::Card32(self.default_colormap.id().get()));
        extras.push(Extra::Card32(self.white_pixel));
        extras.push(Extra::Card32(self.black_pixel));
        extras.push(Extra::Card32(self.current_input_masks));
        extras.push(Extra::Card16(self.width_in_pixels));
        extras.push(Extra::Card16(self.height_in_pixels));
        extras.push(Extra::Card16(self.width_in_millimeters));
        extras.push(Extra::Card16(self.height_in_millimeters));
        extras.push(Extra::Card16(self.min_installed_maps));
        extras.push(Extra::Card16(self.max_installed_maps));
        extras.push(Extra::Card32(self.root_visual.get()));
        extras.push(Extra::Card8(self.backing_stores));
        extras.push(Extra::Card8(u8::from(self.save_unders)));
        extras.push(Extra::Card8(self.root_depth));
        extras.push(Extra::Card8(self.allowed_depths.len() as u8));
        for depth in &self.allowed_depths {
            depth.push_into(extras);
        }
    }
}

/// Setup reply (success case)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupSuccess {
    pub protocol_major_version: u16,
    pub protocol_minor_version: u16,
    pub release_number: u32,
    pub resource_id_base: u32,
    pub resource_id_mask: u32,
    pub motion_buffer_size: u32,
    pub maximum_request_length: u16,
    pub image_byte_order: ByteOrder,
    pub bitmap_format_bit_order: ByteOrder,
    pub bitmap_format_scanline_unit: u8,
    pub bitmap_format_scanline_pad: u8,
    pub min_keycode: u8,
    pub max_keycode: u8,
    pub vendor: String,
    pub pixmap_formats: Vec<Format>,
    pub roots: Vec<Screen>,
}

/// Setup failed response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupFailed {
    pub protocol_major_version: u16,
    pub protocol_minor_version: u16,
    pub reason: String,
}

/// Setup response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupResponse {
    Success(SetupSuccess),
    Failed(SetupFailed),
}

impl SetupResponse {
    /// Encode in the client's byte order
    pub fn encode(&self, byte_order: ByteOrder) -> Result<Vec<u8>, CodecError> {
        let mut extras = ExtrasList::new();
        let (status, data_byte, major, minor) = match self {
            SetupResponse::Success(success) => {
                success.push_into(&mut extras);
                (
                    SetupStatus::Success,
                    0,
                    success.protocol_major_version,
                    success.protocol_minor_version,
                )
            }
            SetupResponse::Failed(failed) => {
                extras.push(Extra::Str(failed.reason.clone()));
                (
                    SetupStatus::Failed,
                    failed.reason.chars().count().min(u8::MAX as usize) as u8,
                    failed.protocol_major_version,
                    failed.protocol_minor_version,
                )
            }
        };
        extras.pad();

        // Length in 4-byte units, excluding the first 8 bytes
        let quads = extras.byte_len() / 4;
        let length = u16::try_from(quads).map_err(|_| CodecError::InvalidValue {
            field: "setup-length",
            value: quads as u32,
        })?;

        let mut out = BinaryView::alloc(8 + extras.byte_len(), byte_order);
        out.write_u8(0, status as u8)?;
        out.write_u8(1, data_byte)?;
        out.write_u16(2, major)?;
        out.write_u16(4, minor)?;
        out.write_u16(6, length)?;
        extras.write_into(&mut out, 8)?;
        Ok(out.into_inner())
    }
}

impl SetupSuccess {
    fn push_into(&self, extras: &mut ExtrasList) {
        extras.push(Extra::Card32(self.release_number));
        extras.push(Extra::Card32(self.resource_id_base));
        extras.push(Extra::Card32(self.resource_id_mask));
        extras.push(Extra::Card32(self.motion_buffer_size));
        extras.push(Extra::Card16(self.vendor.chars().count() as u16));
        extras.push(Extra::Card16(self.maximum_request_length));
        extras.push(Extra::Card8(self.roots.len() as u8));
        extras.push(Extra::Card8(self.pixmap_formats.len() as u8));
        extras.push(Extra::Card8(self.image_byte_order as u8));
        extras.push(Extra::Card8(self.bitmap_format_bit_order as u8));
        extras.push(Extra::Card8(self.bitmap_format_scanline_unit));
        extras.push(Extra::Card8(self.bitmap_format_scanline_pad));
        extras.push(Extra::Card8(self.min_keycode));
        extras.push(Extra::Card8(self.max_keycode));
        extras.push(Extra::Card32(0));

        // Everything so far is 32 bytes, so this pads the vendor string
        extras.push(Extra::Str(self.vendor.clone()));
        extras.pad();

        for format in &self.pixmap_formats {
            format.push_into(extras);
        }
        for screen in &self.roots {
            screen.push_into(extras);
        }
    }
}
