//! X11 reply encoder
//!
//! Every reply is a 32-byte block followed by a tail:
//!
//! - byte 0: 1 (reply)
//! - byte 1: reply-specific data byte
//! - bytes 2-3: sequence number of the request, low 16 bits
//! - bytes 4-7: tail length in 4-byte units
//! - bytes 8-31: reply-specific fields
//!
//! The tail is an `ExtrasList`, padded before the length is taken.

use super::extras::{Extra, ExtrasList};
use super::replies::*;
use super::types::*;
use super::view::BinaryView;
use crate::error::CodecError;

/// Size of the fixed reply block
pub const REPLY_BLOCK_LEN: usize = 32;

const REPLY: u8 = 1;

/// A reply under construction. Field offsets are absolute (8..32).
struct ReplyFrame {
    data_byte: u8,
    block: BinaryView<Vec<u8>>,
    extras: ExtrasList,
}

impl ReplyFrame {
    fn new(byte_order: ByteOrder) -> Self {
        ReplyFrame {
            data_byte: 0,
            block: BinaryView::alloc(REPLY_BLOCK_LEN, byte_order),
            extras: ExtrasList::new(),
        }
    }

    fn finish(mut self, sequence: u32) -> Result<Vec<u8>, CodecError> {
        self.extras.pad();
        let extras_len = self.extras.byte_len();

        self.block.write_u8(0, REPLY)?;
        self.block.write_u8(1, self.data_byte)?;
        self.block.write_u16(2, sequence as u16)?;
        self.block.write_u32(4, (extras_len / 4) as u32)?;

        let mut out = BinaryView::alloc(REPLY_BLOCK_LEN + extras_len, self.block.byte_order());
        let end = self.block.copy_into(&mut out, 0)?;
        self.extras.write_into(&mut out, end)?;
        Ok(out.into_inner())
    }
}

/// Reply encoder
#[derive(Debug, Clone, Copy)]
pub struct ReplyEncoder {
    byte_order: ByteOrder,
}

impl ReplyEncoder {
    pub fn new(byte_order: ByteOrder) -> Self {
        ReplyEncoder { byte_order }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Encode `reply` as the answer to request `sequence`
    pub fn encode(&self, sequence: u32, reply: &Reply) -> Result<Vec<u8>, CodecError> {
        let mut frame = ReplyFrame::new(self.byte_order);

        match reply {
            Reply::GetWindowAttributes(r) => self.encode_get_window_attributes(&mut frame, r)?,
            Reply::GetGeometry(r) => self.encode_get_geometry(&mut frame, r)?,
            Reply::QueryTree(r) => self.encode_query_tree(&mut frame, r)?,
            Reply::InternAtom(r) => frame.block.write_u32(8, r.atom.get())?,
            Reply::GetAtomName(r) => {
                frame.block.write_u16(8, r.name.chars().count() as u16)?;
                frame.extras.push(Extra::Str(r.name.clone()));
            }
            Reply::GetProperty(r) => self.encode_get_property(&mut frame, r)?,
            Reply::ListProperties(r) => {
                frame.block.write_u16(8, r.atoms.len() as u16)?;
                frame
                    .extras
                    .extend(r.atoms.iter().map(|atom| Extra::Card32(atom.get())));
            }
            Reply::GetSelectionOwner(r) => frame.block.write_u32(8, r.owner.id().get())?,
            Reply::QueryPointer(r) => self.encode_query_pointer(&mut frame, r)?,
            Reply::GetInputFocus(r) => {
                frame.data_byte = r.revert_to;
                frame.block.write_u32(8, r.focus.id().get())?;
            }
            Reply::QueryFont(r) => self.encode_query_font(&mut frame, r)?,
            Reply::ListFonts(r) => {
                frame.block.write_u16(8, r.names.len() as u16)?;
                frame
                    .extras
                    .extend(r.names.iter().cloned().map(Extra::XStr));
            }
            Reply::ListFontsWithInfo(r) => self.encode_list_fonts_with_info(&mut frame, r)?,
            Reply::GetImage(r) => {
                frame.data_byte = r.depth;
                frame.block.write_u32(8, r.visual.get())?;
                frame.extras.push(Extra::Bytes(r.data.clone()));
            }
            Reply::AllocColor(r) => {
                write_rgb(&mut frame.block, 8, r.color)?;
                frame.block.write_u32(16, r.pixel)?;
            }
            Reply::AllocNamedColor(r) => {
                frame.block.write_u32(8, r.pixel)?;
                write_rgb(&mut frame.block, 12, r.exact)?;
                write_rgb(&mut frame.block, 18, r.visual)?;
            }
            Reply::QueryColors(r) => {
                frame.block.write_u16(8, r.colors.len() as u16)?;
                for color in &r.colors {
                    frame.extras.push(Extra::Card16(color.red));
                    frame.extras.push(Extra::Card16(color.green));
                    frame.extras.push(Extra::Card16(color.blue));
                    frame.extras.push(Extra::Card16(0));
                }
            }
            Reply::LookupColor(r) => {
                write_rgb(&mut frame.block, 8, r.exact)?;
                write_rgb(&mut frame.block, 14, r.visual)?;
            }
            Reply::QueryBestSize(r) => {
                frame.block.write_u16(8, r.width)?;
                frame.block.write_u16(10, r.height)?;
            }
            Reply::QueryExtension(r) => {
                frame.block.write_bool(8, r.present)?;
                frame.block.write_u8(9, r.major_opcode)?;
                frame.block.write_u8(10, r.first_event)?;
                frame.block.write_u8(11, r.first_error)?;
            }
            Reply::ListExtensions(r) => {
                frame.data_byte = r.names.len() as u8;
                frame
                    .extras
                    .extend(r.names.iter().cloned().map(Extra::XStr));
            }
            Reply::GetKeyboardMapping(r) => {
                let per_keycode = r.keysyms_per_keycode as usize;
                if (per_keycode == 0 && !r.keysyms.is_empty())
                    || (per_keycode != 0 && r.keysyms.len() % per_keycode != 0)
                {
                    return Err(CodecError::InvalidValue {
                        field: "keysyms",
                        value: r.keysyms.len() as u32,
                    });
                }
                frame.data_byte = r.keysyms_per_keycode;
                frame.extras.extend(r.keysyms.iter().map(|&k| Extra::Card32(k)));
            }
            Reply::ListHosts(r) => {
                frame.data_byte = u8::from(r.enabled);
                frame.block.write_u16(8, r.hosts.len() as u16)?;
                frame.extras.extend(r.hosts.iter().cloned().map(Extra::Host));
            }
            Reply::GetModifierMapping(r) => {
                if r.keycodes.len() % 8 != 0 || r.keycodes.len() / 8 > u8::MAX as usize {
                    return Err(CodecError::InvalidValue {
                        field: "modifier-keycodes",
                        value: r.keycodes.len() as u32,
                    });
                }
                frame.data_byte = (r.keycodes.len() / 8) as u8;
                frame
                    .extras
                    .extend(r.keycodes.iter().map(|k| Extra::Card8(k.0)));
            }
        }

        log::debug!(
            "Encoded {} reply for sequence {}",
            reply.opcode(),
            sequence
        );

        frame.finish(sequence)
    }

    fn encode_get_window_attributes(
        &self,
        frame: &mut ReplyFrame,
        r: &GetWindowAttributesReply,
    ) -> Result<(), CodecError> {
        frame.data_byte = r.backing_store;
        let block = &mut frame.block;
        block.write_u32(8, r.visual.get())?;
        block.write_u16(12, r.class as u16)?;
        block.write_u8(14, r.bit_gravity)?;
        block.write_u8(15, r.win_gravity)?;
        block.write_u32(16, r.backing_planes)?;
        block.write_u32(20, r.backing_pixel)?;
        block.write_bool(24, r.save_under)?;
        block.write_bool(25, r.map_is_installed)?;
        block.write_u8(26, r.map_state as u8)?;
        block.write_bool(27, r.override_redirect)?;
        block.write_u32(28, r.colormap.id().get())?;

        frame.extras.push(Extra::Card32(r.all_event_masks));
        frame.extras.push(Extra::Card32(r.your_event_mask));
        frame.extras.push(Extra::Card16(r.do_not_propagate_mask));
        Ok(())
    }

    fn encode_get_geometry(
        &self,
        frame: &mut ReplyFrame,
        r: &GetGeometryReply,
    ) -> Result<(), CodecError> {
        frame.data_byte = r.depth;
        let block = &mut frame.block;
        block.write_u32(8, r.root.id().get())?;
        block.write_i16(12, r.x)?;
        block.write_i16(14, r.y)?;
        block.write_u16(16, r.width)?;
        block.write_u16(18, r.height)?;
        block.write_u16(20, r.border_width)?;
        Ok(())
    }

    fn encode_query_tree(&self, frame: &mut ReplyFrame, r: &QueryTreeReply) -> Result<(), CodecError> {
        frame.block.write_u32(8, r.root.id().get())?;
        frame.block.write_u32(12, r.parent.id().get())?;
        frame.block.write_u16(16, r.children.len() as u16)?;
        frame
            .extras
            .extend(r.children.iter().map(|w| Extra::Card32(w.id().get())));
        Ok(())
    }

    fn encode_get_property(
        &self,
        frame: &mut ReplyFrame,
        r: &GetPropertyReply,
    ) -> Result<(), CodecError> {
        let units = match r.format {
            0 if r.value.is_empty() => 0,
            8 | 16 | 32 if r.value.len() % (r.format as usize / 8) == 0 => {
                r.value.len() / (r.format as usize / 8)
            }
            0 | 8 | 16 | 32 => {
                return Err(CodecError::InvalidValue {
                    field: "property-value-length",
                    value: r.value.len() as u32,
                })
            }
            other => {
                return Err(CodecError::InvalidValue {
                    field: "format",
                    value: other as u32,
                })
            }
        };
        frame.data_byte = r.format;
        frame.block.write_u32(8, r.type_.get())?;
        frame.block.write_u32(12, r.bytes_after)?;
        frame.block.write_u32(16, units as u32)?;
        frame.extras.push(Extra::Bytes(r.value.clone()));
        Ok(())
    }

    fn encode_query_pointer(
        &self,
        frame: &mut ReplyFrame,
        r: &QueryPointerReply,
    ) -> Result<(), CodecError> {
        frame.data_byte = u8::from(r.same_screen);
        let block = &mut frame.block;
        block.write_u32(8, r.root.id().get())?;
        block.write_u32(12, r.child.id().get())?;
        block.write_i16(16, r.root_x)?;
        block.write_i16(18, r.root_y)?;
        block.write_i16(20, r.win_x)?;
        block.write_i16(22, r.win_y)?;
        block.write_u16(24, r.mask)?;
        Ok(())
    }

    fn encode_query_font(&self, frame: &mut ReplyFrame, r: &QueryFontReply) -> Result<(), CodecError> {
        push_font_info(frame, &r.info, r.char_infos.len() as u32)?;
        for info in &r.char_infos {
            let extras = &mut frame.extras;
            extras.push(Extra::Int16(info.left_side_bearing));
            extras.push(Extra::Int16(info.right_side_bearing));
            extras.push(Extra::Int16(info.character_width));
            extras.push(Extra::Int16(info.ascent));
            extras.push(Extra::Int16(info.descent));
            extras.push(Extra::Card16(info.attributes));
        }
        Ok(())
    }

    /// Same fixed part as QueryFont, with the replies hint in place of the
    /// char-info count and the font name at the end
    fn encode_list_fonts_with_info(
        &self,
        frame: &mut ReplyFrame,
        r: &ListFontsWithInfoReply,
    ) -> Result<(), CodecError> {
        let name_len = r.name.chars().count();
        frame.data_byte = u8::try_from(name_len).map_err(|_| CodecError::InvalidValue {
            field: "font-name-length",
            value: name_len as u32,
        })?;
        push_font_info(frame, &r.info, r.replies_hint)?;
        frame.extras.push(Extra::Str(r.name.clone()));
        Ok(())
    }
}

/// The font header runs past the fixed block: max-bounds straddles offset
/// 32, so its last two fields and everything after go into the tail.
/// `count` is the 32-bit word at offset 56.
fn push_font_info(frame: &mut ReplyFrame, info: &FontInfo, count: u32) -> Result<(), CodecError> {
    let block = &mut frame.block;
    write_char_info(block, 8, &info.min_bounds)?;
    let max = &info.max_bounds;
    block.write_i16(24, max.left_side_bearing)?;
    block.write_i16(26, max.right_side_bearing)?;
    block.write_i16(28, max.character_width)?;
    block.write_i16(30, max.ascent)?;

    let extras = &mut frame.extras;
    extras.push(Extra::Int16(max.descent));
    extras.push(Extra::Card16(max.attributes));
    extras.push(Extra::Card32(0));
    extras.push(Extra::Card16(info.min_char_or_byte2));
    extras.push(Extra::Card16(info.max_char_or_byte2));
    extras.push(Extra::Card16(info.default_char));
    extras.push(Extra::Card16(info.properties.len() as u16));
    extras.push(Extra::Card8(info.draw_direction));
    extras.push(Extra::Card8(info.min_byte1));
    extras.push(Extra::Card8(info.max_byte1));
    extras.push(Extra::Card8(u8::from(info.all_chars_exist)));
    extras.push(Extra::Int16(info.font_ascent));
    extras.push(Extra::Int16(info.font_descent));
    extras.push(Extra::Card32(count));

    for prop in &info.properties {
        extras.push(Extra::Card32(prop.name.get()));
        extras.push(Extra::Card32(prop.value));
    }
    Ok(())
}

fn write_rgb(block: &mut BinaryView<Vec<u8>>, offset: usize, rgb: Rgb) -> Result<(), CodecError> {
    block.write_u16(offset, rgb.red)?;
    block.write_u16(offset + 2, rgb.green)?;
    block.write_u16(offset + 4, rgb.blue)
}

fn write_char_info(
    block: &mut BinaryView<Vec<u8>>,
    offset: usize,
    info: &CharInfo,
) -> Result<(), CodecError> {
    block.write_i16(offset, info.left_side_bearing)?;
    block.write_i16(offset + 2, info.right_side_bearing)?;
    block.write_i16(offset + 4, info.character_width)?;
    block.write_i16(offset + 6, info.ascent)?;
    block.write_i16(offset + 8, info.descent)?;
    block.write_u16(offset + 10, info.attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(bytes: &[u8], order: ByteOrder) -> (u8, u8, u16, u32) {
        let view = BinaryView::new(bytes, order);
        (
            view.read_u8(0).unwrap(),
            view.read_u8(1).unwrap(),
            view.read_u16(2).unwrap(),
            view.read_u32(4).unwrap(),
        )
    }

    fn assert_length_consistent(bytes: &[u8], order: ByteOrder) {
        let (_, _, _, length) = header(bytes, order);
        assert!(bytes.len() >= REPLY_BLOCK_LEN);
        assert_eq!((bytes.len() - REPLY_BLOCK_LEN) % 4, 0);
        assert_eq!(length as usize, (bytes.len() - REPLY_BLOCK_LEN) / 4);
    }

    #[test]
    fn test_get_geometry_layout() {
        let reply = Reply::GetGeometry(GetGeometryReply {
            depth: 24,
            root: Window::new(0x100),
            x: -5,
            y: 7,
            width: 640,
            height: 480,
            border_width: 2,
        });
        let bytes = ReplyEncoder::new(ByteOrder::MSBFirst)
            .encode(0x1_0003, &reply)
            .unwrap();

        assert_eq!(bytes.len(), 32);
        // Sequence is truncated to 16 bits
        assert_eq!(header(&bytes, ByteOrder::MSBFirst), (1, 24, 3, 0));
        assert_eq!(&bytes[8..12], &[0, 0, 1, 0]);
        assert_eq!(&bytes[12..14], &[0xff, 0xfb]);
        assert_eq!(&bytes[16..18], &[0x02, 0x80]);
        assert_eq!(&bytes[20..22], &[0, 2]);
    }

    #[test]
    fn test_get_atom_name_pads_tail() {
        let reply = Reply::GetAtomName(GetAtomNameReply {
            name: "WM_NAME".to_string(),
        });
        let bytes = ReplyEncoder::new(ByteOrder::LSBFirst).encode(9, &reply).unwrap();
        assert_eq!(bytes.len(), 40);
        assert_eq!(header(&bytes, ByteOrder::LSBFirst), (1, 0, 9, 2));
        assert_eq!(&bytes[8..10], &[7, 0]);
        assert_eq!(&bytes[32..39], b"WM_NAME");
        assert_eq!(bytes[39], 0);
    }

    #[test]
    fn test_get_window_attributes_tail() {
        let reply = Reply::GetWindowAttributes(GetWindowAttributesReply {
            backing_store: 0,
            visual: VisualID::new(0x21),
            class: WindowClass::InputOutput,
            bit_gravity: 0,
            win_gravity: 1,
            backing_planes: !0,
            backing_pixel: 0,
            save_under: false,
            map_is_installed: true,
            map_state: MapState::Viewable,
            override_redirect: false,
            colormap: Colormap::new(0x20),
            all_event_masks: 0x8000,
            your_event_mask: 0x8000,
            do_not_propagate_mask: 0,
        });
        let bytes = ReplyEncoder::new(ByteOrder::LSBFirst).encode(2, &reply).unwrap();
        assert_eq!(bytes.len(), 44);
        assert_eq!(header(&bytes, ByteOrder::LSBFirst).3, 3);
        assert_eq!(bytes[26], MapState::Viewable as u8);
        assert_eq!(&bytes[32..36], &[0, 0x80, 0, 0]);
    }

    #[test]
    fn test_get_property_units() {
        let reply = Reply::GetProperty(GetPropertyReply {
            format: 32,
            type_: Atom::new(4),
            bytes_after: 0,
            value: vec![1, 0, 0, 0, 2, 0, 0, 0],
        });
        let bytes = ReplyEncoder::new(ByteOrder::LSBFirst).encode(1, &reply).unwrap();
        let view = BinaryView::new(&bytes[..], ByteOrder::LSBFirst);
        assert_eq!(view.read_u8(1).unwrap(), 32);
        assert_eq!(view.read_u32(16).unwrap(), 2);
        assert_length_consistent(&bytes, ByteOrder::LSBFirst);

        let bad = Reply::GetProperty(GetPropertyReply {
            format: 7,
            type_: Atom::NONE,
            bytes_after: 0,
            value: vec![],
        });
        assert!(ReplyEncoder::new(ByteOrder::LSBFirst).encode(1, &bad).is_err());
    }

    #[test]
    fn test_get_property_value_must_fit_format() {
        let encoder = ReplyEncoder::new(ByteOrder::LSBFirst);
        let ragged = Reply::GetProperty(GetPropertyReply {
            format: 32,
            type_: Atom::new(4),
            bytes_after: 0,
            value: vec![1, 2, 3, 4, 5, 6],
        });
        assert_eq!(
            encoder.encode(1, &ragged),
            Err(CodecError::InvalidValue {
                field: "property-value-length",
                value: 6
            })
        );

        let missing_with_data = Reply::GetProperty(GetPropertyReply {
            format: 0,
            type_: Atom::NONE,
            bytes_after: 0,
            value: vec![1, 2, 3],
        });
        assert!(encoder.encode(1, &missing_with_data).is_err());

        let missing = Reply::GetProperty(GetPropertyReply {
            format: 0,
            type_: Atom::NONE,
            bytes_after: 0,
            value: vec![],
        });
        let bytes = encoder.encode(1, &missing).unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(header(&bytes, ByteOrder::LSBFirst).3, 0);

        let shorts = Reply::GetProperty(GetPropertyReply {
            format: 16,
            type_: Atom::new(19),
            bytes_after: 0,
            value: vec![1, 0, 2, 0, 3, 0],
        });
        let bytes = encoder.encode(1, &shorts).unwrap();
        assert_eq!(&bytes[16..20], &[3, 0, 0, 0]);
        assert_length_consistent(&bytes, ByteOrder::LSBFirst);
    }

    #[test]
    fn test_keyboard_mapping_layout() {
        let encoder = ReplyEncoder::new(ByteOrder::MSBFirst);
        let reply = Reply::GetKeyboardMapping(GetKeyboardMappingReply {
            keysyms_per_keycode: 2,
            keysyms: vec![0x61, 0x41, 0x62, 0x42, 0xff0d, 0],
        });
        let bytes = encoder.encode(5, &reply).unwrap();
        assert_eq!(header(&bytes, ByteOrder::MSBFirst), (1, 2, 5, 6));
        assert_eq!(&bytes[32..36], &[0, 0, 0, 0x61]);
        assert_eq!(&bytes[48..52], &[0, 0, 0xff, 0x0d]);
        assert_length_consistent(&bytes, ByteOrder::MSBFirst);

        let ragged = Reply::GetKeyboardMapping(GetKeyboardMappingReply {
            keysyms_per_keycode: 4,
            keysyms: vec![0; 6],
        });
        assert!(encoder.encode(5, &ragged).is_err());
    }

    #[test]
    fn test_color_replies() {
        let encoder = ReplyEncoder::new(ByteOrder::LSBFirst);
        let colors = Reply::QueryColors(QueryColorsReply {
            colors: vec![
                Rgb {
                    red: 0xffff,
                    green: 0x8000,
                    blue: 0,
                },
                Rgb::default(),
            ],
        });
        let bytes = encoder.encode(2, &colors).unwrap();
        assert_eq!(&bytes[8..10], &[2, 0]);
        assert_eq!(bytes.len(), 32 + 16);
        assert_eq!(&bytes[32..40], &[0xff, 0xff, 0, 0x80, 0, 0, 0, 0]);

        let lookup = Reply::LookupColor(LookupColorReply {
            exact: Rgb {
                red: 1,
                green: 2,
                blue: 3,
            },
            visual: Rgb {
                red: 4,
                green: 5,
                blue: 6,
            },
        });
        let bytes = encoder.encode(3, &lookup).unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[8..20], &[1, 0, 2, 0, 3, 0, 4, 0, 5, 0, 6, 0]);
    }

    #[test]
    fn test_list_fonts_with_info_series() {
        let encoder = ReplyEncoder::new(ByteOrder::LSBFirst);
        let font = Reply::ListFontsWithInfo(ListFontsWithInfoReply {
            name: "fixed".to_string(),
            info: FontInfo {
                font_ascent: 10,
                ..FontInfo::default()
            },
            replies_hint: 1,
        });
        let bytes = encoder.encode(4, &font).unwrap();
        assert_eq!(bytes[1], 5);
        assert_eq!(&bytes[56..60], &[1, 0, 0, 0]);
        assert_eq!(&bytes[60..65], b"fixed");
        assert_length_consistent(&bytes, ByteOrder::LSBFirst);

        let last = ListFontsWithInfoReply::last();
        assert!(last.is_last());
        let bytes = encoder.encode(4, &Reply::ListFontsWithInfo(last)).unwrap();
        assert_eq!(bytes.len(), 60);
        assert_eq!(header(&bytes, ByteOrder::LSBFirst), (1, 0, 4, 7));
        assert!(bytes[8..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_list_extensions_count_and_strings() {
        let reply = Reply::ListExtensions(ListExtensionsReply {
            names: vec!["BIG-REQUESTS".to_string(), "XKEYBOARD".to_string()],
        });
        let bytes = ReplyEncoder::new(ByteOrder::MSBFirst).encode(4, &reply).unwrap();
        assert_eq!(bytes[1], 2);
        assert_eq!(bytes[32], 12);
        assert_eq!(&bytes[33..45], b"BIG-REQUESTS");
        assert_eq!(bytes[45], 9);
        assert_length_consistent(&bytes, ByteOrder::MSBFirst);
    }

    #[test]
    fn test_query_font_fixed_part_is_60_bytes() {
        let reply = Reply::QueryFont(QueryFontReply {
            info: FontInfo {
                max_bounds: CharInfo {
                    character_width: 8,
                    descent: 3,
                    ..CharInfo::default()
                },
                min_char_or_byte2: 32,
                max_char_or_byte2: 126,
                all_chars_exist: true,
                font_ascent: 11,
                font_descent: 3,
                properties: vec![FontProp {
                    name: Atom::new(50),
                    value: 7,
                }],
                ..FontInfo::default()
            },
            char_infos: vec![CharInfo::default(); 2],
        });
        let bytes = ReplyEncoder::new(ByteOrder::LSBFirst).encode(6, &reply).unwrap();
        assert_eq!(bytes.len(), 60 + 8 + 2 * 12);
        assert_length_consistent(&bytes, ByteOrder::LSBFirst);

        let view = BinaryView::new(&bytes[..], ByteOrder::LSBFirst);
        assert_eq!(view.read_i16(28).unwrap(), 8);
        assert_eq!(view.read_i16(32).unwrap(), 3);
        assert_eq!(view.read_u16(40).unwrap(), 32);
        assert_eq!(view.read_u16(42).unwrap(), 126);
        assert_eq!(view.read_u16(46).unwrap(), 1);
        assert_eq!(view.read_u8(51).unwrap(), 1);
        assert_eq!(view.read_i16(52).unwrap(), 11);
        assert_eq!(view.read_u32(56).unwrap(), 2);
        assert_eq!(view.read_u32(60).unwrap(), 50);
    }

    #[test]
    fn test_modifier_mapping_requires_eight_rows() {
        let encoder = ReplyEncoder::new(ByteOrder::LSBFirst);
        let ok = Reply::GetModifierMapping(GetModifierMappingReply {
            keycodes: vec![Keycode(50); 16],
        });
        let bytes = encoder.encode(3, &ok).unwrap();
        assert_eq!(bytes[1], 2);
        assert_eq!(bytes.len(), 48);

        let bad = Reply::GetModifierMapping(GetModifierMappingReply {
            keycodes: vec![Keycode(50); 5],
        });
        assert!(encoder.encode(3, &bad).is_err());
    }

    #[test]
    fn test_list_hosts() {
        let reply = Reply::ListHosts(ListHostsReply {
            enabled: true,
            hosts: vec![HostAddress::from_ip("127.0.0.1".parse().unwrap())],
        });
        let bytes = ReplyEncoder::new(ByteOrder::LSBFirst).encode(8, &reply).unwrap();
        assert_eq!(bytes[1], 1);
        assert_eq!(&bytes[8..10], &[1, 0]);
        assert_eq!(&bytes[32..40], &[0, 0, 4, 0, 127, 0, 0, 1]);
        assert_length_consistent(&bytes, ByteOrder::LSBFirst);
    }

    #[test]
    fn test_every_reply_length_matches_tail() {
        let replies = vec![
            Reply::QueryTree(QueryTreeReply {
                root: Window::new(1),
                parent: Window::NONE,
                children: vec![Window::new(2), Window::new(3), Window::new(4)],
            }),
            Reply::InternAtom(InternAtomReply { atom: Atom::new(300) }),
            Reply::ListProperties(ListPropertiesReply {
                atoms: vec![Atom::WM_NAME],
            }),
            Reply::GetSelectionOwner(GetSelectionOwnerReply {
                owner: Window::NONE,
            }),
            Reply::QueryPointer(QueryPointerReply {
                same_screen: true,
                root: Window::new(1),
                child: Window::NONE,
                root_x: 10,
                root_y: 10,
                win_x: 10,
                win_y: 10,
                mask: 0,
            }),
            Reply::GetInputFocus(GetInputFocusReply {
                revert_to: 1,
                focus: Window::new(1),
            }),
            Reply::ListFonts(ListFontsReply {
                names: vec!["fixed".to_string(), "cursor".to_string()],
            }),
            Reply::AllocColor(AllocColorReply {
                color: Rgb {
                    red: 0xffff,
                    green: 0,
                    blue: 0,
                },
                pixel: 0xff0000,
            }),
            Reply::AllocNamedColor(AllocNamedColorReply {
                pixel: 1,
                exact: Rgb::default(),
                visual: Rgb::default(),
            }),
            Reply::QueryExtension(QueryExtensionReply::default()),
            Reply::GetImage(GetImageReply {
                depth: 24,
                visual: VisualID::new(0x21),
                data: vec![0xff; 13],
            }),
            Reply::QueryColors(QueryColorsReply {
                colors: vec![Rgb::default(); 3],
            }),
            Reply::LookupColor(LookupColorReply {
                exact: Rgb::default(),
                visual: Rgb::default(),
            }),
            Reply::QueryBestSize(QueryBestSizeReply {
                width: 16,
                height: 16,
            }),
            Reply::GetKeyboardMapping(GetKeyboardMappingReply {
                keysyms_per_keycode: 3,
                keysyms: vec![0x20; 9],
            }),
            Reply::ListFontsWithInfo(ListFontsWithInfoReply {
                name: "cursor".to_string(),
                ..ListFontsWithInfoReply::default()
            }),
        ];

        for order in [ByteOrder::LSBFirst, ByteOrder::MSBFirst] {
            let encoder = ReplyEncoder::new(order);
            for reply in &replies {
                let bytes = encoder.encode(77, reply).unwrap();
                assert_eq!(bytes[0], 1, "{:?}", reply.opcode());
                assert_length_consistent(&bytes, order);
            }
        }
    }
}
