//! X11 request parser
//!
//! Turns the body of one complete record (the bytes after the 4-byte
//! header) into a `Request`. Offsets in the `parse_*` functions are relative
//! to the body. Framing, sequence numbers and generic records are the
//! connection's business; this module only knows layouts.

use super::opcodes::Opcode;
use super::requests::*;
use super::types::*;
use super::values::{fields_in_mask, ValueListDecoder, WireValueDecoder};
use super::view::BinaryView;
use super::padded_len;
use crate::error::CodecError;

type Body<'a> = BinaryView<&'a [u8]>;

/// Request parser
#[derive(Debug, Clone, Default)]
pub struct RequestParser<D = WireValueDecoder> {
    values: D,
}

impl RequestParser<WireValueDecoder> {
    pub fn new() -> Self {
        RequestParser {
            values: WireValueDecoder,
        }
    }
}

impl<D: ValueListDecoder> RequestParser<D> {
    /// Use `values` for the bitmask-selected attribute blocks
    pub fn with_value_decoder(values: D) -> Self {
        RequestParser { values }
    }

    /// Decode one record body. Opcodes without a decoder return
    /// `CodecError::UnsupportedOpcode`.
    pub fn parse(&self, header: &RequestHeader, body: &Body<'_>) -> Result<Request, CodecError> {
        let detail = header.data_byte;

        log::debug!(
            "Parsing request: opcode={}, detail={}, length={}",
            header.opcode,
            detail,
            header.length_quads
        );

        let opcode = Opcode::from_u8(header.opcode)
            .ok_or(CodecError::UnsupportedOpcode(header.opcode))?;

        let request = match opcode {
            Opcode::CreateWindow => self.parse_create_window(detail, body)?,
            Opcode::ChangeWindowAttributes => self.parse_change_window_attributes(body)?,
            Opcode::GetWindowAttributes => Request::GetWindowAttributes(window_request(body)?),
            Opcode::DestroyWindow => Request::DestroyWindow(window_request(body)?),
            Opcode::DestroySubwindows => Request::DestroySubwindows(window_request(body)?),
            Opcode::ChangeSaveSet => Request::ChangeSaveSet(ChangeSaveSetRequest {
                mode: detail,
                window: Window::new(body.read_u32(0)?),
            }),
            Opcode::ReparentWindow => self.parse_reparent_window(body)?,
            Opcode::MapWindow => Request::MapWindow(window_request(body)?),
            Opcode::MapSubwindows => Request::MapSubwindows(window_request(body)?),
            Opcode::UnmapWindow => Request::UnmapWindow(window_request(body)?),
            Opcode::UnmapSubwindows => Request::UnmapSubwindows(window_request(body)?),
            Opcode::ConfigureWindow => self.parse_configure_window(body)?,
            Opcode::GetGeometry => Request::GetGeometry(GetGeometryRequest {
                drawable: Drawable::new(body.read_u32(0)?),
            }),
            Opcode::QueryTree => Request::QueryTree(window_request(body)?),
            Opcode::InternAtom => self.parse_intern_atom(detail, body)?,
            Opcode::GetAtomName => Request::GetAtomName(GetAtomNameRequest {
                atom: Atom::new(body.read_u32(0)?),
            }),
            Opcode::ChangeProperty => self.parse_change_property(detail, body)?,
            Opcode::DeleteProperty => Request::DeleteProperty(DeletePropertyRequest {
                window: Window::new(body.read_u32(0)?),
                property: Atom::new(body.read_u32(4)?),
            }),
            Opcode::GetProperty => self.parse_get_property(detail, body)?,
            Opcode::ListProperties => Request::ListProperties(window_request(body)?),
            Opcode::SetSelectionOwner => self.parse_set_selection_owner(body)?,
            Opcode::GetSelectionOwner => Request::GetSelectionOwner(GetSelectionOwnerRequest {
                selection: Atom::new(body.read_u32(0)?),
            }),
            Opcode::ConvertSelection => self.parse_convert_selection(body)?,
            Opcode::SendEvent => self.parse_send_event(detail, body)?,
            Opcode::GrabPointer => self.parse_grab_pointer(detail, body)?,
            Opcode::UngrabPointer => Request::UngrabPointer(ungrab_request(body)?),
            Opcode::GrabKeyboard => self.parse_grab_keyboard(detail, body)?,
            Opcode::UngrabKeyboard => Request::UngrabKeyboard(ungrab_request(body)?),
            Opcode::GrabServer => Request::GrabServer,
            Opcode::UngrabServer => Request::UngrabServer,
            Opcode::QueryPointer => Request::QueryPointer(window_request(body)?),
            Opcode::SetInputFocus => Request::SetInputFocus(SetInputFocusRequest {
                revert_to: detail,
                focus: Window::new(body.read_u32(0)?),
                time: Timestamp::new(body.read_u32(4)?),
            }),
            Opcode::GetInputFocus => Request::GetInputFocus,
            Opcode::OpenFont => self.parse_open_font(body)?,
            Opcode::CloseFont => Request::CloseFont(font_request(body)?),
            Opcode::QueryFont => Request::QueryFont(font_request(body)?),
            Opcode::ListFonts => Request::ListFonts(list_fonts_request(body)?),
            Opcode::ListFontsWithInfo => Request::ListFontsWithInfo(list_fonts_request(body)?),
            Opcode::CreatePixmap => self.parse_create_pixmap(detail, body)?,
            Opcode::FreePixmap => Request::FreePixmap(FreePixmapRequest {
                pixmap: Pixmap::new(body.read_u32(0)?),
            }),
            Opcode::CreateGC => self.parse_create_gc(body)?,
            Opcode::ChangeGC => self.parse_change_gc(body)?,
            Opcode::CopyGC => self.parse_copy_gc(body)?,
            Opcode::FreeGC => Request::FreeGC(FreeGCRequest {
                gc: GContext::new(body.read_u32(0)?),
            }),
            Opcode::ClearArea => self.parse_clear_area(detail, body)?,
            Opcode::CopyArea => self.parse_copy_area(body)?,
            Opcode::PolyPoint => Request::PolyPoint(self.parse_poly_point(detail, body)?),
            Opcode::PolyLine => Request::PolyLine(self.parse_poly_point(detail, body)?),
            Opcode::PolySegment => self.parse_poly_segment(body)?,
            Opcode::PolyRectangle => Request::PolyRectangle(self.parse_poly_rectangle(body)?),
            Opcode::PolyArc => Request::PolyArc(self.parse_poly_arc(body)?),
            Opcode::FillPoly => self.parse_fill_poly(body)?,
            Opcode::PolyFillRectangle => {
                Request::PolyFillRectangle(self.parse_poly_rectangle(body)?)
            }
            Opcode::PolyFillArc => Request::PolyFillArc(self.parse_poly_arc(body)?),
            Opcode::PutImage => self.parse_put_image(detail, body)?,
            Opcode::GetImage => self.parse_get_image(detail, body)?,
            Opcode::PolyText8 => Request::PolyText8(self.parse_poly_text(body, 1, |chars| {
                chars.iter().map(|&b| b as char).collect::<String>()
            })?),
            Opcode::PolyText16 => Request::PolyText16(self.parse_poly_text(body, 2, |chars| {
                chars
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect::<Vec<u16>>()
            })?),
            Opcode::ImageText8 => self.parse_image_text8(detail, body)?,
            Opcode::AllocColor => Request::AllocColor(AllocColorRequest {
                colormap: Colormap::new(body.read_u32(0)?),
                color: read_rgb(body, 4)?,
            }),
            Opcode::AllocNamedColor => Request::AllocNamedColor(named_color_request(body)?),
            Opcode::QueryColors => self.parse_query_colors(body)?,
            Opcode::LookupColor => Request::LookupColor(named_color_request(body)?),
            Opcode::CreateGlyphCursor => self.parse_create_glyph_cursor(body)?,
            Opcode::QueryBestSize => Request::QueryBestSize(QueryBestSizeRequest {
                class: detail,
                drawable: Drawable::new(body.read_u32(0)?),
                width: body.read_u16(4)?,
                height: body.read_u16(6)?,
            }),
            Opcode::QueryExtension => {
                let name_len = body.read_u16(0)? as usize;
                Request::QueryExtension(QueryExtensionRequest {
                    name: body.read_string(4, 4 + name_len)?,
                })
            }
            Opcode::ListExtensions => Request::ListExtensions,
            Opcode::GetKeyboardMapping => Request::GetKeyboardMapping(GetKeyboardMappingRequest {
                first_keycode: Keycode(body.read_u8(0)?),
                count: body.read_u8(1)?,
            }),
            Opcode::Bell => Request::Bell(BellRequest {
                percent: detail as i8,
            }),
            Opcode::ChangeHosts => self.parse_change_hosts(detail, body)?,
            Opcode::ListHosts => Request::ListHosts,
            Opcode::SetAccessControl => Request::SetAccessControl(SetAccessControlRequest {
                enabled: detail != 0,
            }),
            Opcode::SetCloseDownMode => Request::SetCloseDownMode(SetCloseDownModeRequest {
                mode: CloseDownMode::from_u8(detail).ok_or(CodecError::InvalidValue {
                    field: "close-down-mode",
                    value: detail as u32,
                })?,
            }),
            Opcode::KillClient => Request::KillClient(KillClientRequest {
                resource: XID::new(body.read_u32(0)?),
            }),
            Opcode::RotateProperties => self.parse_rotate_properties(body)?,
            Opcode::GetModifierMapping => Request::GetModifierMapping,
            Opcode::NoOperation => Request::NoOperation,
            other => {
                log::debug!("No decoder for {} ({})", other, other.code());
                return Err(CodecError::UnsupportedOpcode(header.opcode));
            }
        };

        Ok(request)
    }

    // Request parsers
    fn parse_create_window(&self, depth: u8, body: &Body<'_>) -> Result<Request, CodecError> {
        let class_raw = body.read_u16(18)?;
        let class = WindowClass::from_u16(class_raw).ok_or(CodecError::InvalidValue {
            field: "window-class",
            value: class_raw as u32,
        })?;
        let value_mask = body.read_u32(24)?;

        Ok(Request::CreateWindow(CreateWindowRequest {
            depth,
            wid: Window::new(body.read_u32(0)?),
            parent: Window::new(body.read_u32(4)?),
            x: body.read_i16(8)?,
            y: body.read_i16(10)?,
            width: body.read_u16(12)?,
            height: body.read_u16(14)?,
            border_width: body.read_u16(16)?,
            class,
            visual: VisualID::new(body.read_u32(20)?),
            values: self.values.decode(value_mask, &body.tail(28)?)?,
        }))
    }

    fn parse_change_window_attributes(&self, body: &Body<'_>) -> Result<Request, CodecError> {
        let window = Window::new(body.read_u32(0)?);
        let value_mask = body.read_u32(4)?;
        Ok(Request::ChangeWindowAttributes(
            ChangeWindowAttributesRequest {
                window,
                values: self.values.decode(value_mask, &body.tail(8)?)?,
            },
        ))
    }

    fn parse_reparent_window(&self, body: &Body<'_>) -> Result<Request, CodecError> {
        Ok(Request::ReparentWindow(ReparentWindowRequest {
            window: Window::new(body.read_u32(0)?),
            parent: Window::new(body.read_u32(4)?),
            x: body.read_i16(8)?,
            y: body.read_i16(10)?,
        }))
    }

    fn parse_configure_window(&self, body: &Body<'_>) -> Result<Request, CodecError> {
        let window = Window::new(body.read_u32(0)?);
        // 16-bit mask followed by two unused bytes
        let value_mask = body.read_u16(4)? as u32;
        Ok(Request::ConfigureWindow(ConfigureWindowRequest {
            window,
            values: self.values.decode(value_mask, &body.tail(8)?)?,
        }))
    }

    fn parse_intern_atom(&self, only_if_exists: u8, body: &Body<'_>) -> Result<Request, CodecError> {
        let name_len = body.read_u16(0)? as usize;
        Ok(Request::InternAtom(InternAtomRequest {
            only_if_exists: only_if_exists != 0,
            name: body.read_string(4, 4 + name_len)?,
        }))
    }

    fn parse_change_property(&self, mode: u8, body: &Body<'_>) -> Result<Request, CodecError> {
        let mode = PropertyMode::from_u8(mode).ok_or(CodecError::InvalidValue {
            field: "property-mode",
            value: mode as u32,
        })?;
        let format = body.read_u8(12)?;
        if !matches!(format, 8 | 16 | 32) {
            return Err(CodecError::InvalidValue {
                field: "format",
                value: format as u32,
            });
        }
        let length = body.read_u32(16)?;
        let data_len = (length as usize)
            .checked_mul(format as usize / 8)
            .ok_or(CodecError::InvalidValue {
                field: "property-length",
                value: length,
            })?;

        Ok(Request::ChangeProperty(ChangePropertyRequest {
            mode,
            window: Window::new(body.read_u32(0)?),
            property: Atom::new(body.read_u32(4)?),
            type_: Atom::new(body.read_u32(8)?),
            format,
            length,
            data: body.read_bytes(20, 20 + data_len)?.to_vec(),
        }))
    }

    fn parse_get_property(&self, delete: u8, body: &Body<'_>) -> Result<Request, CodecError> {
        Ok(Request::GetProperty(GetPropertyRequest {
            delete: delete != 0,
            window: Window::new(body.read_u32(0)?),
            property: Atom::new(body.read_u32(4)?),
            type_: Atom::new(body.read_u32(8)?),
            long_offset: body.read_u32(12)?,
            long_length: body.read_u32(16)?,
        }))
    }

    fn parse_set_selection_owner(&self, body: &Body<'_>) -> Result<Request, CodecError> {
        Ok(Request::SetSelectionOwner(SetSelectionOwnerRequest {
            owner: Window::new(body.read_u32(0)?),
            selection: Atom::new(body.read_u32(4)?),
            time: Timestamp::new(body.read_u32(8)?),
        }))
    }

    fn parse_convert_selection(&self, body: &Body<'_>) -> Result<Request, CodecError> {
        Ok(Request::ConvertSelection(ConvertSelectionRequest {
            requestor: Window::new(body.read_u32(0)?),
            selection: Atom::new(body.read_u32(4)?),
            target: Atom::new(body.read_u32(8)?),
            property: Atom::new(body.read_u32(12)?),
            time: Timestamp::new(body.read_u32(16)?),
        }))
    }

    fn parse_send_event(&self, propagate: u8, body: &Body<'_>) -> Result<Request, CodecError> {
        Ok(Request::SendEvent(SendEventRequest {
            propagate: propagate != 0,
            destination: Window::new(body.read_u32(0)?),
            event_mask: body.read_u32(4)?,
            event: body.read_bytes(8, 40)?.to_vec(),
        }))
    }

    fn parse_grab_pointer(&self, owner_events: u8, body: &Body<'_>) -> Result<Request, CodecError> {
        Ok(Request::GrabPointer(GrabPointerRequest {
            owner_events: owner_events != 0,
            grab_window: Window::new(body.read_u32(0)?),
            event_mask: body.read_u16(4)?,
            pointer_mode: body.read_u8(6)?,
            keyboard_mode: body.read_u8(7)?,
            confine_to: Window::new(body.read_u32(8)?),
            cursor: Cursor::new(body.read_u32(12)?),
            time: Timestamp::new(body.read_u32(16)?),
        }))
    }

    fn parse_grab_keyboard(&self, owner_events: u8, body: &Body<'_>) -> Result<Request, CodecError> {
        Ok(Request::GrabKeyboard(GrabKeyboardRequest {
            owner_events: owner_events != 0,
            grab_window: Window::new(body.read_u32(0)?),
            time: Timestamp::new(body.read_u32(4)?),
            pointer_mode: body.read_u8(8)?,
            keyboard_mode: body.read_u8(9)?,
        }))
    }

    fn parse_open_font(&self, body: &Body<'_>) -> Result<Request, CodecError> {
        let fid = Font::new(body.read_u32(0)?);
        let name_len = body.read_u16(4)? as usize;
        Ok(Request::OpenFont(OpenFontRequest {
            fid,
            name: body.read_string(8, 8 + name_len)?,
        }))
    }

    fn parse_create_pixmap(&self, depth: u8, body: &Body<'_>) -> Result<Request, CodecError> {
        Ok(Request::CreatePixmap(CreatePixmapRequest {
            depth,
            pid: Pixmap::new(body.read_u32(0)?),
            drawable: Drawable::new(body.read_u32(4)?),
            width: body.read_u16(8)?,
            height: body.read_u16(10)?,
        }))
    }

    fn parse_create_gc(&self, body: &Body<'_>) -> Result<Request, CodecError> {
        let cid = GContext::new(body.read_u32(0)?);
        let drawable = Drawable::new(body.read_u32(4)?);
        let value_mask = body.read_u32(8)?;
        Ok(Request::CreateGC(CreateGCRequest {
            cid,
            drawable,
            values: self.values.decode(value_mask, &body.tail(12)?)?,
        }))
    }

    fn parse_change_gc(&self, body: &Body<'_>) -> Result<Request, CodecError> {
        let gc = GContext::new(body.read_u32(0)?);
        let value_mask = body.read_u32(4)?;
        Ok(Request::ChangeGC(ChangeGCRequest {
            gc,
            values: self.values.decode(value_mask, &body.tail(8)?)?,
        }))
    }

    fn parse_copy_gc(&self, body: &Body<'_>) -> Result<Request, CodecError> {
        Ok(Request::CopyGC(CopyGCRequest {
            src_gc: GContext::new(body.read_u32(0)?),
            dst_gc: GContext::new(body.read_u32(4)?),
            fields: fields_in_mask(body.read_u32(8)?)?,
        }))
    }

    fn parse_clear_area(&self, exposures: u8, body: &Body<'_>) -> Result<Request, CodecError> {
        Ok(Request::ClearArea(ClearAreaRequest {
            exposures: exposures != 0,
            window: Window::new(body.read_u32(0)?),
            x: body.read_i16(4)?,
            y: body.read_i16(6)?,
            width: body.read_u16(8)?,
            height: body.read_u16(10)?,
        }))
    }

    fn parse_copy_area(&self, body: &Body<'_>) -> Result<Request, CodecError> {
        Ok(Request::CopyArea(CopyAreaRequest {
            src_drawable: Drawable::new(body.read_u32(0)?),
            dst_drawable: Drawable::new(body.read_u32(4)?),
            gc: GContext::new(body.read_u32(8)?),
            src_x: body.read_i16(12)?,
            src_y: body.read_i16(14)?,
            dst_x: body.read_i16(16)?,
            dst_y: body.read_i16(18)?,
            width: body.read_u16(20)?,
            height: body.read_u16(22)?,
        }))
    }

    fn parse_poly_point(&self, mode: u8, body: &Body<'_>) -> Result<PolyPointRequest, CodecError> {
        Ok(PolyPointRequest {
            coordinate_mode: coordinate_mode(mode)?,
            drawable: Drawable::new(body.read_u32(0)?),
            gc: GContext::new(body.read_u32(4)?),
            points: read_list(body, 8, 4, read_point)?,
        })
    }

    fn parse_poly_segment(&self, body: &Body<'_>) -> Result<Request, CodecError> {
        let segments = read_list(body, 8, 8, |body, offset| {
            Ok(Segment {
                x1: body.read_i16(offset)?,
                y1: body.read_i16(offset + 2)?,
                x2: body.read_i16(offset + 4)?,
                y2: body.read_i16(offset + 6)?,
            })
        })?;
        Ok(Request::PolySegment(PolySegmentRequest {
            drawable: Drawable::new(body.read_u32(0)?),
            gc: GContext::new(body.read_u32(4)?),
            segments,
        }))
    }

    fn parse_poly_rectangle(&self, body: &Body<'_>) -> Result<PolyRectangleRequest, CodecError> {
        let rectangles = read_list(body, 8, 8, |body, offset| {
            Ok(Rectangle {
                x: body.read_i16(offset)?,
                y: body.read_i16(offset + 2)?,
                width: body.read_u16(offset + 4)?,
                height: body.read_u16(offset + 6)?,
            })
        })?;
        Ok(PolyRectangleRequest {
            drawable: Drawable::new(body.read_u32(0)?),
            gc: GContext::new(body.read_u32(4)?),
            rectangles,
        })
    }

    fn parse_poly_arc(&self, body: &Body<'_>) -> Result<PolyArcRequest, CodecError> {
        let arcs = read_list(body, 8, 12, |body, offset| {
            Ok(Arc {
                x: body.read_i16(offset)?,
                y: body.read_i16(offset + 2)?,
                width: body.read_u16(offset + 4)?,
                height: body.read_u16(offset + 6)?,
                angle1: body.read_i16(offset + 8)?,
                angle2: body.read_i16(offset + 10)?,
            })
        })?;
        Ok(PolyArcRequest {
            drawable: Drawable::new(body.read_u32(0)?),
            gc: GContext::new(body.read_u32(4)?),
            arcs,
        })
    }

    fn parse_fill_poly(&self, body: &Body<'_>) -> Result<Request, CodecError> {
        Ok(Request::FillPoly(FillPolyRequest {
            drawable: Drawable::new(body.read_u32(0)?),
            gc: GContext::new(body.read_u32(4)?),
            shape: body.read_u8(8)?,
            coordinate_mode: coordinate_mode(body.read_u8(9)?)?,
            // Skip 2 unused bytes after coordinate-mode
            points: read_list(body, 12, 4, read_point)?,
        }))
    }

    fn parse_put_image(&self, format: u8, body: &Body<'_>) -> Result<Request, CodecError> {
        Ok(Request::PutImage(PutImageRequest {
            format: image_format(format)?,
            drawable: Drawable::new(body.read_u32(0)?),
            gc: GContext::new(body.read_u32(4)?),
            width: body.read_u16(8)?,
            height: body.read_u16(10)?,
            dst_x: body.read_i16(12)?,
            dst_y: body.read_i16(14)?,
            left_pad: body.read_u8(16)?,
            depth: body.read_u8(17)?,
            data: body.read_bytes(20, body.len())?.to_vec(),
        }))
    }

    fn parse_get_image(&self, format: u8, body: &Body<'_>) -> Result<Request, CodecError> {
        Ok(Request::GetImage(GetImageRequest {
            format: image_format(format)?,
            drawable: Drawable::new(body.read_u32(0)?),
            x: body.read_i16(4)?,
            y: body.read_i16(6)?,
            width: body.read_u16(8)?,
            height: body.read_u16(10)?,
            plane_mask: body.read_u32(12)?,
        }))
    }

    /// Text items start at body offset 12. Each is a length byte, a signed
    /// delta and `len` characters of `char_width` bytes; a length of 255 is
    /// a font shift carrying a font id, most significant byte first. A zero
    /// length or a truncated item ends the list. Every item starts on a
    /// 4-byte boundary.
    fn parse_poly_text<T>(
        &self,
        body: &Body<'_>,
        char_width: usize,
        decode_chars: impl Fn(&[u8]) -> T,
    ) -> Result<PolyTextRequest<T>, CodecError> {
        let mut items = Vec::new();
        let mut offset = 12;

        while offset < body.len() {
            let len = body.read_u8(offset)? as usize;
            if len == 0 {
                break;
            }
            if len == 255 {
                let Ok(font) = body.read_bytes(offset + 1, offset + 5) else {
                    break;
                };
                let font = u32::from_be_bytes([font[0], font[1], font[2], font[3]]);
                items.push(TextItem::FontShift(Font::new(font)));
                offset = padded_len(offset + 5);
                continue;
            }

            let end = offset + 2 + len * char_width;
            if end > body.len() {
                break;
            }
            items.push(TextItem::Text {
                delta: body.read_i8(offset + 1)?,
                text: decode_chars(body.read_bytes(offset + 2, end)?),
            });
            offset = padded_len(end);
        }

        Ok(PolyTextRequest {
            drawable: Drawable::new(body.read_u32(0)?),
            gc: GContext::new(body.read_u32(4)?),
            x: body.read_i16(8)?,
            y: body.read_i16(10)?,
            items,
        })
    }

    fn parse_image_text8(&self, string_len: u8, body: &Body<'_>) -> Result<Request, CodecError> {
        Ok(Request::ImageText8(ImageText8Request {
            drawable: Drawable::new(body.read_u32(0)?),
            gc: GContext::new(body.read_u32(4)?),
            x: body.read_i16(8)?,
            y: body.read_i16(10)?,
            string: body.read_string(12, 12 + string_len as usize)?,
        }))
    }

    fn parse_query_colors(&self, body: &Body<'_>) -> Result<Request, CodecError> {
        Ok(Request::QueryColors(QueryColorsRequest {
            colormap: Colormap::new(body.read_u32(0)?),
            pixels: read_list(body, 4, 4, |body, offset| body.read_u32(offset))?,
        }))
    }

    fn parse_create_glyph_cursor(&self, body: &Body<'_>) -> Result<Request, CodecError> {
        Ok(Request::CreateGlyphCursor(CreateGlyphCursorRequest {
            cid: Cursor::new(body.read_u32(0)?),
            source_font: Font::new(body.read_u32(4)?),
            mask_font: Font::new(body.read_u32(8)?),
            source_char: body.read_u16(12)?,
            mask_char: body.read_u16(14)?,
            fore: read_rgb(body, 16)?,
            back: read_rgb(body, 22)?,
        }))
    }

    fn parse_change_hosts(&self, mode: u8, body: &Body<'_>) -> Result<Request, CodecError> {
        let family_raw = body.read_u8(0)?;
        let family = HostFamily::from_u8(family_raw).ok_or(CodecError::InvalidValue {
            field: "host-family",
            value: family_raw as u32,
        })?;
        let address_len = body.read_u16(2)? as usize;
        Ok(Request::ChangeHosts(ChangeHostsRequest {
            mode,
            host: HostAddress {
                family,
                address: body.read_bytes(4, 4 + address_len)?.to_vec(),
            },
        }))
    }

    fn parse_rotate_properties(&self, body: &Body<'_>) -> Result<Request, CodecError> {
        let count = body.read_u16(4)? as usize;
        let properties = (0..count)
            .map(|i| body.read_u32(8 + i * 4).map(Atom::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Request::RotateProperties(RotatePropertiesRequest {
            window: Window::new(body.read_u32(0)?),
            delta: body.read_i16(6)?,
            properties,
        }))
    }
}

fn window_request(body: &Body<'_>) -> Result<WindowRequest, CodecError> {
    Ok(WindowRequest {
        window: Window::new(body.read_u32(0)?),
    })
}

fn font_request(body: &Body<'_>) -> Result<FontRequest, CodecError> {
    Ok(FontRequest {
        font: Font::new(body.read_u32(0)?),
    })
}

fn ungrab_request(body: &Body<'_>) -> Result<UngrabRequest, CodecError> {
    Ok(UngrabRequest {
        time: Timestamp::new(body.read_u32(0)?),
    })
}

fn list_fonts_request(body: &Body<'_>) -> Result<ListFontsRequest, CodecError> {
    let pattern_len = body.read_u16(2)? as usize;
    Ok(ListFontsRequest {
        max_names: body.read_u16(0)?,
        pattern: body.read_string(4, 4 + pattern_len)?,
    })
}

fn named_color_request(body: &Body<'_>) -> Result<NamedColorRequest, CodecError> {
    let name_len = body.read_u16(4)? as usize;
    Ok(NamedColorRequest {
        colormap: Colormap::new(body.read_u32(0)?),
        name: body.read_string(8, 8 + name_len)?,
    })
}

fn coordinate_mode(value: u8) -> Result<CoordinateMode, CodecError> {
    CoordinateMode::from_u8(value).ok_or(CodecError::InvalidValue {
        field: "coordinate-mode",
        value: value as u32,
    })
}

fn image_format(value: u8) -> Result<ImageFormat, CodecError> {
    ImageFormat::from_u8(value).ok_or(CodecError::InvalidValue {
        field: "image-format",
        value: value as u32,
    })
}

fn read_point(body: &Body<'_>, offset: usize) -> Result<Point, CodecError> {
    Ok(Point::new(body.read_i16(offset)?, body.read_i16(offset + 2)?))
}

fn read_rgb(body: &Body<'_>, offset: usize) -> Result<Rgb, CodecError> {
    Ok(Rgb {
        red: body.read_u16(offset)?,
        green: body.read_u16(offset + 2)?,
        blue: body.read_u16(offset + 4)?,
    })
}

/// Fixed-size elements from `start` to the end of the body. The count comes
/// from the declared record length; a trailing partial element is ignored.
fn read_list<T>(
    body: &Body<'_>,
    start: usize,
    width: usize,
    read: impl Fn(&Body<'_>, usize) -> Result<T, CodecError>,
) -> Result<Vec<T>, CodecError> {
    let count = body.len().saturating_sub(start) / width;
    (0..count)
        .map(|i| read(body, start + i * width))
        .collect()
}
