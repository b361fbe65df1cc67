//! X11 protocol requests
//!
//! A decoded record is a `RequestHeader` (the 4-byte wire header plus the
//! sequence number the connection assigned) and a `Request` payload.

use super::opcodes::Opcode;
use super::types::*;
use super::values::{ConfigureField, GcAttribute, ValueList, WindowAttribute};
use super::view::BinaryView;
use crate::error::CodecError;

/// Size of the fixed request header
pub const HEADER_LEN: usize = 4;

/// Request header (common to all requests)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub opcode: u8,
    /// Opcode-specific byte at offset 1
    pub data_byte: u8,
    /// Declared length in 4-byte units, header included
    pub length_quads: u16,
    pub sequence: u32,
}

impl RequestHeader {
    /// Parse the 4-byte header at the start of `view`
    pub fn parse(view: &BinaryView<&[u8]>, sequence: u32) -> Result<Self, CodecError> {
        Ok(RequestHeader {
            opcode: view.read_u8(0)?,
            data_byte: view.read_u8(1)?,
            length_quads: view.read_u16(2)?,
            sequence,
        })
    }

    /// Total record size in bytes
    pub fn byte_len(&self) -> usize {
        self.length_quads as usize * 4
    }

    pub fn known_opcode(&self) -> Option<Opcode> {
        Opcode::from_u8(self.opcode)
    }
}

/// A record as handed to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub header: RequestHeader,
    pub request: Request,
}

impl Record {
    pub fn sequence(&self) -> u32 {
        self.header.sequence
    }
}

/// Why a record was not decoded into a specific variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericReason {
    /// Opcode is not in the core protocol registry
    Unknown,
    /// Opcode is registered but has no decoder
    Unsupported,
    /// The body did not match the opcode's layout
    Undecodable,
}

/// Parsed X11 request
#[allow(clippy::enum_variant_names)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    CreateWindow(CreateWindowRequest),
    ChangeWindowAttributes(ChangeWindowAttributesRequest),
    GetWindowAttributes(WindowRequest),
    DestroyWindow(WindowRequest),
    DestroySubwindows(WindowRequest),
    ChangeSaveSet(ChangeSaveSetRequest),
    ReparentWindow(ReparentWindowRequest),
    MapWindow(WindowRequest),
    MapSubwindows(WindowRequest),
    UnmapWindow(WindowRequest),
    UnmapSubwindows(WindowRequest),
    ConfigureWindow(ConfigureWindowRequest),
    GetGeometry(GetGeometryRequest),
    QueryTree(WindowRequest),
    InternAtom(InternAtomRequest),
    GetAtomName(GetAtomNameRequest),
    ChangeProperty(ChangePropertyRequest),
    DeleteProperty(DeletePropertyRequest),
    GetProperty(GetPropertyRequest),
    ListProperties(WindowRequest),
    SetSelectionOwner(SetSelectionOwnerRequest),
    GetSelectionOwner(GetSelectionOwnerRequest),
    ConvertSelection(ConvertSelectionRequest),
    SendEvent(SendEventRequest),
    GrabPointer(GrabPointerRequest),
    UngrabPointer(UngrabRequest),
    GrabKeyboard(GrabKeyboardRequest),
    UngrabKeyboard(UngrabRequest),
    GrabServer,
    UngrabServer,
    QueryPointer(WindowRequest),
    SetInputFocus(SetInputFocusRequest),
    GetInputFocus,
    OpenFont(OpenFontRequest),
    CloseFont(FontRequest),
    QueryFont(FontRequest),
    ListFonts(ListFontsRequest),
    ListFontsWithInfo(ListFontsRequest),
    CreatePixmap(CreatePixmapRequest),
    FreePixmap(FreePixmapRequest),
    CreateGC(CreateGCRequest),
    ChangeGC(ChangeGCRequest),
    CopyGC(CopyGCRequest),
    FreeGC(FreeGCRequest),
    ClearArea(ClearAreaRequest),
    CopyArea(CopyAreaRequest),
    PolyPoint(PolyPointRequest),
    PolyLine(PolyPointRequest),
    PolySegment(PolySegmentRequest),
    PolyRectangle(PolyRectangleRequest),
    PolyArc(PolyArcRequest),
    FillPoly(FillPolyRequest),
    PolyFillRectangle(PolyRectangleRequest),
    PolyFillArc(PolyArcRequest),
    PutImage(PutImageRequest),
    GetImage(GetImageRequest),
    PolyText8(PolyTextRequest<String>),
    PolyText16(PolyTextRequest<Vec<u16>>),
    ImageText8(ImageText8Request),
    AllocColor(AllocColorRequest),
    AllocNamedColor(NamedColorRequest),
    QueryColors(QueryColorsRequest),
    LookupColor(NamedColorRequest),
    CreateGlyphCursor(CreateGlyphCursorRequest),
    QueryBestSize(QueryBestSizeRequest),
    QueryExtension(QueryExtensionRequest),
    ListExtensions,
    GetKeyboardMapping(GetKeyboardMappingRequest),
    Bell(BellRequest),
    ChangeHosts(ChangeHostsRequest),
    ListHosts,
    SetAccessControl(SetAccessControlRequest),
    SetCloseDownMode(SetCloseDownModeRequest),
    KillClient(KillClientRequest),
    RotateProperties(RotatePropertiesRequest),
    GetModifierMapping,
    NoOperation,
    /// A record whose payload was not decoded; the header still carries
    /// the opcode, data byte and declared length.
    Generic { reason: GenericReason },
}

impl Request {
    pub fn is_generic(&self) -> bool {
        matches!(self, Request::Generic { .. })
    }
}

/// Requests that only name a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRequest {
    pub window: Window,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateWindowRequest {
    pub depth: u8,
    pub wid: Window,
    pub parent: Window,
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub border_width: u16,
    pub class: WindowClass,
    pub visual: VisualID,
    pub values: ValueList<WindowAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeWindowAttributesRequest {
    pub window: Window,
    pub values: ValueList<WindowAttribute>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeSaveSetRequest {
    /// 0 inserts, 1 deletes
    pub mode: u8,
    pub window: Window,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReparentWindowRequest {
    pub window: Window,
    pub parent: Window,
    pub x: i16,
    pub y: i16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigureWindowRequest {
    pub window: Window,
    pub values: ValueList<ConfigureField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetGeometryRequest {
    pub drawable: Drawable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternAtomRequest {
    pub only_if_exists: bool,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetAtomNameRequest {
    pub atom: Atom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangePropertyRequest {
    pub mode: PropertyMode,
    pub window: Window,
    pub property: Atom,
    pub type_: Atom,
    /// Bits per unit: 8, 16 or 32
    pub format: u8,
    /// Number of units, not bytes
    pub length: u32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletePropertyRequest {
    pub window: Window,
    pub property: Atom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetPropertyRequest {
    pub delete: bool,
    pub window: Window,
    pub property: Atom,
    pub type_: Atom,
    pub long_offset: u32,
    pub long_length: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetSelectionOwnerRequest {
    pub owner: Window,
    pub selection: Atom,
    pub time: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetSelectionOwnerRequest {
    pub selection: Atom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertSelectionRequest {
    pub requestor: Window,
    pub selection: Atom,
    pub target: Atom,
    pub property: Atom,
    pub time: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendEventRequest {
    pub propagate: bool,
    pub destination: Window,
    pub event_mask: u32,
    /// The 32-byte event, undecoded
    pub event: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrabPointerRequest {
    pub owner_events: bool,
    pub grab_window: Window,
    pub event_mask: u16,
    pub pointer_mode: u8,
    pub keyboard_mode: u8,
    pub confine_to: Window,
    pub cursor: Cursor,
    pub time: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrabKeyboardRequest {
    pub owner_events: bool,
    pub grab_window: Window,
    pub time: Timestamp,
    pub pointer_mode: u8,
    pub keyboard_mode: u8,
}

/// UngrabPointer / UngrabKeyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UngrabRequest {
    pub time: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetInputFocusRequest {
    pub revert_to: u8,
    pub focus: Window,
    pub time: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenFontRequest {
    pub fid: Font,
    pub name: String,
}

/// CloseFont / QueryFont
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontRequest {
    pub font: Font,
}

/// ListFonts / ListFontsWithInfo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFontsRequest {
    pub max_names: u16,
    pub pattern: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatePixmapRequest {
    pub depth: u8,
    pub pid: Pixmap,
    pub drawable: Drawable,
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreePixmapRequest {
    pub pixmap: Pixmap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGCRequest {
    pub cid: GContext,
    pub drawable: Drawable,
    pub values: ValueList<GcAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeGCRequest {
    pub gc: GContext,
    pub values: ValueList<GcAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyGCRequest {
    pub src_gc: GContext,
    pub dst_gc: GContext,
    /// Components to copy, in bit order
    pub fields: Vec<GcAttribute>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeGCRequest {
    pub gc: GContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearAreaRequest {
    pub exposures: bool,
    pub window: Window,
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyAreaRequest {
    pub src_drawable: Drawable,
    pub dst_drawable: Drawable,
    pub gc: GContext,
    pub src_x: i16,
    pub src_y: i16,
    pub dst_x: i16,
    pub dst_y: i16,
    pub width: u16,
    pub height: u16,
}

/// PolyPoint / PolyLine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolyPointRequest {
    pub coordinate_mode: CoordinateMode,
    pub drawable: Drawable,
    pub gc: GContext,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolySegmentRequest {
    pub drawable: Drawable,
    pub gc: GContext,
    pub segments: Vec<Segment>,
}

/// PolyRectangle / PolyFillRectangle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolyRectangleRequest {
    pub drawable: Drawable,
    pub gc: GContext,
    pub rectangles: Vec<Rectangle>,
}

/// PolyArc / PolyFillArc
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolyArcRequest {
    pub drawable: Drawable,
    pub gc: GContext,
    pub arcs: Vec<Arc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillPolyRequest {
    pub drawable: Drawable,
    pub gc: GContext,
    pub shape: u8,
    pub coordinate_mode: CoordinateMode,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutImageRequest {
    pub format: ImageFormat,
    pub drawable: Drawable,
    pub gc: GContext,
    pub width: u16,
    pub height: u16,
    pub dst_x: i16,
    pub dst_y: i16,
    pub left_pad: u8,
    pub depth: u8,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetImageRequest {
    pub format: ImageFormat,
    pub drawable: Drawable,
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub plane_mask: u32,
}

/// One item of a PolyText8/PolyText16 list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextItem<T> {
    Text { delta: i8, text: T },
    /// Switch to another font for the following items
    FontShift(Font),
}

/// PolyText8 (`T = String`) / PolyText16 (`T = Vec<u16>`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolyTextRequest<T> {
    pub drawable: Drawable,
    pub gc: GContext,
    pub x: i16,
    pub y: i16,
    pub items: Vec<TextItem<T>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageText8Request {
    pub drawable: Drawable,
    pub gc: GContext,
    pub x: i16,
    pub y: i16,
    pub string: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocColorRequest {
    pub colormap: Colormap,
    pub color: Rgb,
}

/// AllocNamedColor / LookupColor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedColorRequest {
    pub colormap: Colormap,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryColorsRequest {
    pub colormap: Colormap,
    pub pixels: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateGlyphCursorRequest {
    pub cid: Cursor,
    pub source_font: Font,
    pub mask_font: Font,
    pub source_char: u16,
    pub mask_char: u16,
    pub fore: Rgb,
    pub back: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryBestSizeRequest {
    /// 0 cursor, 1 tile, 2 stipple
    pub class: u8,
    pub drawable: Drawable,
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryExtensionRequest {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetKeyboardMappingRequest {
    pub first_keycode: Keycode,
    pub count: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BellRequest {
    pub percent: i8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeHostsRequest {
    /// 0 inserts, 1 deletes
    pub mode: u8,
    pub host: HostAddress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetAccessControlRequest {
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCloseDownModeRequest {
    pub mode: CloseDownMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KillClientRequest {
    pub resource: XID,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotatePropertiesRequest {
    pub window: Window,
    pub delta: i16,
    pub properties: Vec<Atom>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_parse() {
        let bytes = [55u8, 0, 4, 0];
        let view = BinaryView::new(&bytes[..], ByteOrder::LSBFirst);
        let header = RequestHeader::parse(&view, 9).unwrap();
        assert_eq!(header.opcode, 55);
        assert_eq!(header.length_quads, 4);
        assert_eq!(header.byte_len(), 16);
        assert_eq!(header.sequence, 9);
        assert_eq!(header.known_opcode(), Some(Opcode::CreateGC));

        let view = BinaryView::new(&bytes[..], ByteOrder::MSBFirst);
        assert_eq!(RequestHeader::parse(&view, 1).unwrap().length_quads, 0x0400);
    }

    #[test]
    fn test_short_header() {
        let bytes = [1u8, 0, 4];
        let view = BinaryView::new(&bytes[..], ByteOrder::LSBFirst);
        assert!(RequestHeader::parse(&view, 1).is_err());
    }
}
