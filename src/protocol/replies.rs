//! X11 protocol replies
//!
//! One variant per reply-producing request. The host builds these; the
//! encoder turns them into bytes.

use super::opcodes::Opcode;
use super::types::*;

/// Structured reply payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    GetWindowAttributes(GetWindowAttributesReply),
    GetGeometry(GetGeometryReply),
    QueryTree(QueryTreeReply),
    InternAtom(InternAtomReply),
    GetAtomName(GetAtomNameReply),
    GetProperty(GetPropertyReply),
    ListProperties(ListPropertiesReply),
    GetSelectionOwner(GetSelectionOwnerReply),
    QueryPointer(QueryPointerReply),
    GetInputFocus(GetInputFocusReply),
    QueryFont(QueryFontReply),
    ListFonts(ListFontsReply),
    ListFontsWithInfo(ListFontsWithInfoReply),
    GetImage(GetImageReply),
    AllocColor(AllocColorReply),
    AllocNamedColor(AllocNamedColorReply),
    QueryColors(QueryColorsReply),
    LookupColor(LookupColorReply),
    QueryBestSize(QueryBestSizeReply),
    QueryExtension(QueryExtensionReply),
    ListExtensions(ListExtensionsReply),
    GetKeyboardMapping(GetKeyboardMappingReply),
    ListHosts(ListHostsReply),
    GetModifierMapping(GetModifierMappingReply),
}

impl Reply {
    /// The request this reply answers
    pub fn opcode(&self) -> Opcode {
        match self {
            Reply::GetWindowAttributes(_) => Opcode::GetWindowAttributes,
            Reply::GetGeometry(_) => Opcode::GetGeometry,
            Reply::QueryTree(_) => Opcode::QueryTree,
            Reply::InternAtom(_) => Opcode::InternAtom,
            Reply::GetAtomName(_) => Opcode::GetAtomName,
            Reply::GetProperty(_) => Opcode::GetProperty,
            Reply::ListProperties(_) => Opcode::ListProperties,
            Reply::GetSelectionOwner(_) => Opcode::GetSelectionOwner,
            Reply::QueryPointer(_) => Opcode::QueryPointer,
            Reply::GetInputFocus(_) => Opcode::GetInputFocus,
            Reply::QueryFont(_) => Opcode::QueryFont,
            Reply::ListFonts(_) => Opcode::ListFonts,
            Reply::ListFontsWithInfo(_) => Opcode::ListFontsWithInfo,
            Reply::GetImage(_) => Opcode::GetImage,
            Reply::AllocColor(_) => Opcode::AllocColor,
            Reply::AllocNamedColor(_) => Opcode::AllocNamedColor,
            Reply::QueryColors(_) => Opcode::QueryColors,
            Reply::LookupColor(_) => Opcode::LookupColor,
            Reply::QueryBestSize(_) => Opcode::QueryBestSize,
            Reply::QueryExtension(_) => Opcode::QueryExtension,
            Reply::ListExtensions(_) => Opcode::ListExtensions,
            Reply::GetKeyboardMapping(_) => Opcode::GetKeyboardMapping,
            Reply::ListHosts(_) => Opcode::ListHosts,
            Reply::GetModifierMapping(_) => Opcode::GetModifierMapping,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetWindowAttributesReply {
    pub backing_store: u8,
    pub visual: VisualID,
    pub class: WindowClass,
    pub bit_gravity: u8,
    pub win_gravity: u8,
    pub backing_planes: u32,
    pub backing_pixel: u32,
    pub save_under: bool,
    pub map_is_installed: bool,
    pub map_state: MapState,
    pub override_redirect: bool,
    pub colormap: Colormap,
    pub all_event_masks: u32,
    pub your_event_mask: u32,
    pub do_not_propagate_mask: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetGeometryReply {
    pub depth: u8,
    pub root: Window,
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub border_width: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTreeReply {
    pub root: Window,
    pub parent: Window,
    pub children: Vec<Window>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternAtomReply {
    pub atom: Atom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetAtomNameReply {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetPropertyReply {
    /// 0 when the property does not exist, else 8, 16 or 32
    pub format: u8,
    pub type_: Atom,
    pub bytes_after: u32,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPropertiesReply {
    pub atoms: Vec<Atom>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetSelectionOwnerReply {
    pub owner: Window,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPointerReply {
    pub same_screen: bool,
    pub root: Window,
    pub child: Window,
    pub root_x: i16,
    pub root_y: i16,
    pub win_x: i16,
    pub win_y: i16,
    pub mask: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetInputFocusReply {
    pub revert_to: u8,
    pub focus: Window,
}

/// Per-glyph metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharInfo {
    pub left_side_bearing: i16,
    pub right_side_bearing: i16,
    pub character_width: i16,
    pub ascent: i16,
    pub descent: i16,
    pub attributes: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontProp {
    pub name: Atom,
    pub value: u32,
}

/// Font metrics shared by QueryFont and ListFontsWithInfo
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FontInfo {
    pub min_bounds: CharInfo,
    pub max_bounds: CharInfo,
    pub min_char_or_byte2: u16,
    pub max_char_or_byte2: u16,
    pub default_char: u16,
    /// 0 left-to-right, 1 right-to-left
    pub draw_direction: u8,
    pub min_byte1: u8,
    pub max_byte1: u8,
    pub all_chars_exist: bool,
    pub font_ascent: i16,
    pub font_descent: i16,
    pub properties: Vec<FontProp>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFontReply {
    pub info: FontInfo,
    pub char_infos: Vec<CharInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFontsReply {
    pub names: Vec<String>,
}

/// One reply of a ListFontsWithInfo series. The series ends with
/// `ListFontsWithInfoReply::last()`, whose name is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListFontsWithInfoReply {
    pub name: String,
    pub info: FontInfo,
    /// Number of replies still to come, a hint only
    pub replies_hint: u32,
}

impl ListFontsWithInfoReply {
    /// The zero-filled reply that terminates the series
    pub fn last() -> Self {
        ListFontsWithInfoReply::default()
    }

    pub fn is_last(&self) -> bool {
        self.name.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetImageReply {
    pub depth: u8,
    pub visual: VisualID,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocColorReply {
    /// The color actually allocated
    pub color: Rgb,
    pub pixel: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocNamedColorReply {
    pub pixel: u32,
    pub exact: Rgb,
    pub visual: Rgb,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryColorsReply {
    pub colors: Vec<Rgb>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupColorReply {
    pub exact: Rgb,
    pub visual: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryBestSizeReply {
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryExtensionReply {
    pub present: bool,
    pub major_opcode: u8,
    pub first_event: u8,
    pub first_error: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListExtensionsReply {
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetKeyboardMappingReply {
    pub keysyms_per_keycode: u8,
    /// `keysyms_per_keycode` entries for each keycode requested
    pub keysyms: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListHostsReply {
    /// Access control on or off
    pub enabled: bool,
    pub hosts: Vec<HostAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetModifierMappingReply {
    /// Eight rows (Shift, Lock, Control, Mod1-Mod5), same width each
    pub keycodes: Vec<Keycode>,
}
