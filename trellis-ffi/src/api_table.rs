use std::ffi::c_char;

use crate::callbacks::*;
use crate::handles::*;

/// Version of the table layout below. Bumped on any breaking change.
pub const TRELLIS_API_VERSION: u32 = 1;

/// Name of the symbol a native library exports to hand out its table.
/// Signature: `extern "C" fn() -> *const TrellisApiTable`.
pub const TRELLIS_API_TABLE_SYMBOL: &[u8] = b"trellis_api_table\0";

// ---------------------------------------------------------------------------
// Main API table
// ---------------------------------------------------------------------------

/// The top-level table exposed by the native surface.
/// One fixed sub-table per concern; every sub-table pointer must be non-null.
#[repr(C)]
pub struct TrellisApiTable {
    pub version: u32,

    pub app: *const TrellisAppApi,
    pub div: *const TrellisDivApi,
    pub svg: *const TrellisSvgApi,
    pub element: *const TrellisElementApi,
    pub logging: *const TrellisLoggingApi,
}

unsafe impl Send for TrellisApiTable {}
unsafe impl Sync for TrellisApiTable {}

impl TrellisApiTable {
    /// True when every sub-table pointer is set.
    pub fn is_complete(&self) -> bool {
        !self.app.is_null()
            && !self.div.is_null()
            && !self.svg.is_null()
            && !self.element.is_null()
            && !self.logging.is_null()
    }
}

// ---------------------------------------------------------------------------
// TrellisAppApi
// ---------------------------------------------------------------------------

#[repr(C)]
pub struct TrellisAppApi {
    /// Start the application. Blocks until the native run loop exits.
    /// `on_init` is called exactly once with the application handle.
    pub run_app: unsafe extern "C" fn(on_init: RunTrampoline, callback_id: u64),

    /// Open a window. Returns immediately; `build` is called on every
    /// build/redraw cycle for as long as the window lives, and `release`
    /// once the window is gone. `title` is only valid for the call.
    pub open_window: unsafe extern "C" fn(
        app: AppHandle,
        title: *const c_char,
        build: ViewBuilderTrampoline,
        release: ReleaseTrampoline,
        callback_id: u64,
    ),
}

// ---------------------------------------------------------------------------
// TrellisDivApi
// ---------------------------------------------------------------------------

#[repr(C)]
pub struct TrellisDivApi {
    /// Returns null if the node cannot be allocated.
    pub create: unsafe extern "C" fn() -> DivHandle,

    // -- Layout --
    pub flex: unsafe extern "C" fn(div: DivHandle),
    /// `direction`: [`FlexDirection`](crate::FlexDirection) ordinal.
    pub flex_direction: unsafe extern "C" fn(div: DivHandle, direction: u8),
    pub size_full: unsafe extern "C" fn(div: DivHandle),
    pub w: unsafe extern "C" fn(div: DivHandle, px: f32),
    pub h: unsafe extern "C" fn(div: DivHandle, px: f32),
    pub size: unsafe extern "C" fn(div: DivHandle, px: f32),
    pub p: unsafe extern "C" fn(div: DivHandle, px: f32),
    pub m: unsafe extern "C" fn(div: DivHandle, px: f32),
    pub gap: unsafe extern "C" fn(div: DivHandle, px: f32),
    pub top: unsafe extern "C" fn(div: DivHandle, px: f32),
    pub left: unsafe extern "C" fn(div: DivHandle, px: f32),
    /// `position`: [`Position`](crate::Position) ordinal.
    pub position: unsafe extern "C" fn(div: DivHandle, position: u8),
    /// `mode`: [`JustifyContent`](crate::JustifyContent) ordinal.
    pub justify: unsafe extern "C" fn(div: DivHandle, mode: u8),
    /// `mode`: [`AlignItems`](crate::AlignItems) ordinal.
    pub items: unsafe extern "C" fn(div: DivHandle, mode: u8),
    pub overflow_hidden: unsafe extern "C" fn(div: DivHandle, hidden: bool),

    // -- Color (0xRRGGBB) --
    pub bg: unsafe extern "C" fn(div: DivHandle, rgb: u32),
    pub text_color: unsafe extern "C" fn(div: DivHandle, rgb: u32),

    // -- Text styling --
    pub text_size: unsafe extern "C" fn(div: DivHandle, px: f32),
    pub line_height: unsafe extern "C" fn(div: DivHandle, px: f32),
    pub font_weight: unsafe extern "C" fn(div: DivHandle, weight: f32),
    /// `family` is NUL-terminated and only valid for the call.
    pub font_family: unsafe extern "C" fn(div: DivHandle, family: *const c_char),

    // -- Composition --
    /// Insert a text leaf. `text` is NUL-terminated and only valid for the call.
    pub child_text: unsafe extern "C" fn(div: DivHandle, text: *const c_char),
    /// Insert a sealed child. Takes ownership of `child`.
    pub child: unsafe extern "C" fn(div: DivHandle, child: ElementHandle),

    /// Seal the builder. Consumes `div`; returns null if it was already consumed.
    pub into_element: unsafe extern "C" fn(div: DivHandle) -> ElementHandle,

    /// Free a builder that will never be sealed. Null if the native side
    /// reclaims abandoned builders on its own.
    pub discard: Option<unsafe extern "C" fn(div: DivHandle)>,
}

// ---------------------------------------------------------------------------
// TrellisSvgApi
// ---------------------------------------------------------------------------

#[repr(C)]
pub struct TrellisSvgApi {
    pub create: unsafe extern "C" fn() -> SvgHandle,

    /// SVG source. `data` is NUL-terminated and only valid for the call.
    pub path: unsafe extern "C" fn(svg: SvgHandle, data: *const c_char),
    pub size: unsafe extern "C" fn(svg: SvgHandle, px: f32),
    pub text_color: unsafe extern "C" fn(svg: SvgHandle, rgb: u32),
    pub rotate: unsafe extern "C" fn(svg: SvgHandle, turns: f32),

    /// Attach a per-frame animation. `tick` is called on every frame with a
    /// fresh handle to the animated element; `release` once the element is
    /// gone. After this call `svg` may only be sealed.
    pub with_animation: unsafe extern "C" fn(
        svg: SvgHandle,
        id: *const c_char,
        duration_secs: f32,
        repeat: bool,
        tick: AnimationTickTrampoline,
        release: ReleaseTrampoline,
        callback_id: u64,
    ),

    /// Seal the builder (animated or not). Consumes `svg`.
    pub into_element: unsafe extern "C" fn(svg: SvgHandle) -> ElementHandle,

    pub discard: Option<unsafe extern "C" fn(svg: SvgHandle)>,
}

// ---------------------------------------------------------------------------
// TrellisElementApi
// ---------------------------------------------------------------------------

#[repr(C)]
pub struct TrellisElementApi {
    /// Create a standalone sealed text element. `text` is only valid for the call.
    pub create_text: unsafe extern "C" fn(text: *const c_char) -> ElementHandle,

    /// Free a sealed element that was never attached or returned.
    pub discard: Option<unsafe extern "C" fn(element: ElementHandle)>,
}

// ---------------------------------------------------------------------------
// TrellisLoggingApi
// ---------------------------------------------------------------------------

#[repr(C)]
pub struct TrellisLoggingApi {
    /// `level`: 0=Display, 1=Warning, 2=Error.
    /// `msg` is a UTF-8 byte slice (not null-terminated).
    pub log: unsafe extern "C" fn(level: u8, msg: *const u8, msg_len: u32),
}
