// trellis-runtime: Safe Rust API wrapping trellis-ffi.
// All unsafe FFI calls are confined to this crate. User code interacts only
// with the builder, element, and bootstrap types exported here.

pub mod api;
pub mod error;
pub mod logging;
pub mod ffi_guard;
pub mod cstr;
pub mod style;
pub mod element;
pub mod div;
pub mod svg;
pub mod assets;
pub mod callback_registry;
pub mod trampolines;
pub mod app;
pub mod views;
#[cfg(feature = "dynamic")]
pub mod loader;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

use std::sync::{Mutex, MutexGuard};

// Re-export the primary public API surface.
pub use api::{api, init_api, is_api_initialized, try_api};
pub use error::{TrellisError, TrellisResult};
pub use logging::{set_min_level, LOG_DISPLAY, LOG_WARNING, LOG_ERROR};
pub use ffi_guard::ffi_boundary;
pub use style::{rgb, Rgb};
pub use element::{text, try_text, Child, Element, IntoElement};
pub use div::{div, Div};
pub use svg::{svg, Animation, AnimatedSvg, Svg, SvgFrame};
pub use assets::{set_asset_source, AssetSource, FileAssets, InlineAssets};
pub use callback_registry::{CallbackId, CallbackKind, InvocationClass};
pub use app::{run, App, WindowId};
pub use views::ViewEntry;

// Re-export FFI types that appear in the public API.
pub use trellis_ffi::{
    AlignItems, AppHandle, DivHandle, ElementHandle, FlexDirection, JustifyContent, Position,
    SvgHandle, TrellisApiTable, TRELLIS_API_VERSION,
};

/// Lock a mutex, recovering the data if a previous holder panicked.
///
/// Callback bodies run under `catch_unwind`, so a poisoned lock only means a
/// panic was already reported; the protected maps stay consistent.
pub(crate) fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
