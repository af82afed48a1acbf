// Trampoline signatures: native -> Rust entry points.
//
// Every callback-accepting native call receives one of these function pointers
// plus a `callback_id`. The native side passes the id back verbatim; Rust uses
// it to find the retained closure.

use crate::handles::{AppHandle, ElementHandle, SvgHandle};

/// Invoked exactly once by `run_app` once the application is ready.
pub type RunTrampoline = extern "C" fn(callback_id: u64, app: AppHandle);

/// Invoked on every build/redraw cycle of a window. Returns a freshly sealed
/// element whose ownership passes to the native side; null means "nothing to
/// show" and the native side renders its own placeholder.
pub type ViewBuilderTrampoline = extern "C" fn(callback_id: u64) -> ElementHandle;

/// Invoked once per animation frame with a fresh handle referencing the
/// animated element and the elapsed-time delta.
pub type AnimationTickTrampoline = extern "C" fn(callback_id: u64, frame: SvgHandle, delta: f32);

/// Invoked by the native side when a recurring registration can never fire
/// again (window closed, animated element dropped). Optional for the native
/// side to call; see the retention notes in trellis-runtime.
pub type ReleaseTrampoline = extern "C" fn(callback_id: u64);
