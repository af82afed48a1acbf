// Static `extern "C"` entry points handed to the native surface.
//
// One per callback shape. Each decodes the callback id, forwards to the
// registry, and never lets a panic unwind into native code.

use trellis_ffi::{AppHandle, ElementHandle, SvgHandle};

use crate::callback_registry::{self, CallbackId};
use crate::ffi_guard::ffi_boundary;
use crate::logging::LOG_WARNING;
use crate::tlog;

pub(crate) extern "C" fn run_trampoline(callback_id: u64, app: AppHandle) {
    ffi_boundary((), || {
        callback_registry::invoke_run(CallbackId::from_raw(callback_id), app);
    })
}

pub(crate) extern "C" fn view_builder_trampoline(callback_id: u64) -> ElementHandle {
    ffi_boundary(ElementHandle::null(), || {
        callback_registry::invoke_view_builder(CallbackId::from_raw(callback_id))
    })
}

pub(crate) extern "C" fn animation_tick_trampoline(callback_id: u64, frame: SvgHandle, delta: f32) {
    ffi_boundary((), || {
        let delta = sanitize_delta(delta);
        callback_registry::invoke_animation_tick(CallbackId::from_raw(callback_id), frame, delta);
    })
}

pub(crate) extern "C" fn release_trampoline(callback_id: u64) {
    ffi_boundary((), || {
        let id = CallbackId::from_raw(callback_id);
        if !callback_registry::release(id) {
            tlog!(LOG_WARNING, "release for unknown callback {id}; ignoring");
        }
    })
}

/// Tick callbacks only ever see a finite, non-negative delta.
fn sanitize_delta(delta: f32) -> f32 {
    if delta.is_finite() && delta >= 0.0 {
        delta
    } else {
        tlog!(LOG_WARNING, "animation delta {delta} is not a finite non-negative value; using 0");
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback_registry::{register, Callback};
    use std::sync::{Arc, Mutex};

    #[test]
    fn deltas_are_clamped_to_non_negative_finite() {
        assert_eq!(sanitize_delta(0.016), 0.016);
        assert_eq!(sanitize_delta(0.0), 0.0);
        assert_eq!(sanitize_delta(-0.5), 0.0);
        assert_eq!(sanitize_delta(f32::NAN), 0.0);
        assert_eq!(sanitize_delta(f32::INFINITY), 0.0);
    }

    #[test]
    fn tick_trampoline_forwards_the_sanitized_delta() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let id = register(Callback::AnimationTick(Box::new(move |_, delta| {
            sink.lock().unwrap().push(delta);
        })));
        animation_tick_trampoline(id.raw(), SvgHandle::null(), 0.25);
        animation_tick_trampoline(id.raw(), SvgHandle::null(), -1.0);
        assert_eq!(*seen.lock().unwrap(), vec![0.25, 0.0]);
        callback_registry::release(id);
    }

    #[test]
    fn release_trampoline_drops_the_registration() {
        let id = register(Callback::ViewBuilder(Box::new(ElementHandle::null)));
        release_trampoline(id.raw());
        assert!(!callback_registry::is_registered(id));
        // A second release is logged, not fatal.
        release_trampoline(id.raw());
    }

    #[test]
    fn unknown_ids_produce_defaults() {
        assert!(view_builder_trampoline(u64::MAX - 1).is_null());
        run_trampoline(u64::MAX - 1, AppHandle::null());
    }
}
