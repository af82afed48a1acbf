// FFI boundary guard: wraps Rust callbacks to catch panics before they
// cross the FFI boundary (which is undefined behavior).

use std::any::Any;

use crate::logging::{log, LOG_ERROR};

/// Execute `f` and catch any panic, returning `default` on failure.
///
/// Every `extern "C"` function the native surface calls wraps its body in
/// this guard. A panic that escapes across FFI is instant UB; this prevents
/// that. The panic message is forwarded to the native log sink.
pub fn ffi_boundary<F, R>(default: R, f: F) -> R
where
    F: FnOnce() -> R + std::panic::UnwindSafe,
{
    match std::panic::catch_unwind(f) {
        Ok(value) => value,
        Err(payload) => {
            log(LOG_ERROR, &panic_message(&payload));
            default
        }
    }
}

/// Extract a human-readable message from a panic payload.
pub(crate) fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("Rust panic: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("Rust panic: {s}")
    } else {
        "Rust panic (unknown payload)".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_ffi::ElementHandle;

    #[test]
    fn builder_results_pass_through() {
        let element = ffi_boundary(ElementHandle::null(), || ElementHandle::from_addr(0x40));
        assert_eq!(element.to_addr(), 0x40);
    }

    #[test]
    fn a_panicking_builder_crosses_as_a_null_element() {
        let element = ffi_boundary(ElementHandle::null(), || -> ElementHandle {
            panic!("view builder failed");
        });
        assert!(element.is_null());
    }

    #[test]
    fn ffi_boundary_logs_the_panic_message() {
        crate::testing::install();
        let result = ffi_boundary(false, || -> bool {
            panic!("{}", "formatted panic");
        });
        assert!(!result);
        assert!(crate::testing::logs()
            .iter()
            .any(|(level, msg)| *level == LOG_ERROR && msg.ends_with("Rust panic: formatted panic")));
    }
}
