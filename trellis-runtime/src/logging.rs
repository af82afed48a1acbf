// Logging bridge to the native surface's log sink.

use std::sync::atomic::{AtomicU8, Ordering};

use trellis_ffi::TrellisLogLevel;

use crate::api::try_api;

/// Log level constants for the `tlog!` macro.
pub const LOG_DISPLAY: u8 = TrellisLogLevel::Display as u8;
pub const LOG_WARNING: u8 = TrellisLogLevel::Warning as u8;
pub const LOG_ERROR: u8 = TrellisLogLevel::Error as u8;

static MIN_LEVEL: AtomicU8 = AtomicU8::new(LOG_DISPLAY);

/// Drop messages below `level`. Errors are always forwarded.
pub fn set_min_level(level: u8) {
    MIN_LEVEL.store(clamp_level(level), Ordering::Relaxed);
}

fn clamp_level(level: u8) -> u8 {
    TrellisLogLevel::from_u8(level) as u8
}

/// Current minimum level.
pub fn min_level() -> u8 {
    MIN_LEVEL.load(Ordering::Relaxed)
}

/// Forward one message to the native log sink, prefixed with `[Trellis]`.
///
/// Messages emitted before an API table is installed are dropped: there is
/// nowhere to send them, and the caller is about to get `NativeUnavailable`.
pub fn log(level: u8, msg: &str) {
    if level < min_level() {
        return;
    }
    let Ok(api) = try_api() else {
        return;
    };
    let line = format!("[Trellis] {msg}");
    let bytes = line.as_bytes();
    // SAFETY: the logging sub-table is checked non-null at install time.
    unsafe {
        ((*api.logging).log)(level, bytes.as_ptr(), bytes.len() as u32);
    }
}

/// Log a message through the native surface.
///
/// Usage:
/// ```ignore
/// tlog!(LOG_DISPLAY, "window {} opened", id);
/// tlog!(LOG_WARNING, "asset {path} missing, using inline content");
/// tlog!(LOG_ERROR, "fatal: {err}");
/// ```
#[macro_export]
macro_rules! tlog {
    ($level:expr, $($arg:tt)*) => {{
        $crate::logging::log($level, &format!($($arg)*));
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_reach_the_native_sink_with_prefix() {
        crate::testing::install();
        log(LOG_WARNING, "hello sink");
        let logs = crate::testing::logs();
        assert!(logs.contains(&(LOG_WARNING, "[Trellis] hello sink".to_string())));
    }

    #[test]
    fn min_level_never_filters_errors() {
        assert_eq!(clamp_level(9), LOG_ERROR);
        assert_eq!(clamp_level(LOG_WARNING), LOG_WARNING);
    }
}
