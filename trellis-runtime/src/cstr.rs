// NUL-terminated copies of string payloads for native calls.
//
// The CString is owned by the caller and dropped right after the call
// returns; the native side must copy anything it wants to keep.

use std::ffi::CString;

use crate::logging::LOG_WARNING;
use crate::tlog;

/// Copy `value` into a NUL-terminated buffer.
///
/// An interior NUL truncates the payload there (that is all a C reader would
/// see anyway) and logs a warning.
pub fn c_string(value: impl Into<Vec<u8>>) -> CString {
    match CString::new(value) {
        Ok(s) => s,
        Err(err) => {
            let pos = err.nul_position();
            tlog!(LOG_WARNING, "string payload has an interior NUL at byte {pos}; truncating");
            let mut bytes = err.into_vec();
            bytes.truncate(pos);
            CString::new(bytes).unwrap_or_default()
        }
    }
}
