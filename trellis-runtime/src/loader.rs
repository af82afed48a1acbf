// Runtime loading of the native surface from a shared library.
//
// The library exports `trellis_api_table`, a C function returning a pointer to
// its table. The library is kept mapped for the rest of the process: the
// table, and every trampoline registration made through it, point into it.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use libloading::Library;
use trellis_ffi::{TrellisApiTable, TRELLIS_API_TABLE_SYMBOL};

use crate::api::init_api;
use crate::error::{TrellisError, TrellisResult};
use crate::logging::LOG_DISPLAY;
use crate::tlog;

/// Environment variable consulted by [`load_from_env`].
pub const NATIVE_LIB_ENV: &str = "TRELLIS_NATIVE_LIB";

type TableFn = unsafe extern "C" fn() -> *const TrellisApiTable;

static LIBRARY: OnceLock<(PathBuf, Library)> = OnceLock::new();

fn unavailable(path: &Path, what: impl std::fmt::Display) -> TrellisError {
    TrellisError::NativeUnavailable(format!("{}: {what}", path.display()))
}

/// Open the native library at `path` and install its API table.
///
/// Loading the same path again is a no-op. Loading a second, different
/// library fails with [`TrellisError::AlreadyInitialized`].
pub fn load(path: impl AsRef<Path>) -> TrellisResult<()> {
    let path = path.as_ref();
    if let Some((loaded, _)) = LIBRARY.get() {
        return if loaded == path {
            Ok(())
        } else {
            Err(TrellisError::AlreadyInitialized)
        };
    }

    // SAFETY: loading runs the library's initializers; the caller picked the
    // library and vouches for it.
    let lib = unsafe { Library::new(path) }.map_err(|e| unavailable(path, e))?;

    let table = {
        let entry: libloading::Symbol<TableFn> = unsafe { lib.get(TRELLIS_API_TABLE_SYMBOL) }
            .map_err(|e| unavailable(path, format!("missing symbol 'trellis_api_table': {e}")))?;
        unsafe { entry() }
    };
    if table.is_null() {
        return Err(unavailable(path, "'trellis_api_table' returned null"));
    }

    // Validation failures drop `lib` here; nothing was installed yet.
    init_api(table)?;
    let _ = LIBRARY.set((path.to_path_buf(), lib));
    tlog!(LOG_DISPLAY, "native surface loaded from {}", path.display());
    Ok(())
}

/// Load the library named by `TRELLIS_NATIVE_LIB`.
pub fn load_from_env() -> TrellisResult<()> {
    match std::env::var_os(NATIVE_LIB_ENV) {
        Some(path) if !path.is_empty() => load(PathBuf::from(path)),
        _ => Err(TrellisError::NativeUnavailable(format!(
            "{NATIVE_LIB_ENV} is not set"
        ))),
    }
}

/// Path of the loaded library, if any.
pub fn loaded_path() -> Option<&'static Path> {
    LIBRARY.get().map(|(path, _)| path.as_path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_missing_library_is_native_unavailable() {
        let err = load("/nonexistent/libtrellis_native_7f3a.so").unwrap_err();
        match err {
            TrellisError::NativeUnavailable(msg) => assert!(msg.contains("libtrellis_native_7f3a")),
            other => panic!("expected NativeUnavailable, got {other:?}"),
        }
        assert!(loaded_path().is_none());
    }
}
