// Global API table storage. Installed once before any element is built, then read-only.

use std::sync::OnceLock;

use trellis_ffi::{
    TrellisApiTable, TrellisAppApi, TrellisDivApi, TrellisElementApi, TrellisSvgApi,
    TRELLIS_API_VERSION,
};

use crate::error::{TrellisError, TrellisResult};

/// Wrapper so a raw pointer can live inside OnceLock (which requires Send+Sync).
/// SAFETY: The table is owned by the native surface and lives for the whole
/// process (or at least as long as the library stays mapped). Access is
/// read-only after install.
struct ApiRef(*const TrellisApiTable);
unsafe impl Send for ApiRef {}
unsafe impl Sync for ApiRef {}

static API: OnceLock<ApiRef> = OnceLock::new();

/// Install the native API table.
///
/// Validates the pointer, the layout version, and that every sub-table is
/// present. Installing the same table twice is a no-op; installing a
/// different one fails with [`TrellisError::AlreadyInitialized`].
///
/// # Safety contract
/// `table` must point to a table that stays valid for the rest of the process.
pub fn init_api(table: *const TrellisApiTable) -> TrellisResult<()> {
    if table.is_null() {
        return Err(TrellisError::NativeUnavailable("API table pointer is null".into()));
    }
    // SAFETY: non-null, and the caller guarantees it points to a live table.
    let table_ref = unsafe { &*table };
    if table_ref.version != TRELLIS_API_VERSION {
        return Err(TrellisError::ApiVersionMismatch {
            expected: TRELLIS_API_VERSION,
            found: table_ref.version,
        });
    }
    if !table_ref.is_complete() {
        return Err(TrellisError::NativeUnavailable(
            "API table is missing one or more sub-tables".into(),
        ));
    }

    let installed = API.get_or_init(|| ApiRef(table));
    if std::ptr::eq(installed.0, table) {
        Ok(())
    } else {
        Err(TrellisError::AlreadyInitialized)
    }
}

/// Access the global API table. Panics if called before [`init_api`].
#[inline(always)]
pub fn api() -> &'static TrellisApiTable {
    match try_api() {
        Ok(table) => table,
        Err(e) => panic!("[Trellis] {e}"),
    }
}

/// Access the global API table, or `NativeUnavailable` if none is installed.
#[inline]
pub fn try_api() -> TrellisResult<&'static TrellisApiTable> {
    match API.get() {
        // SAFETY: validated non-null in init_api; the native side guarantees
        // the table outlives every call into it.
        Some(api) => Ok(unsafe { &*api.0 }),
        None => Err(TrellisError::NativeUnavailable(
            "no native API table installed".into(),
        )),
    }
}

/// Returns true if the API table has been installed.
#[inline]
pub fn is_api_initialized() -> bool {
    API.get().is_some()
}

// Sub-table accessors. `is_complete` was checked at install time, so the
// dereferences below never see null.

#[inline]
pub(crate) fn app_api() -> &'static TrellisAppApi {
    unsafe { &*api().app }
}

#[inline]
pub(crate) fn div_api() -> &'static TrellisDivApi {
    unsafe { &*api().div }
}

#[inline]
pub(crate) fn svg_api() -> &'static TrellisSvgApi {
    unsafe { &*api().svg }
}

#[inline]
pub(crate) fn element_api() -> &'static TrellisElementApi {
    unsafe { &*api().element }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_table_is_native_unavailable() {
        let err = init_api(std::ptr::null()).unwrap_err();
        assert!(matches!(err, TrellisError::NativeUnavailable(_)));
    }

    #[test]
    fn installing_the_same_table_twice_is_idempotent() {
        crate::testing::install();
        assert!(init_api(crate::testing::table()).is_ok());
        assert!(is_api_initialized());
    }

    #[test]
    fn version_mismatch_is_rejected_before_install() {
        let base = unsafe { &*crate::testing::table() };
        let stale = TrellisApiTable {
            version: TRELLIS_API_VERSION + 1,
            app: base.app,
            div: base.div,
            svg: base.svg,
            element: base.element,
            logging: base.logging,
        };
        match init_api(&stale) {
            Err(TrellisError::ApiVersionMismatch { expected, found }) => {
                assert_eq!(expected, TRELLIS_API_VERSION);
                assert_eq!(found, TRELLIS_API_VERSION + 1);
            }
            other => panic!("expected version mismatch, got {other:?}"),
        }
    }

    #[test]
    fn incomplete_table_is_native_unavailable() {
        let base = unsafe { &*crate::testing::table() };
        let partial = TrellisApiTable {
            version: TRELLIS_API_VERSION,
            app: base.app,
            div: std::ptr::null(),
            svg: base.svg,
            element: base.element,
            logging: base.logging,
        };
        assert!(matches!(init_api(&partial), Err(TrellisError::NativeUnavailable(_))));
    }
}
