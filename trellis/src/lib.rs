// trellis: User-facing library crate. Build element trees with `div()` /
// `svg()`, start the native application with `run`, and either load the
// native surface yourself or let it load you through `trellis::entry!`.
//
//! ## Feature Flags
//!
//! | Feature   | Effect                                                         |
//! |-----------|----------------------------------------------------------------|
//! | `dynamic` | `runtime::loader`: open the native surface from a shared library |
//! | `testing` | `runtime::testing`: in-process native surface for tests        |

pub use trellis_ffi as ffi;
pub use trellis_runtime as runtime;

pub use trellis_runtime::{
    div, rgb, run, svg, text, AnimatedSvg, Animation, App, Child, Div, Element, IntoElement, Rgb,
    Svg, SvgFrame, TrellisError, TrellisResult, WindowId,
};

// For register_view! generated inventory::submit! invocations.
#[doc(hidden)]
pub extern crate inventory as __inventory;

pub mod prelude;

// ---------------------------------------------------------------------------
// Init / Shutdown (native surface hosting Rust; called from entry!() code)
// ---------------------------------------------------------------------------

/// Install the table handed over by a native host. Returns `false` on failure.
pub fn init(api_table: *const ffi::TrellisApiTable) -> bool {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| match runtime::init_api(api_table) {
        Ok(()) => {
            runtime::logging::log(runtime::LOG_DISPLAY, &build_feature_greeting("Rust side initialized"));
            true
        }
        Err(e) => {
            // The table may be unusable, so this only reaches stderr.
            eprintln!("[Trellis] init failed: {e}");
            false
        }
    }))
    .unwrap_or(false)
}

/// Drop every retained callback. The native side must not invoke any
/// trampoline after this.
pub fn shutdown() {
    let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let retained = runtime::callback_registry::retained_count();
        runtime::callback_registry::clear_all();
        runtime::logging::log(
            runtime::LOG_DISPLAY,
            &format!("shutdown: released {retained} retained callbacks"),
        );
    }));
}

/// Greeting line listing the compiled feature flags.
fn build_feature_greeting(prefix: &str) -> String {
    macro_rules! collect_features {
        ($s:expr, $($feat:literal),+ $(,)?) => {{
            $(
                #[cfg(feature = $feat)]
                $s.push_str(concat!(" ", $feat));
            )+
        }};
    }
    let mut s = format!("{prefix} (api v{}, features:", ffi::TRELLIS_API_VERSION);
    collect_features!(s, "dynamic", "testing");
    s.push(')');
    s
}

/// Register a named view that hosts can list and open.
///
/// ```ignore
/// fn counter(app: &trellis::App) -> trellis::TrellisResult<()> {
///     app.open_window("Counter", || div().child("0"))?;
///     Ok(())
/// }
/// trellis::register_view!("counter", "a single counter window", counter);
/// ```
#[macro_export]
macro_rules! register_view {
    ($name:expr, $description:expr, $open:path $(,)?) => {
        $crate::__inventory::submit! {
            $crate::runtime::views::ViewEntry::new($name, $description, $open)
        }
    };
}

/// Generates the exports a native host calls when it loads this crate as a
/// cdylib, with `main` as the application entry point.
///
/// ```ignore
/// trellis::entry!(app_main);
///
/// fn app_main() -> trellis::TrellisResult<()> {
///     trellis::run(|app| { /* open windows */ })
/// }
/// ```
///
/// Exports `trellis_init(table) -> bool`, `trellis_main() -> bool`, and
/// `trellis_shutdown()`.
#[macro_export]
macro_rules! entry {
    ($main:path) => {
        mod __trellis_native_entry {
            use super::*;

            #[unsafe(no_mangle)]
            pub extern "C" fn trellis_init(
                api_table: *const $crate::ffi::TrellisApiTable,
            ) -> bool {
                $crate::init(api_table)
            }

            #[unsafe(no_mangle)]
            pub extern "C" fn trellis_main() -> bool {
                $crate::runtime::ffi_boundary(false, || match $main() {
                    Ok(()) => true,
                    Err(e) => {
                        $crate::runtime::logging::log($crate::runtime::LOG_ERROR, &e.to_string());
                        false
                    }
                })
            }

            #[unsafe(no_mangle)]
            pub extern "C" fn trellis_shutdown() {
                $crate::shutdown()
            }
        }
    };
}
