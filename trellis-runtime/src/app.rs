// Application and window bootstrap.

use std::fmt;
use std::marker::PhantomData;

use trellis_ffi::AppHandle;

use crate::api::{app_api, try_api};
use crate::callback_registry::{self, Callback, CallbackId};
use crate::cstr::c_string;
use crate::element::IntoElement;
use crate::error::TrellisResult;
use crate::logging::{LOG_DISPLAY, LOG_WARNING};
use crate::tlog;
use crate::trampolines;

/// Start the native application and block until its run loop exits.
///
/// `on_init` runs exactly once, on the native side's schedule, with the
/// running application. Fails with `NativeUnavailable` if no API table is
/// installed; nothing is registered in that case.
pub fn run<F>(on_init: F) -> TrellisResult<()>
where
    F: FnOnce(&App) + Send + 'static,
{
    try_api()?;

    let id = callback_registry::register(Callback::Run(Box::new(move |handle: AppHandle| {
        let app = App::from_handle(handle);
        on_init(&app);
    })));
    tlog!(LOG_DISPLAY, "run: starting native application (init callback {id})");

    unsafe { (app_api().run_app)(trampolines::run_trampoline, id.raw()) };

    if callback_registry::invocation_count(id).unwrap_or(0) == 0 {
        tlog!(LOG_WARNING, "run: native run loop exited without calling the init callback {id}");
    }
    callback_registry::release(id);
    Ok(())
}

/// The running application, as seen from inside `run`'s init callback.
///
/// Only valid while the native run loop is alive, so it is neither `Send`
/// nor storable past the callback.
pub struct App {
    handle: AppHandle,
    _not_send: PhantomData<*const ()>,
}

impl App {
    fn from_handle(handle: AppHandle) -> Self {
        App {
            handle,
            _not_send: PhantomData,
        }
    }

    /// The raw native application handle.
    #[inline]
    pub fn handle(&self) -> AppHandle {
        self.handle
    }

    /// Open a window whose contents come from `build`.
    ///
    /// Returns as soon as the native side has accepted the window. `build` is
    /// retained and called on every build/redraw cycle; each call must return
    /// a freshly built tree. It is released when the native side reports the
    /// window closed.
    pub fn open_window<F, E>(&self, title: &str, mut build: F) -> TrellisResult<WindowId>
    where
        F: FnMut() -> E + Send + 'static,
        E: IntoElement,
    {
        try_api()?;
        let title_c = c_string(title);
        let id = callback_registry::register(Callback::ViewBuilder(Box::new(move || {
            build().into_element().into_raw()
        })));
        unsafe {
            (app_api().open_window)(
                self.handle,
                title_c.as_ptr(),
                trampolines::view_builder_trampoline,
                trampolines::release_trampoline,
                id.raw(),
            );
        }
        tlog!(LOG_DISPLAY, "window '{title}' opened with view builder {id}");
        Ok(WindowId(id))
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App").field("handle", &self.handle).finish()
    }
}

/// Identifies an opened window by its view-builder registration.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct WindowId(CallbackId);

impl WindowId {
    /// The view builder's registration. Stable across redraws.
    #[inline]
    pub fn registration(self) -> CallbackId {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::div::div;
    use crate::testing::{self, MockTree};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn init_runs_once_and_is_released_afterwards() {
        testing::install();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let before = testing::run_registrations().len();
        run(move |app| {
            assert!(!app.handle().is_null());
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let regs = testing::run_registrations();
        assert_eq!(regs.len(), before + 1);
        let id = CallbackId::from_raw(regs[before]);
        assert!(!callback_registry::is_registered(id));
    }

    #[test]
    fn a_double_invoking_run_loop_still_runs_init_once() {
        testing::install();
        testing::set_run_invocations(2);
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        run(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn a_run_loop_that_never_calls_init_is_reported() {
        testing::install();
        testing::set_run_invocations(0);
        run(|_| panic!("must not run")).unwrap();
        assert!(testing::logs()
            .iter()
            .any(|(level, msg)| *level == LOG_WARNING && msg.contains("without calling the init callback")));
    }

    #[test]
    fn windows_keep_one_registration_across_redraws() {
        testing::install();
        run(|app| {
            app.open_window("Counter", || div().child("frame")).unwrap();
        })
        .unwrap();

        let windows = testing::windows();
        let window = windows.last().expect("window recorded");
        assert_eq!(window.title, "Counter");
        assert!(window.registered_at_call);
        let index = windows.len() - 1;

        for _ in 0..3 {
            let tree = testing::redraw(index).expect("builder produced a tree");
            assert_eq!(tree.text_leaves(), vec!["frame".to_string()]);
        }
        let id = CallbackId::from_raw(window.callback_id);
        assert_eq!(callback_registry::invocation_count(id).unwrap(), 3);

        testing::close_window(index);
        assert!(!callback_registry::is_registered(id));
        assert_eq!(testing::redraw(index), None);
    }

    #[test]
    fn window_titles_cross_as_c_strings() {
        testing::install();
        run(|app| {
            let id = app.open_window("Ünïcode ✓", || crate::element::text("x")).unwrap();
            assert_eq!(callback_registry::kind_of(id.registration()), Some(crate::CallbackKind::ViewBuilder));
        })
        .unwrap();
        let windows = testing::windows();
        assert_eq!(windows.last().map(|w| w.title.as_str()), Some("Ünïcode ✓"));
        let index = windows.len() - 1;
        assert_eq!(testing::redraw(index), Some(MockTree::Text("x".into())));
    }
}
