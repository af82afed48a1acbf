// Callback registry: maps callback IDs to retained Rust closures.
//
// The native surface never sees a closure. It gets a static trampoline plus a
// callback id and passes the id back on every invocation; the trampoline looks
// the closure up here.
//
// Retention:
// - Run (one-shot): removed by `run` once `run_app` has returned.
// - ViewBuilder / AnimationTick (recurring): removed when the native side
//   calls the release trampoline. A surface that never does keeps them for
//   the life of the process; that is the accepted bound, there is no other
//   point at which it is known they cannot fire again.
// - Everything: removed by `clear_all` at shutdown.

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

use trellis_ffi::{AppHandle, ElementHandle, SvgHandle};

use crate::error::{TrellisError, TrellisResult};
use crate::ffi_guard::panic_message;
use crate::lock_or_recover;
use crate::logging::{LOG_ERROR, LOG_WARNING};
use crate::tlog;

/// Identity of one registration. Passed to the native side as a `u64`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct CallbackId(u64);

impl CallbackId {
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        CallbackId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The three callback shapes that cross the boundary.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CallbackKind {
    Run,
    ViewBuilder,
    AnimationTick,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum InvocationClass {
    /// Invoked exactly once.
    OneShot,
    /// Invoked an unknown number of times for the life of its owner.
    Recurring,
}

impl CallbackKind {
    pub const fn class(self) -> InvocationClass {
        match self {
            CallbackKind::Run => InvocationClass::OneShot,
            CallbackKind::ViewBuilder | CallbackKind::AnimationTick => InvocationClass::Recurring,
        }
    }

    /// Whether the native side may call it from inside its own call stack
    /// (mid-frame, nested in another callback).
    pub const fn is_reentrant(self) -> bool {
        matches!(self, CallbackKind::ViewBuilder | CallbackKind::AnimationTick)
    }
}

/// A retained closure, erased to the shape its trampoline expects.
pub(crate) enum Callback {
    Run(Box<dyn FnOnce(AppHandle) + Send>),
    ViewBuilder(Box<dyn FnMut() -> ElementHandle + Send>),
    AnimationTick(Box<dyn FnMut(SvgHandle, f32) + Send>),
}

impl Callback {
    fn kind(&self) -> CallbackKind {
        match self {
            Callback::Run(_) => CallbackKind::Run,
            Callback::ViewBuilder(_) => CallbackKind::ViewBuilder,
            Callback::AnimationTick(_) => CallbackKind::AnimationTick,
        }
    }
}

enum Slot {
    Ready(Callback),
    /// Taken out for execution; put back when the call returns.
    Running,
    /// One-shot that already ran.
    Consumed,
}

struct Entry {
    kind: CallbackKind,
    slot: Slot,
    invocations: u64,
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);
static REGISTRY: OnceLock<Mutex<HashMap<CallbackId, Entry>>> = OnceLock::new();

fn registry() -> &'static Mutex<HashMap<CallbackId, Entry>> {
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Retain a closure and return its id. Must happen before the id is handed
/// to any native registration call.
pub(crate) fn register(callback: Callback) -> CallbackId {
    let id = CallbackId(NEXT_ID.fetch_add(1, Ordering::Relaxed));
    let entry = Entry {
        kind: callback.kind(),
        slot: Slot::Ready(callback),
        invocations: 0,
    };
    lock_or_recover(registry()).insert(id, entry);
    id
}

/// Drop a registration. Returns `false` if it was not registered.
///
/// Releasing a callback while it runs is allowed: the running closure
/// finishes and is dropped instead of being put back.
pub fn release(id: CallbackId) -> bool {
    // Drop the closure after the lock is gone; its captures may re-enter.
    let removed = lock_or_recover(registry()).remove(&id);
    removed.is_some()
}

/// Clear all registrations. Called at shutdown, after the native side has
/// stopped invoking trampolines.
pub fn clear_all() {
    let drained: Vec<Entry> = {
        let mut reg = lock_or_recover(registry());
        reg.drain().map(|(_, entry)| entry).collect()
    };
    drop(drained);
}

pub fn is_registered(id: CallbackId) -> bool {
    lock_or_recover(registry()).contains_key(&id)
}

pub fn kind_of(id: CallbackId) -> Option<CallbackKind> {
    lock_or_recover(registry()).get(&id).map(|e| e.kind)
}

/// How many times the native side has invoked `id`.
pub fn invocation_count(id: CallbackId) -> TrellisResult<u64> {
    lock_or_recover(registry())
        .get(&id)
        .map(|e| e.invocations)
        .ok_or(TrellisError::CallbackNotRegistered(id))
}

/// Number of closures currently retained.
pub fn retained_count() -> usize {
    lock_or_recover(registry()).len()
}

// ---------------------------------------------------------------------------
// Take-execute-replace
// ---------------------------------------------------------------------------

/// Take the closure out of its slot. The registry lock is released before
/// user code runs, so a callback may register, release, or trigger other
/// callbacks without deadlocking.
fn take(id: CallbackId, expected: CallbackKind) -> Option<Callback> {
    let mut reg = lock_or_recover(registry());
    let Some(entry) = reg.get_mut(&id) else {
        drop(reg);
        tlog!(LOG_WARNING, "{expected:?} callback {id} invoked after release; ignoring");
        return None;
    };
    if entry.kind != expected {
        let actual = entry.kind;
        drop(reg);
        tlog!(LOG_ERROR, "callback {id} is a {actual:?} callback, invoked as {expected:?}");
        return None;
    }
    let next = match expected.class() {
        InvocationClass::OneShot => Slot::Consumed,
        InvocationClass::Recurring => Slot::Running,
    };
    match std::mem::replace(&mut entry.slot, next) {
        Slot::Ready(callback) => {
            entry.invocations += 1;
            Some(callback)
        }
        Slot::Running => {
            entry.slot = Slot::Running;
            drop(reg);
            tlog!(LOG_ERROR, "{expected:?} callback {id} re-entered while running; ignoring nested call");
            None
        }
        Slot::Consumed => {
            entry.slot = Slot::Consumed;
            drop(reg);
            tlog!(LOG_ERROR, "one-shot callback {id} invoked more than once; ignoring");
            None
        }
    }
}

/// Put a recurring closure back, unless it was released while running.
fn restore(id: CallbackId, callback: Callback) {
    let mut reg = lock_or_recover(registry());
    if let Some(entry) = reg.get_mut(&id) {
        if matches!(entry.slot, Slot::Running) {
            entry.slot = Slot::Ready(callback);
            return;
        }
    }
    drop(reg);
    // Released mid-call: `callback` is dropped here, outside the lock.
}

fn report_panic(kind: CallbackKind, id: CallbackId, payload: &Box<dyn std::any::Any + Send>) {
    tlog!(LOG_ERROR, "{kind:?} callback {id} panicked: {}", panic_message(payload));
}

// ---------------------------------------------------------------------------
// Invocation (called from trampolines)
// ---------------------------------------------------------------------------

/// Run a one-shot init callback. A second invocation is reported and ignored.
pub(crate) fn invoke_run(id: CallbackId, app: AppHandle) {
    let Some(Callback::Run(on_init)) = take(id, CallbackKind::Run) else {
        return;
    };
    if let Err(payload) = catch_unwind(AssertUnwindSafe(move || on_init(app))) {
        report_panic(CallbackKind::Run, id, &payload);
    }
}

/// Run a view builder. Returns null if the builder is missing, busy, or panicked.
pub(crate) fn invoke_view_builder(id: CallbackId) -> ElementHandle {
    let Some(Callback::ViewBuilder(mut build)) = take(id, CallbackKind::ViewBuilder) else {
        return ElementHandle::null();
    };
    let result = catch_unwind(AssertUnwindSafe(|| build()));
    restore(id, Callback::ViewBuilder(build));
    match result {
        Ok(element) => element,
        Err(payload) => {
            report_panic(CallbackKind::ViewBuilder, id, &payload);
            ElementHandle::null()
        }
    }
}

/// Run one animation tick.
pub(crate) fn invoke_animation_tick(id: CallbackId, frame: SvgHandle, delta: f32) {
    let Some(Callback::AnimationTick(mut tick)) = take(id, CallbackKind::AnimationTick) else {
        return;
    };
    let result = catch_unwind(AssertUnwindSafe(|| tick(frame, delta)));
    restore(id, Callback::AnimationTick(tick));
    if let Err(payload) = result {
        report_panic(CallbackKind::AnimationTick, id, &payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let c = Arc::new(AtomicUsize::new(0));
        (c.clone(), c)
    }

    #[test]
    fn ids_are_unique_and_kinds_recorded() {
        let a = register(Callback::ViewBuilder(Box::new(ElementHandle::null)));
        let b = register(Callback::AnimationTick(Box::new(|_, _| {})));
        assert_ne!(a, b);
        assert_eq!(kind_of(a), Some(CallbackKind::ViewBuilder));
        assert_eq!(kind_of(b), Some(CallbackKind::AnimationTick));
        assert!(release(a));
        assert!(release(b));
        assert!(!release(a));
    }

    #[test]
    fn invocation_classes() {
        assert_eq!(CallbackKind::Run.class(), InvocationClass::OneShot);
        assert_eq!(CallbackKind::ViewBuilder.class(), InvocationClass::Recurring);
        assert!(!CallbackKind::Run.is_reentrant());
        assert!(CallbackKind::AnimationTick.is_reentrant());
    }

    #[test]
    fn one_shot_runs_at_most_once() {
        crate::testing::install();
        let (count, seen) = counter();
        let id = register(Callback::Run(Box::new(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        })));
        invoke_run(id, AppHandle::null());
        invoke_run(id, AppHandle::null());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(invocation_count(id).unwrap(), 1);
        assert!(crate::testing::logs()
            .iter()
            .any(|(level, msg)| *level == LOG_ERROR && msg.contains("invoked more than once")));
        release(id);
    }

    #[test]
    fn recurring_callbacks_are_restored_after_each_call() {
        let (count, seen) = counter();
        let id = register(Callback::AnimationTick(Box::new(move |_, _| {
            count.fetch_add(1, Ordering::SeqCst);
        })));
        for _ in 0..3 {
            invoke_animation_tick(id, SvgHandle::null(), 0.016);
        }
        assert_eq!(seen.load(Ordering::SeqCst), 3);
        assert_eq!(invocation_count(id).unwrap(), 3);
        release(id);
    }

    #[test]
    fn a_panicking_builder_returns_null_and_stays_registered() {
        crate::testing::install();
        let (count, seen) = counter();
        let id = register(Callback::ViewBuilder(Box::new(move || {
            if count.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("first frame fails");
            }
            ElementHandle::from_addr(0xbeef)
        })));
        assert!(invoke_view_builder(id).is_null());
        assert_eq!(invoke_view_builder(id), ElementHandle::from_addr(0xbeef));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert!(crate::testing::logs()
            .iter()
            .any(|(_, msg)| msg.contains("panicked: Rust panic: first frame fails")));
        release(id);
    }

    #[test]
    fn nested_invocation_of_the_same_id_is_refused() {
        crate::testing::install();
        let inner_result = Arc::new(Mutex::new(None));
        let slot = inner_result.clone();
        let own_id = Arc::new(AtomicU64::new(0));
        let own = own_id.clone();
        let id = register(Callback::ViewBuilder(Box::new(move || {
            let me = CallbackId::from_raw(own.load(Ordering::SeqCst));
            *slot.lock().unwrap() = Some(invoke_view_builder(me));
            ElementHandle::from_addr(0x1)
        })));
        own_id.store(id.raw(), Ordering::SeqCst);

        assert_eq!(invoke_view_builder(id), ElementHandle::from_addr(0x1));
        assert_eq!(*inner_result.lock().unwrap(), Some(ElementHandle::null()));
        // Still usable afterwards.
        assert_eq!(invoke_view_builder(id), ElementHandle::from_addr(0x1));
        release(id);
    }

    #[test]
    fn a_callback_may_register_and_release_others_while_running() {
        let id = register(Callback::AnimationTick(Box::new(|_, _| {
            let other = register(Callback::AnimationTick(Box::new(|_, _| {})));
            assert!(is_registered(other));
            assert!(release(other));
        })));
        invoke_animation_tick(id, SvgHandle::null(), 0.0);
        release(id);
    }

    #[test]
    fn releasing_while_running_drops_after_the_call() {
        let own_id = Arc::new(AtomicU64::new(0));
        let own = own_id.clone();
        let id = register(Callback::AnimationTick(Box::new(move |_, _| {
            release(CallbackId::from_raw(own.load(Ordering::SeqCst)));
        })));
        own_id.store(id.raw(), Ordering::SeqCst);
        invoke_animation_tick(id, SvgHandle::null(), 0.0);
        assert!(!is_registered(id));
    }

    #[test]
    fn wrong_shape_is_reported_not_run() {
        crate::testing::install();
        let (count, seen) = counter();
        let id = register(Callback::AnimationTick(Box::new(move |_, _| {
            count.fetch_add(1, Ordering::SeqCst);
        })));
        assert!(invoke_view_builder(id).is_null());
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        // And still intact for its real trampoline.
        invoke_animation_tick(id, SvgHandle::null(), 0.0);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        release(id);
    }

    #[test]
    fn unknown_ids_report_not_registered() {
        let id = CallbackId::from_raw(u64::MAX);
        assert!(matches!(invocation_count(id), Err(TrellisError::CallbackNotRegistered(_))));
    }
}
