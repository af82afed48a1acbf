// In-process native surface for tests.
//
// Implements the whole API table in Rust. State is per thread so parallel
// tests do not see each other's nodes; handle addresses come from one global
// counter so they are unique across threads, which keeps the process-wide
// callback registry unambiguous.
//
// The mock never holds its state borrowed while calling a trampoline: user
// code running inside a callback calls straight back into these functions.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{c_char, CStr};
use std::sync::atomic::{AtomicU64, Ordering};

use trellis_ffi::*;

use crate::api::init_api;
use crate::callback_registry::{self, CallbackId};

// ---------------------------------------------------------------------------
// Public views of the mock state
// ---------------------------------------------------------------------------

/// Argument of a recorded native call.
#[derive(Clone, Debug, PartialEq)]
pub enum MockValue {
    Unit,
    F32(f32),
    U32(u32),
    U8(u8),
    Bool(bool),
    Str(String),
    /// Another handle, by address.
    Handle(u64),
}

/// One call the runtime made into the native surface.
#[derive(Clone, Debug, PartialEq)]
pub struct MockCall {
    pub op: &'static str,
    /// Address of the handle the call targeted (the new handle for constructors).
    pub target: u64,
    pub value: MockValue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MockKind {
    Div,
    Svg,
}

/// Snapshot of a subtree.
#[derive(Clone, Debug, PartialEq)]
pub enum MockTree {
    Text(String),
    Node {
        kind: MockKind,
        /// Style calls applied to the node, in order, without the `div_`/`svg_` prefix.
        styles: Vec<(&'static str, MockValue)>,
        children: Vec<MockTree>,
    },
}

impl MockTree {
    /// Every text leaf, depth first.
    pub fn text_leaves(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut Vec<String>) {
        match self {
            MockTree::Text(text) => out.push(text.clone()),
            MockTree::Node { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Values passed to one style setter on this node, in call order.
    pub fn style(&self, name: &str) -> Vec<MockValue> {
        match self {
            MockTree::Text(_) => Vec::new(),
            MockTree::Node { styles, .. } => styles
                .iter()
                .filter(|(n, _)| *n == name)
                .map(|(_, v)| v.clone())
                .collect(),
        }
    }

    /// First node of `kind`, depth first (including `self`).
    pub fn find(&self, kind: MockKind) -> Option<&MockTree> {
        match self {
            MockTree::Text(_) => None,
            MockTree::Node { kind: k, children, .. } => {
                if *k == kind {
                    return Some(self);
                }
                children.iter().find_map(|c| c.find(kind))
            }
        }
    }
}

/// A window opened through `open_window`.
#[derive(Clone, Debug)]
pub struct MockWindow {
    pub title: String,
    pub callback_id: u64,
    /// Whether the callback id was already in the registry when the native
    /// call arrived.
    pub registered_at_call: bool,
    pub closed: bool,
    build: ViewBuilderTrampoline,
    release: ReleaseTrampoline,
}

/// An animation attached through `with_animation`.
#[derive(Clone, Debug)]
pub struct MockAnimation {
    pub callback_id: u64,
    pub id: String,
    pub duration_secs: f32,
    pub repeat: bool,
    pub registered_at_call: bool,
    pub released: bool,
    node: u64,
    tick: AnimationTickTrampoline,
    release: ReleaseTrampoline,
}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

enum NodeKind {
    Div,
    Svg,
    Text(String),
}

struct Node {
    kind: NodeKind,
    styles: Vec<(&'static str, MockValue)>,
    children: Vec<u64>,
    sealed: bool,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            styles: Vec::new(),
            children: Vec::new(),
            sealed: false,
        }
    }
}

struct MockState {
    nodes: HashMap<u64, Node>,
    /// Element handle -> node.
    elements: HashMap<u64, u64>,
    /// Per-frame animation handle -> node.
    frames: HashMap<u64, u64>,
    calls: Vec<MockCall>,
    logs: Vec<(u8, String)>,
    windows: Vec<MockWindow>,
    animations: Vec<MockAnimation>,
    run_registrations: Vec<u64>,
    run_invocations: usize,
}

impl Default for MockState {
    fn default() -> Self {
        MockState {
            nodes: HashMap::new(),
            elements: HashMap::new(),
            frames: HashMap::new(),
            calls: Vec::new(),
            logs: Vec::new(),
            windows: Vec::new(),
            animations: Vec::new(),
            run_registrations: Vec::new(),
            run_invocations: 1,
        }
    }
}

impl MockState {
    fn record(&mut self, op: &'static str, target: u64, value: MockValue) {
        self.calls.push(MockCall { op, target, value });
    }

    /// Node behind a builder or frame handle.
    fn node_of(&self, addr: u64) -> Option<u64> {
        if self.nodes.contains_key(&addr) {
            Some(addr)
        } else {
            self.frames.get(&addr).copied()
        }
    }

    /// Record a style call and apply it to the node it targets.
    fn style(&mut self, op: &'static str, name: &'static str, addr: u64, value: MockValue) {
        self.record(op, addr, value.clone());
        if let Some(node) = self.node_of(addr) {
            if let Some(node) = self.nodes.get_mut(&node) {
                node.styles.push((name, value));
            }
        }
    }

    fn alloc(&mut self, kind: NodeKind) -> u64 {
        let addr = next_addr();
        self.nodes.insert(addr, Node::new(kind));
        addr
    }

    fn seal(&mut self, op: &'static str, addr: u64) -> u64 {
        self.record(op, addr, MockValue::Unit);
        match self.nodes.get_mut(&addr) {
            Some(node) if !node.sealed => {
                node.sealed = true;
                let element = next_addr();
                self.elements.insert(element, addr);
                element
            }
            _ => 0,
        }
    }

    fn snapshot(&self, node: u64) -> MockTree {
        let Some(n) = self.nodes.get(&node) else {
            panic!("mock: unknown node {node:#x}");
        };
        let kind = match &n.kind {
            NodeKind::Text(text) => return MockTree::Text(text.clone()),
            NodeKind::Div => MockKind::Div,
            NodeKind::Svg => MockKind::Svg,
        };
        MockTree::Node {
            kind,
            styles: n.styles.clone(),
            children: n.children.iter().map(|c| self.snapshot(*c)).collect(),
        }
    }
}

thread_local! {
    static STATE: RefCell<MockState> = RefCell::new(MockState::default());
}

static NEXT_ADDR: AtomicU64 = AtomicU64::new(0x1000);

fn next_addr() -> u64 {
    NEXT_ADDR.fetch_add(0x10, Ordering::Relaxed)
}

fn with_state<R>(f: impl FnOnce(&mut MockState) -> R) -> R {
    STATE.with(|state| f(&mut state.borrow_mut()))
}

unsafe fn read_str(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

fn is_registered(callback_id: u64) -> bool {
    callback_registry::is_registered(CallbackId::from_raw(callback_id))
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

unsafe extern "C" fn run_app(on_init: RunTrampoline, callback_id: u64) {
    let (app, times) = with_state(|s| {
        let app = next_addr();
        s.record("run_app", app, MockValue::Unit);
        s.run_registrations.push(callback_id);
        (app, s.run_invocations)
    });
    for _ in 0..times {
        on_init(callback_id, AppHandle::from_addr(app));
    }
}

unsafe extern "C" fn open_window(
    app: AppHandle,
    title: *const c_char,
    build: ViewBuilderTrampoline,
    release: ReleaseTrampoline,
    callback_id: u64,
) {
    let title = unsafe { read_str(title) };
    let registered_at_call = is_registered(callback_id);
    with_state(|s| {
        s.record("open_window", app.to_addr(), MockValue::Str(title.clone()));
        s.windows.push(MockWindow {
            title,
            callback_id,
            registered_at_call,
            closed: false,
            build,
            release,
        });
    });
}

static APP_API: TrellisAppApi = TrellisAppApi { run_app, open_window };

// ---------------------------------------------------------------------------
// Div
// ---------------------------------------------------------------------------

unsafe extern "C" fn div_create() -> DivHandle {
    with_state(|s| {
        let addr = s.alloc(NodeKind::Div);
        s.record("div_create", addr, MockValue::Unit);
        DivHandle::from_addr(addr)
    })
}

macro_rules! mock_div_unit {
    ($($name:ident),* $(,)?) => {$(
        pub(super) unsafe extern "C" fn $name(div: DivHandle) {
            with_state(|s| s.style(concat!("div_", stringify!($name)), stringify!($name), div.to_addr(), MockValue::Unit));
        }
    )*};
}

macro_rules! mock_div_value {
    ($ty:ty => $variant:ident: $($name:ident),* $(,)?) => {$(
        pub(super) unsafe extern "C" fn $name(div: DivHandle, value: $ty) {
            with_state(|s| s.style(concat!("div_", stringify!($name)), stringify!($name), div.to_addr(), MockValue::$variant(value)));
        }
    )*};
}

mod div_mock {
    use super::*;

    mock_div_unit!(flex, size_full);
    mock_div_value!(f32 => F32: w, h, size, p, m, gap, top, left, text_size, line_height, font_weight);
    mock_div_value!(u8 => U8: flex_direction, position, justify, items);
    mock_div_value!(u32 => U32: bg, text_color);
    mock_div_value!(bool => Bool: overflow_hidden);

    pub(super) unsafe extern "C" fn font_family(div: DivHandle, family: *const c_char) {
        let family = unsafe { read_str(family) };
        with_state(|s| s.style("div_font_family", "font_family", div.to_addr(), MockValue::Str(family)));
    }

    pub(super) unsafe extern "C" fn child_text(div: DivHandle, text: *const c_char) {
        let text = unsafe { read_str(text) };
        with_state(|s| {
            s.record("div_child_text", div.to_addr(), MockValue::Str(text.clone()));
            let leaf = s.alloc(NodeKind::Text(text));
            if let Some(parent) = s.nodes.get_mut(&div.to_addr()) {
                parent.children.push(leaf);
            }
        });
    }

    pub(super) unsafe extern "C" fn child(div: DivHandle, child: ElementHandle) {
        with_state(|s| {
            s.record("div_child", div.to_addr(), MockValue::Handle(child.to_addr()));
            let Some(node) = s.elements.get(&child.to_addr()).copied() else {
                return;
            };
            if let Some(parent) = s.nodes.get_mut(&div.to_addr()) {
                parent.children.push(node);
            }
        });
    }

    pub(super) unsafe extern "C" fn into_element(div: DivHandle) -> ElementHandle {
        ElementHandle::from_addr(with_state(|s| s.seal("div_into_element", div.to_addr())))
    }

    pub(super) unsafe extern "C" fn discard(div: DivHandle) {
        with_state(|s| {
            s.record("div_discard", div.to_addr(), MockValue::Unit);
            s.nodes.remove(&div.to_addr());
        });
    }
}

static DIV_API: TrellisDivApi = TrellisDivApi {
    create: div_create,
    flex: div_mock::flex,
    flex_direction: div_mock::flex_direction,
    size_full: div_mock::size_full,
    w: div_mock::w,
    h: div_mock::h,
    size: div_mock::size,
    p: div_mock::p,
    m: div_mock::m,
    gap: div_mock::gap,
    top: div_mock::top,
    left: div_mock::left,
    position: div_mock::position,
    justify: div_mock::justify,
    items: div_mock::items,
    overflow_hidden: div_mock::overflow_hidden,
    bg: div_mock::bg,
    text_color: div_mock::text_color,
    text_size: div_mock::text_size,
    line_height: div_mock::line_height,
    font_weight: div_mock::font_weight,
    font_family: div_mock::font_family,
    child_text: div_mock::child_text,
    child: div_mock::child,
    into_element: div_mock::into_element,
    discard: Some(div_mock::discard as unsafe extern "C" fn(DivHandle)),
};

// ---------------------------------------------------------------------------
// Svg
// ---------------------------------------------------------------------------

mod svg_mock {
    use super::*;

    pub(super) unsafe extern "C" fn create() -> SvgHandle {
        with_state(|s| {
            let addr = s.alloc(NodeKind::Svg);
            s.record("svg_create", addr, MockValue::Unit);
            SvgHandle::from_addr(addr)
        })
    }

    pub(super) unsafe extern "C" fn path(svg: SvgHandle, data: *const c_char) {
        let data = unsafe { read_str(data) };
        with_state(|s| s.style("svg_path", "path", svg.to_addr(), MockValue::Str(data)));
    }

    pub(super) unsafe extern "C" fn size(svg: SvgHandle, px: f32) {
        with_state(|s| s.style("svg_size", "size", svg.to_addr(), MockValue::F32(px)));
    }

    pub(super) unsafe extern "C" fn text_color(svg: SvgHandle, rgb: u32) {
        with_state(|s| s.style("svg_text_color", "text_color", svg.to_addr(), MockValue::U32(rgb)));
    }

    pub(super) unsafe extern "C" fn rotate(svg: SvgHandle, turns: f32) {
        with_state(|s| s.style("svg_rotate", "rotate", svg.to_addr(), MockValue::F32(turns)));
    }

    pub(super) unsafe extern "C" fn with_animation(
        svg: SvgHandle,
        id: *const c_char,
        duration_secs: f32,
        repeat: bool,
        tick: AnimationTickTrampoline,
        release: ReleaseTrampoline,
        callback_id: u64,
    ) {
        let id = unsafe { read_str(id) };
        let registered_at_call = is_registered(callback_id);
        with_state(|s| {
            s.record("svg_with_animation", svg.to_addr(), MockValue::Str(id.clone()));
            s.animations.push(MockAnimation {
                callback_id,
                id,
                duration_secs,
                repeat,
                registered_at_call,
                released: false,
                node: svg.to_addr(),
                tick,
                release,
            });
        });
    }

    pub(super) unsafe extern "C" fn into_element(svg: SvgHandle) -> ElementHandle {
        ElementHandle::from_addr(with_state(|s| s.seal("svg_into_element", svg.to_addr())))
    }

    pub(super) unsafe extern "C" fn discard(svg: SvgHandle) {
        with_state(|s| {
            s.record("svg_discard", svg.to_addr(), MockValue::Unit);
            s.nodes.remove(&svg.to_addr());
        });
    }
}

static SVG_API: TrellisSvgApi = TrellisSvgApi {
    create: svg_mock::create,
    path: svg_mock::path,
    size: svg_mock::size,
    text_color: svg_mock::text_color,
    rotate: svg_mock::rotate,
    with_animation: svg_mock::with_animation,
    into_element: svg_mock::into_element,
    discard: Some(svg_mock::discard as unsafe extern "C" fn(SvgHandle)),
};

// ---------------------------------------------------------------------------
// Element + logging
// ---------------------------------------------------------------------------

unsafe extern "C" fn create_text(text: *const c_char) -> ElementHandle {
    let text = unsafe { read_str(text) };
    with_state(|s| {
        let node = s.alloc(NodeKind::Text(text.clone()));
        if let Some(n) = s.nodes.get_mut(&node) {
            n.sealed = true;
        }
        let element = next_addr();
        s.elements.insert(element, node);
        s.record("create_text", element, MockValue::Str(text));
        ElementHandle::from_addr(element)
    })
}

unsafe extern "C" fn element_discard(element: ElementHandle) {
    with_state(|s| {
        s.record("element_discard", element.to_addr(), MockValue::Unit);
        s.elements.remove(&element.to_addr());
    });
}

static ELEMENT_API: TrellisElementApi = TrellisElementApi {
    create_text,
    discard: Some(element_discard as unsafe extern "C" fn(ElementHandle)),
};

unsafe extern "C" fn log(level: u8, msg: *const u8, msg_len: u32) {
    let bytes = unsafe { std::slice::from_raw_parts(msg, msg_len as usize) };
    let line = String::from_utf8_lossy(bytes).into_owned();
    with_state(|s| s.logs.push((level, line)));
}

static LOGGING_API: TrellisLoggingApi = TrellisLoggingApi { log };

static TABLE: TrellisApiTable = TrellisApiTable {
    version: TRELLIS_API_VERSION,
    app: &APP_API,
    div: &DIV_API,
    svg: &SVG_API,
    element: &ELEMENT_API,
    logging: &LOGGING_API,
};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// The mock API table.
pub fn table() -> *const TrellisApiTable {
    &TABLE
}

/// Install the mock table (idempotent) and reset this thread's mock state.
///
/// Panics if a different table is already installed in this process.
pub fn install() {
    with_state(|s| *s = MockState::default());
    if let Err(e) = init_api(table()) {
        panic!("mock native surface could not be installed: {e}");
    }
}

/// Every native call made on this thread since `install`.
pub fn calls() -> Vec<MockCall> {
    with_state(|s| s.calls.clone())
}

/// Every `(level, message)` sent to the native log sink on this thread.
pub fn logs() -> Vec<(u8, String)> {
    with_state(|s| s.logs.clone())
}

/// Number of live nodes in this thread's arena.
pub fn node_count() -> usize {
    with_state(|s| s.nodes.len())
}

/// Snapshot of the tree under a sealed element.
pub fn tree(element: ElementHandle) -> MockTree {
    with_state(|s| {
        let Some(node) = s.elements.get(&element.to_addr()).copied() else {
            panic!("mock: {:#x} is not a live element handle", element.to_addr());
        };
        s.snapshot(node)
    })
}

/// Callback ids passed to `run_app`, in order.
pub fn run_registrations() -> Vec<u64> {
    with_state(|s| s.run_registrations.clone())
}

/// How many times the next `run_app` calls the init trampoline (default 1).
pub fn set_run_invocations(times: usize) {
    with_state(|s| s.run_invocations = times);
}

pub fn windows() -> Vec<MockWindow> {
    with_state(|s| s.windows.clone())
}

/// Run one build cycle of window `index`. `None` if the window is closed or
/// the builder returned null.
pub fn redraw(index: usize) -> Option<MockTree> {
    let (build, callback_id) = with_state(|s| {
        let w = s.windows.get(index)?;
        (!w.closed).then_some((w.build, w.callback_id))
    })?;
    let element = build(callback_id);
    if element.is_null() {
        return None;
    }
    Some(tree(element))
}

/// Close window `index` and notify the runtime.
pub fn close_window(index: usize) {
    let notify = with_state(|s| {
        let w = s.windows.get_mut(index)?;
        if w.closed {
            return None;
        }
        w.closed = true;
        Some((w.release, w.callback_id))
    });
    if let Some((release, callback_id)) = notify {
        release(callback_id);
    }
}

pub fn animations() -> Vec<MockAnimation> {
    with_state(|s| s.animations.clone())
}

/// Position of the animation registered as `registration`.
pub fn animation_index(registration: CallbackId) -> Option<usize> {
    with_state(|s| {
        s.animations
            .iter()
            .position(|a| a.callback_id == registration.raw())
    })
}

/// Deliver one frame to animation `index` and return the fresh frame handle
/// the callback received.
pub fn tick(index: usize, delta: f32) -> SvgHandle {
    let (tick, callback_id, frame) = with_state(|s| {
        let Some(anim) = s.animations.get(index) else {
            panic!("mock: no animation at index {index}");
        };
        let (tick, callback_id, node) = (anim.tick, anim.callback_id, anim.node);
        let frame = next_addr();
        s.frames.insert(frame, node);
        (tick, callback_id, frame)
    });
    let handle = SvgHandle::from_addr(frame);
    tick(callback_id, handle, delta);
    handle
}

/// Drop the animated element and notify the runtime.
pub fn drop_animation(index: usize) {
    let notify = with_state(|s| {
        let a = s.animations.get_mut(index)?;
        if a.released {
            return None;
        }
        a.released = true;
        Some((a.release, a.callback_id))
    });
    if let Some((release, callback_id)) = notify {
        release(callback_id);
    }
}
