// Svg: builder wrapper around a native SVG handle, plus per-frame animation.
//
// `with_animation` is a type-state transition: the returned `AnimatedSvg`
// can only be sealed. Per-frame mutation goes through `SvgFrame`, which
// borrows the fresh handle the native side passes to each tick.

use std::time::Duration;

use trellis_ffi::SvgHandle;

use crate::api::{svg_api, try_api};
use crate::assets;
use crate::callback_registry::{self, Callback, CallbackId};
use crate::cstr::c_string;
use crate::element::{Child, Element, IntoElement};
use crate::error::{TrellisError, TrellisResult};
use crate::logging::{LOG_DISPLAY, LOG_ERROR};
use crate::style::Rgb;
use crate::tlog;
use crate::trampolines;

/// An SVG node under construction.
#[derive(Debug)]
pub struct Svg {
    handle: SvgHandle,
}

/// Shorthand for [`Svg::new`].
#[inline]
pub fn svg() -> Svg {
    Svg::new()
}

impl Svg {
    /// Acquire a new builder handle. Panics if the native surface cannot
    /// provide one.
    pub fn new() -> Self {
        match Self::try_new() {
            Ok(svg) => svg,
            Err(e) => panic!("[Trellis] {e}"),
        }
    }

    /// Fallible form of [`Svg::new`].
    pub fn try_new() -> TrellisResult<Self> {
        try_api()?;
        let handle = unsafe { (svg_api().create)() };
        if handle.is_null() {
            return Err(TrellisError::NullHandle("create_svg"));
        }
        Ok(Svg { handle })
    }

    /// # Safety
    /// `handle` must be a live, unsealed SVG builder handle not owned elsewhere.
    #[inline]
    pub unsafe fn from_raw(handle: SvgHandle) -> Self {
        Svg { handle }
    }

    #[inline]
    pub fn handle(&self) -> SvgHandle {
        self.handle
    }

    #[inline]
    pub fn into_raw(self) -> SvgHandle {
        let handle = self.handle;
        std::mem::forget(self);
        handle
    }

    /// Set the SVG source.
    ///
    /// `path` is resolved through the installed [`AssetSource`](crate::AssetSource);
    /// if it cannot be loaded it is sent as literal inline content instead,
    /// with a warning.
    pub fn path(self, path: &str) -> Self {
        let data = c_string(assets::resolve(path));
        unsafe { (svg_api().path)(self.handle, data.as_ptr()) };
        self
    }

    #[inline]
    pub fn size(self, px: f32) -> Self {
        unsafe { (svg_api().size)(self.handle, px) };
        self
    }

    #[inline]
    pub fn text_color(self, color: Rgb) -> Self {
        unsafe { (svg_api().text_color)(self.handle, color.to_u32()) };
        self
    }

    /// Rotate by `turns` (1.0 = full revolution).
    #[inline]
    pub fn rotate(self, turns: f32) -> Self {
        unsafe { (svg_api().rotate)(self.handle, turns) };
        self
    }

    /// Attach a per-frame animation.
    ///
    /// `tick` is retained until the native side reports the element gone (or
    /// for the rest of the process if it never does) and is called once per
    /// frame with the frame handle and a non-negative elapsed delta. Dropping
    /// the `AnimatedSvg` unsealed releases it immediately.
    pub fn with_animation<F>(self, id: &str, animation: Animation, mut tick: F) -> AnimatedSvg
    where
        F: FnMut(&mut SvgFrame, f32) + Send + 'static,
    {
        // Retain before handing anything to the native side: it may tick
        // synchronously from inside with_animation.
        let registration = callback_registry::register(Callback::AnimationTick(Box::new(
            move |frame: SvgHandle, delta: f32| {
                let mut frame = SvgFrame { handle: frame };
                tick(&mut frame, delta);
            },
        )));
        let id_c = c_string(id);
        let handle = self.into_raw();
        unsafe {
            (svg_api().with_animation)(
                handle,
                id_c.as_ptr(),
                animation.duration.as_secs_f32(),
                animation.repeat,
                trampolines::animation_tick_trampoline,
                trampolines::release_trampoline,
                registration.raw(),
            );
        }
        tlog!(
            LOG_DISPLAY,
            "animation '{id}' registered as {registration} ({:?}, repeat={})",
            animation.duration,
            animation.repeat
        );
        AnimatedSvg { handle, registration }
    }

    pub fn try_into_element(self) -> TrellisResult<Element> {
        seal(self.into_raw())
    }
}

impl Default for Svg {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Svg {
    fn drop(&mut self) {
        discard(self.handle);
    }
}

impl IntoElement for Svg {
    fn into_element(self) -> Element {
        match self.try_into_element() {
            Ok(element) => element,
            Err(e) => panic!("[Trellis] {e}"),
        }
    }
}

impl From<Svg> for Child {
    fn from(svg: Svg) -> Self {
        Child::Element(svg.into_element())
    }
}

fn seal(handle: SvgHandle) -> TrellisResult<Element> {
    let element = unsafe { (svg_api().into_element)(handle) };
    if element.is_null() {
        tlog!(LOG_ERROR, "into_element on svg {:#x} returned null; handle already sealed", handle.to_addr());
        return Err(TrellisError::AlreadySealed);
    }
    Ok(unsafe { Element::from_raw(element) })
}

fn discard(handle: SvgHandle) {
    if try_api().is_err() {
        return;
    }
    if let Some(discard) = svg_api().discard {
        unsafe { discard(handle) };
    }
}

// ---------------------------------------------------------------------------
// Animation
// ---------------------------------------------------------------------------

/// Timing parameters for [`Svg::with_animation`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Animation {
    pub duration: Duration,
    pub repeat: bool,
}

impl Animation {
    /// A single run of `duration`.
    pub fn new(duration: Duration) -> Self {
        Animation { duration, repeat: false }
    }

    /// Loop forever.
    pub fn repeat(mut self) -> Self {
        self.repeat = true;
        self
    }
}

/// An SVG with an animation attached. Can only be sealed.
#[derive(Debug)]
pub struct AnimatedSvg {
    handle: SvgHandle,
    registration: CallbackId,
}

impl AnimatedSvg {
    #[inline]
    pub fn handle(&self) -> SvgHandle {
        self.handle
    }

    /// The retained tick callback's registration.
    #[inline]
    pub fn registration(&self) -> CallbackId {
        self.registration
    }

    pub fn try_into_element(self) -> TrellisResult<Element> {
        let handle = self.handle;
        std::mem::forget(self);
        seal(handle)
    }
}

impl Drop for AnimatedSvg {
    fn drop(&mut self) {
        // Never attached: nothing native will tick or release it.
        discard(self.handle);
        callback_registry::release(self.registration);
    }
}

impl IntoElement for AnimatedSvg {
    fn into_element(self) -> Element {
        match self.try_into_element() {
            Ok(element) => element,
            Err(e) => panic!("[Trellis] {e}"),
        }
    }
}

impl From<AnimatedSvg> for Child {
    fn from(svg: AnimatedSvg) -> Self {
        Child::Element(svg.into_element())
    }
}

/// Per-frame view of an animated SVG, valid only inside a tick callback.
///
/// The handle belongs to the native side; the frame never seals or discards it.
#[derive(Debug)]
pub struct SvgFrame {
    handle: SvgHandle,
}

impl SvgFrame {
    #[inline]
    pub fn handle(&self) -> SvgHandle {
        self.handle
    }

    #[inline]
    pub fn rotate(&mut self, turns: f32) -> &mut Self {
        unsafe { (svg_api().rotate)(self.handle, turns) };
        self
    }

    #[inline]
    pub fn size(&mut self, px: f32) -> &mut Self {
        unsafe { (svg_api().size)(self.handle, px) };
        self
    }

    #[inline]
    pub fn text_color(&mut self, color: Rgb) -> &mut Self {
        unsafe { (svg_api().text_color)(self.handle, color.to_u32()) };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::rgb;
    use crate::testing::{self, MockValue};

    const INLINE_ICON: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\"/>";

    #[test]
    fn svg_mutators_forward_once_each() {
        testing::install();
        let s = svg().size(48.0).text_color(rgb(0x00ff00)).rotate(0.25).path(INLINE_ICON);
        let ops: Vec<_> = testing::calls()
            .into_iter()
            .filter(|c| c.target == s.handle().to_addr())
            .map(|c| (c.op, c.value))
            .collect();
        assert_eq!(
            ops,
            vec![
                ("svg_create", MockValue::Unit),
                ("svg_size", MockValue::F32(48.0)),
                ("svg_text_color", MockValue::U32(0x00ff00)),
                ("svg_rotate", MockValue::F32(0.25)),
                ("svg_path", MockValue::Str(INLINE_ICON.into())),
            ]
        );
    }

    #[test]
    fn animation_registers_before_the_native_call() {
        testing::install();
        let animated = svg()
            .size(20.0)
            .with_animation("spin", Animation::new(Duration::from_secs(2)).repeat(), |frame, delta| {
                frame.rotate(delta);
            });
        let registration = animated.registration();
        assert!(callback_registry::is_registered(registration));

        let anims = testing::animations();
        let anim = anims
            .iter()
            .find(|a| a.callback_id == registration.raw())
            .expect("animation recorded");
        assert_eq!(anim.id, "spin");
        assert_eq!(anim.duration_secs, 2.0);
        assert!(anim.repeat);
        // The native surface saw the registration already in place.
        assert!(anim.registered_at_call);
    }

    #[test]
    fn frame_mutations_target_the_frame_handle() {
        testing::install();
        let animated = svg().with_animation("pulse", Animation::new(Duration::from_millis(500)), |frame, delta| {
            frame.size(10.0 + delta).text_color(rgb(0x123456));
        });
        let index = testing::animation_index(animated.registration()).expect("animation recorded");
        let _element = animated.into_element();

        let frame = testing::tick(index, 0.5);
        let ops: Vec<_> = testing::calls()
            .into_iter()
            .filter(|c| c.target == frame.to_addr())
            .map(|c| (c.op, c.value))
            .collect();
        assert_eq!(
            ops,
            vec![
                ("svg_size", MockValue::F32(10.5)),
                ("svg_text_color", MockValue::U32(0x123456)),
            ]
        );
    }

    #[test]
    fn animated_svg_seals_to_one_element() {
        testing::install();
        let element = svg()
            .with_animation("once", Animation::new(Duration::from_secs(1)), |_, _| {})
            .into_element();
        assert!(!element.handle().is_null());
    }

    #[test]
    fn dropping_an_unsealed_animated_svg_releases_its_tick() {
        testing::install();
        let animated = svg().with_animation("abandoned", Animation::new(Duration::from_secs(1)), |_, _| {});
        let registration = animated.registration();
        let addr = animated.handle().to_addr();
        drop(animated);

        assert!(testing::calls()
            .iter()
            .any(|c| c.op == "svg_discard" && c.target == addr));
        assert!(!callback_registry::is_registered(registration));
    }

    #[test]
    fn sealing_a_consumed_svg_is_reported() {
        testing::install();
        let s = svg().path(INLINE_ICON);
        let raw = s.handle();
        let _first = s.into_element();
        let again = unsafe { Svg::from_raw(raw) };
        assert!(matches!(again.try_into_element(), Err(TrellisError::AlreadySealed)));
        assert!(testing::logs()
            .iter()
            .any(|(level, msg)| *level == LOG_ERROR && msg.contains("already sealed")));
    }
}
