// Div: builder wrapper around a native container handle.
//
// Every mutator forwards to exactly one native call and returns the same
// wrapper (same handle) for chaining. Sealing consumes the builder.

use trellis_ffi::{AlignItems, DivHandle, FlexDirection, JustifyContent, Position};

use crate::api::{div_api, try_api};
use crate::cstr::c_string;
use crate::element::{Child, Element, IntoElement};
use crate::error::{TrellisError, TrellisResult};
use crate::logging::LOG_ERROR;
use crate::style::Rgb;
use crate::tlog;

/// A container node under construction.
///
/// Exclusively owns one builder handle. Dropping an unsealed `Div` calls the
/// native `discard` entry when the surface provides one.
#[derive(Debug)]
pub struct Div {
    handle: DivHandle,
}

/// Shorthand for [`Div::new`].
#[inline]
pub fn div() -> Div {
    Div::new()
}

macro_rules! div_unit {
    ($(#[$meta:meta])* $name:ident => $field:ident) => {
        $(#[$meta])*
        #[inline]
        pub fn $name(self) -> Self {
            unsafe { (div_api().$field)(self.handle) };
            self
        }
    };
}

macro_rules! div_px {
    ($(#[$meta:meta])* $name:ident => $field:ident) => {
        $(#[$meta])*
        #[inline]
        pub fn $name(self, px: f32) -> Self {
            unsafe { (div_api().$field)(self.handle, px) };
            self
        }
    };
}

macro_rules! div_color {
    ($(#[$meta:meta])* $name:ident => $field:ident) => {
        $(#[$meta])*
        #[inline]
        pub fn $name(self, color: Rgb) -> Self {
            unsafe { (div_api().$field)(self.handle, color.to_u32()) };
            self
        }
    };
}

impl Div {
    /// Acquire a new builder handle.
    ///
    /// Panics if no API table is installed or the native constructor returns
    /// null: the surface cannot build anything at that point.
    pub fn new() -> Self {
        match Self::try_new() {
            Ok(div) => div,
            Err(e) => panic!("[Trellis] {e}"),
        }
    }

    /// Fallible form of [`Div::new`].
    pub fn try_new() -> TrellisResult<Self> {
        try_api()?;
        let handle = unsafe { (div_api().create)() };
        if handle.is_null() {
            return Err(TrellisError::NullHandle("create_div"));
        }
        Ok(Div { handle })
    }

    /// Wrap a raw builder handle.
    ///
    /// # Safety
    /// `handle` must be a live, unsealed builder handle not owned elsewhere.
    #[inline]
    pub unsafe fn from_raw(handle: DivHandle) -> Self {
        Div { handle }
    }

    #[inline]
    pub fn handle(&self) -> DivHandle {
        self.handle
    }

    /// Give up ownership of the handle without discarding it.
    #[inline]
    pub fn into_raw(self) -> DivHandle {
        let handle = self.handle;
        std::mem::forget(self);
        handle
    }

    // -- Layout --

    div_unit!(flex => flex);
    div_unit!(size_full => size_full);

    #[inline]
    pub fn flex_direction(self, direction: FlexDirection) -> Self {
        unsafe { (div_api().flex_direction)(self.handle, direction as u8) };
        self
    }

    #[inline]
    pub fn flex_col(self) -> Self {
        self.flex_direction(FlexDirection::Column)
    }

    #[inline]
    pub fn flex_row(self) -> Self {
        self.flex_direction(FlexDirection::Row)
    }

    div_px!(w => w);
    div_px!(h => h);
    div_px!(
        /// Width and height at once.
        size => size
    );
    div_px!(
        /// Padding on all sides.
        p => p
    );
    div_px!(
        /// Margin on all sides.
        m => m
    );
    div_px!(gap => gap);
    div_px!(top => top);
    div_px!(left => left);

    #[inline]
    pub fn position(self, position: Position) -> Self {
        unsafe { (div_api().position)(self.handle, position as u8) };
        self
    }

    #[inline]
    pub fn relative(self) -> Self {
        self.position(Position::Relative)
    }

    #[inline]
    pub fn absolute(self) -> Self {
        self.position(Position::Absolute)
    }

    #[inline]
    pub fn overflow_hidden(self, hidden: bool) -> Self {
        unsafe { (div_api().overflow_hidden)(self.handle, hidden) };
        self
    }

    // -- Alignment --

    #[inline]
    pub fn justify(self, mode: JustifyContent) -> Self {
        unsafe { (div_api().justify)(self.handle, mode as u8) };
        self
    }

    #[inline]
    pub fn justify_start(self) -> Self {
        self.justify(JustifyContent::Start)
    }

    #[inline]
    pub fn justify_center(self) -> Self {
        self.justify(JustifyContent::Center)
    }

    #[inline]
    pub fn justify_end(self) -> Self {
        self.justify(JustifyContent::End)
    }

    #[inline]
    pub fn justify_between(self) -> Self {
        self.justify(JustifyContent::Between)
    }

    #[inline]
    pub fn items(self, mode: AlignItems) -> Self {
        unsafe { (div_api().items)(self.handle, mode as u8) };
        self
    }

    #[inline]
    pub fn items_start(self) -> Self {
        self.items(AlignItems::Start)
    }

    #[inline]
    pub fn items_center(self) -> Self {
        self.items(AlignItems::Center)
    }

    #[inline]
    pub fn items_end(self) -> Self {
        self.items(AlignItems::End)
    }

    // -- Color --

    div_color!(bg => bg);
    div_color!(text_color => text_color);

    // -- Text styling --

    div_px!(text_size => text_size);
    div_px!(line_height => line_height);

    /// Numeric font weight (400 regular, 700 bold).
    #[inline]
    pub fn font_weight(self, weight: f32) -> Self {
        unsafe { (div_api().font_weight)(self.handle, weight) };
        self
    }

    pub fn font_family(self, family: &str) -> Self {
        let family = c_string(family);
        unsafe { (div_api().font_family)(self.handle, family.as_ptr()) };
        self
    }

    // -- Composition --

    /// Append a child: text goes in as a leaf with one call, anything else is
    /// sealed first and its element handle handed over.
    pub fn child(self, child: impl Into<Child>) -> Self {
        match child.into() {
            Child::Text(text) => {
                let text = c_string(text);
                unsafe { (div_api().child_text)(self.handle, text.as_ptr()) };
            }
            Child::Element(element) => {
                let element = element.into_raw();
                unsafe { (div_api().child)(self.handle, element) };
            }
        }
        self
    }

    /// Append children in iteration order.
    pub fn children<I>(self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Child>,
    {
        children.into_iter().fold(self, |div, child| div.child(child))
    }

    /// Seal into an element, reporting a consumed builder as an error.
    pub fn try_into_element(self) -> TrellisResult<Element> {
        let handle = self.into_raw();
        let element = unsafe { (div_api().into_element)(handle) };
        if element.is_null() {
            tlog!(LOG_ERROR, "into_element on div {:#x} returned null; handle already sealed", handle.to_addr());
            return Err(TrellisError::AlreadySealed);
        }
        Ok(unsafe { Element::from_raw(element) })
    }
}

impl Default for Div {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Div {
    fn drop(&mut self) {
        if try_api().is_err() {
            return;
        }
        if let Some(discard) = div_api().discard {
            unsafe { discard(self.handle) };
        }
    }
}

impl IntoElement for Div {
    fn into_element(self) -> Element {
        match self.try_into_element() {
            Ok(element) => element,
            Err(e) => panic!("[Trellis] {e}"),
        }
    }
}

impl From<Div> for Child {
    fn from(div: Div) -> Self {
        Child::Element(div.into_element())
    }
}
