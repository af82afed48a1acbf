// Sealed elements and the child composition protocol.
//
// An `Element` is the result of sealing a builder. It has no mutators; the
// only things it can do are become a child of a `Div` or become the contents
// of a window. Either way ownership of the native handle moves across.

use trellis_ffi::ElementHandle;

use crate::api::{element_api, try_api};
use crate::cstr::c_string;
use crate::error::{TrellisError, TrellisResult};

/// A sealed, immutable node.
///
/// Dropping an `Element` that was never attached or returned calls the
/// native `discard` entry when the surface provides one.
#[derive(Debug)]
pub struct Element {
    handle: ElementHandle,
}

impl Element {
    /// Wrap a raw element handle.
    ///
    /// # Safety
    /// `handle` must be a live, unattached element handle that nobody else
    /// will hand back to the native side.
    #[inline]
    pub unsafe fn from_raw(handle: ElementHandle) -> Self {
        Element { handle }
    }

    /// The underlying handle. Still owned by this `Element`.
    #[inline]
    pub fn handle(&self) -> ElementHandle {
        self.handle
    }

    /// Give up ownership of the handle without discarding it.
    #[inline]
    pub fn into_raw(self) -> ElementHandle {
        let handle = self.handle;
        std::mem::forget(self);
        handle
    }
}

impl Drop for Element {
    fn drop(&mut self) {
        if self.handle.is_null() || try_api().is_err() {
            return;
        }
        if let Some(discard) = element_api().discard {
            unsafe { discard(self.handle) };
        }
    }
}

/// Conversion into a sealed element. Sealing is one-way.
pub trait IntoElement {
    fn into_element(self) -> Element;
}

/// Sealing an already sealed element returns it unchanged: same handle,
/// no native call.
impl IntoElement for Element {
    #[inline]
    fn into_element(self) -> Element {
        self
    }
}

/// A child as decided by the producer: inline text or a sealed element.
#[derive(Debug)]
pub enum Child {
    /// Inserted with a single `child_text` call; never becomes an `Element`.
    Text(String),
    Element(Element),
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_owned())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl From<&String> for Child {
    fn from(text: &String) -> Self {
        Child::Text(text.clone())
    }
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Child::Element(element)
    }
}

/// Create a standalone sealed text element via the native `create_text` entry.
///
/// Unlike `Div::child("...")`, this produces an `Element` that can be placed
/// anywhere an element is accepted, including as window contents.
pub fn text(content: impl Into<Vec<u8>>) -> Element {
    match try_text(content) {
        Ok(element) => element,
        Err(e) => panic!("[Trellis] {e}"),
    }
}

/// Fallible form of [`text`].
pub fn try_text(content: impl Into<Vec<u8>>) -> TrellisResult<Element> {
    try_api()?;
    let content = c_string(content);
    let handle = unsafe { (element_api().create_text)(content.as_ptr()) };
    if handle.is_null() {
        return Err(TrellisError::NullHandle("create_text"));
    }
    Ok(Element { handle })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, MockTree};

    #[test]
    fn sealing_an_element_is_idempotent() {
        testing::install();
        let element = text("leaf");
        let handle = element.handle();
        let again = element.into_element();
        assert_eq!(again.handle(), handle);
        assert_eq!(again.into_element().handle(), handle);
    }

    #[test]
    fn standalone_text_is_a_text_leaf() {
        testing::install();
        let element = text("standalone");
        assert_eq!(testing::tree(element.handle()), MockTree::Text("standalone".into()));
    }

    #[test]
    fn dropping_an_unattached_element_discards_it() {
        testing::install();
        let element = text("orphan");
        let addr = element.handle().to_addr();
        drop(element);
        assert!(testing::calls()
            .iter()
            .any(|c| c.op == "element_discard" && c.target == addr));
    }

    #[test]
    fn into_raw_hands_over_without_discard() {
        testing::install();
        let raw = text("kept").into_raw();
        assert!(!testing::calls()
            .iter()
            .any(|c| c.op == "element_discard" && c.target == raw.to_addr()));
    }

    #[test]
    fn strings_become_text_children() {
        assert!(matches!(Child::from("a"), Child::Text(ref s) if s == "a"));
        assert!(matches!(Child::from(String::from("b")), Child::Text(ref s) if s == "b"));
    }
}
