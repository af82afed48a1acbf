use std::ffi::c_void;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        pub struct $name(pub *mut c_void);

        impl $name {
            /// The null handle. Native constructors return it on failure.
            #[inline]
            pub const fn null() -> Self {
                Self(std::ptr::null_mut())
            }

            #[inline]
            pub fn is_null(&self) -> bool {
                self.0.is_null()
            }

            /// Rebuild a handle from a plain address (test doubles, logging).
            #[inline]
            pub fn from_addr(addr: u64) -> Self {
                Self(addr as usize as *mut c_void)
            }

            #[inline]
            pub fn to_addr(&self) -> u64 {
                self.0 as usize as u64
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::null()
            }
        }

        // Handles are raw identifiers owned by the native surface. Moving them
        // between threads is fine; using them is governed by the native run loop.
        unsafe impl Send for $name {}
        unsafe impl Sync for $name {}
    };
}

define_handle!(
    /// Opaque handle to the running native application. Valid for the
    /// duration of the run loop only.
    AppHandle
);

define_handle!(
    /// Builder handle for a container node that is still under construction.
    DivHandle
);

define_handle!(
    /// Builder handle for an SVG node that is still under construction.
    /// Also passed to animation ticks as a fresh per-frame handle.
    SvgHandle
);

define_handle!(
    /// Sealed, immutable element. Insertable as a child or returned as window
    /// contents; ownership moves to the native side at that point.
    ElementHandle
);
