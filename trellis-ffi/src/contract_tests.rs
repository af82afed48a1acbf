// Compile-time contract tests: ensure handle sizes match the native side's expectations.
// These const assertions fail at compile time if sizes drift.

use std::mem::size_of;

use crate::error::TrellisLogLevel;
use crate::handles::*;
use crate::style::*;

const _: () = assert!(size_of::<AppHandle>() == size_of::<usize>());
const _: () = assert!(size_of::<DivHandle>() == size_of::<usize>());
const _: () = assert!(size_of::<SvgHandle>() == size_of::<usize>());
const _: () = assert!(size_of::<ElementHandle>() == size_of::<usize>());
const _: () = assert!(size_of::<TrellisLogLevel>() == 1);
const _: () = assert!(size_of::<FlexDirection>() == 1);
const _: () = assert!(size_of::<Position>() == 1);
const _: () = assert!(size_of::<JustifyContent>() == 1);
const _: () = assert!(size_of::<AlignItems>() == 1);
// Optional discard entries rely on the null-pointer niche.
const _: () = assert!(
    size_of::<Option<unsafe extern "C" fn(DivHandle)>>() == size_of::<usize>()
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_round_trip_through_u8() {
        assert_eq!(JustifyContent::from_u8(JustifyContent::Between as u8), Some(JustifyContent::Between));
        assert_eq!(AlignItems::from_u8(3), None);
        assert_eq!(FlexDirection::from_u8(1), Some(FlexDirection::Column));
    }

    #[test]
    fn null_handles_report_null() {
        assert!(ElementHandle::null().is_null());
        assert!(!DivHandle::from_addr(0x10).is_null());
        assert_eq!(SvgHandle::from_addr(0x20).to_addr(), 0x20);
    }

    #[test]
    fn unknown_log_levels_clamp_to_error() {
        assert_eq!(TrellisLogLevel::from_u8(1), TrellisLogLevel::Warning);
        assert_eq!(TrellisLogLevel::from_u8(200), TrellisLogLevel::Error);
    }
}
