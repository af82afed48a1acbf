// Ordinal enums passed as `u8` to the native style setters.

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum FlexDirection {
    #[default]
    Row = 0,
    Column = 1,
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Position {
    #[default]
    Relative = 0,
    Absolute = 1,
}

/// Main-axis distribution.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum JustifyContent {
    #[default]
    Start = 0,
    Center = 1,
    End = 2,
    Between = 3,
}

/// Cross-axis alignment.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum AlignItems {
    #[default]
    Start = 0,
    Center = 1,
    End = 2,
}

macro_rules! impl_from_ordinal {
    ($ty:ident { $($val:literal => $variant:ident),+ $(,)? }) => {
        impl $ty {
            /// Decode an ordinal received over FFI. Unknown values yield `None`.
            pub const fn from_u8(v: u8) -> Option<Self> {
                match v {
                    $($val => Some($ty::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

impl_from_ordinal!(FlexDirection { 0 => Row, 1 => Column });
impl_from_ordinal!(Position { 0 => Relative, 1 => Absolute });
impl_from_ordinal!(JustifyContent { 0 => Start, 1 => Center, 2 => End, 3 => Between });
impl_from_ordinal!(AlignItems { 0 => Start, 1 => Center, 2 => End });
