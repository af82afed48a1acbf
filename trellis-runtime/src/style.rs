// Style value types shared by the builders.

/// A packed `0xRRGGBB` color, passed to the native side as a `u32`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0x000000);
    pub const WHITE: Rgb = Rgb(0xffffff);

    /// Build from channels.
    pub const fn from_channels(r: u8, g: u8, b: u8) -> Self {
        Rgb(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// The value sent across FFI. Bits above the low 24 are masked off.
    #[inline]
    pub const fn to_u32(self) -> u32 {
        self.0 & 0x00ff_ffff
    }
}

impl From<u32> for Rgb {
    fn from(hex: u32) -> Self {
        Rgb(hex)
    }
}

/// Shorthand for `Rgb(hex)`.
#[inline]
pub const fn rgb(hex: u32) -> Rgb {
    Rgb(hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_pack_as_rrggbb() {
        assert_eq!(Rgb::from_channels(0x4a, 0x90, 0xe2), rgb(0x4a90e2));
    }

    #[test]
    fn alpha_bits_are_masked() {
        assert_eq!(rgb(0xff11_2233).to_u32(), 0x11_2233);
    }
}
