/// Log severity understood by the native logging sub-table.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrellisLogLevel {
    Display = 0,
    Warning = 1,
    Error = 2,
}

impl TrellisLogLevel {
    /// Map a raw level byte back to a level. Unknown values clamp to `Error`.
    pub const fn from_u8(level: u8) -> Self {
        match level {
            0 => TrellisLogLevel::Display,
            1 => TrellisLogLevel::Warning,
            _ => TrellisLogLevel::Error,
        }
    }
}
