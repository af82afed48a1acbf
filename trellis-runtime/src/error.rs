// Error types for the trellis runtime.

use std::fmt;

use crate::callback_registry::CallbackId;

/// Rich error type for trellis operations.
#[derive(Debug)]
pub enum TrellisError {
    /// The native library or its API table could not be resolved.
    NativeUnavailable(String),
    /// A native constructor returned a null handle.
    NullHandle(&'static str),
    /// The native side refused to seal a builder it had already consumed.
    AlreadySealed,
    ApiVersionMismatch { expected: u32, found: u32 },
    /// A different API table was installed earlier in this process.
    AlreadyInitialized,
    CallbackNotRegistered(CallbackId),
    /// An asset could not be loaded. Recovered by the caller, never fatal.
    Asset { path: String, message: String },
}

impl fmt::Display for TrellisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrellisError::NativeUnavailable(msg) => write!(f, "native surface unavailable: {msg}"),
            TrellisError::NullHandle(what) => write!(f, "native constructor returned null: {what}"),
            TrellisError::AlreadySealed => write!(f, "builder handle was already sealed"),
            TrellisError::ApiVersionMismatch { expected, found } => {
                write!(f, "API table version mismatch: expected {expected}, found {found}")
            }
            TrellisError::AlreadyInitialized => {
                write!(f, "a different API table is already installed")
            }
            TrellisError::CallbackNotRegistered(id) => write!(f, "callback {id} is not registered"),
            TrellisError::Asset { path, message } => write!(f, "asset {path}: {message}"),
        }
    }
}

impl std::error::Error for TrellisError {}

/// Convenience alias used throughout the runtime.
pub type TrellisResult<T> = Result<T, TrellisError>;
