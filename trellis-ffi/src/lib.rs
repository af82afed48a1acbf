// trellis-ffi: #[repr(C)] types, handle types, API table definition.
// Zero external dependencies. This crate defines the complete Rust <-> native contract.

pub mod handles;
pub mod error;
pub mod api_table;
pub mod callbacks;
pub mod style;
pub mod contract_tests;

pub use handles::*;
pub use error::*;
pub use api_table::*;
pub use callbacks::*;
pub use style::*;
