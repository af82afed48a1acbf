// Prelude: one-import access to the most commonly used Trellis types.
//
// Usage: `use trellis::prelude::*;`

// Builders, elements, bootstrap
pub use trellis_runtime::{
    div, rgb, run, svg, text, AnimatedSvg, Animation, App, Child, Div, Element, IntoElement, Rgb,
    Svg, SvgFrame, WindowId,
};

// Errors and logging
pub use trellis_runtime::{TrellisError, TrellisResult, LOG_DISPLAY, LOG_ERROR, LOG_WARNING};
pub use trellis_runtime::tlog;

// Assets
pub use trellis_runtime::{set_asset_source, AssetSource, FileAssets, InlineAssets};

// Style ordinals (for the generic `flex_direction`, `position`, `justify`, `items` setters)
pub use trellis_runtime::{AlignItems, FlexDirection, JustifyContent, Position};

// FFI handles (rarely needed directly, but useful for advanced cases)
pub use trellis_runtime::{AppHandle, DivHandle, ElementHandle, SvgHandle};
