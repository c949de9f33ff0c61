//! Renderer-facing frame data
//!
//! Nothing here draws. A `Frame` is a flat, plain-old-data snapshot of the
//! session that a GPU or canvas backend can upload as-is.

pub mod frame;
pub mod instance;

pub use frame::{Frame, TextLabel};
pub use instance::{CircleInstance, LineInstance, RectInstance, circle_kind, parse_hex_color, rect_kind};
