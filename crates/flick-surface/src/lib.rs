//! Flick surface: the host-facing controller over the drag/inertia engine.
//!
//! Bridges gesture recognition and layout measurement into engine commands,
//! and maps the engine's offset to the transform and alignment corner the
//! host applies when rendering.

pub mod layout;
pub mod surface;

pub use layout::{content_alignment, render_transform, ContentAlignment};
pub use surface::{Surface, COORDINATE_SPACE};
