//! Flick core: a physics-based kinetic scroll engine.
//!
//! Converts raw pointer-drag input into a continuously animated offset with
//! inertia, friction-based deceleration, and elastic overscroll, while
//! keeping a debounced registry of tracked element positions so the surface
//! can scroll any element into view. Rendering is left entirely to the host;
//! the engine consumes layout measurements and produces an offset.

pub mod anim;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod motion;
pub mod registry;

pub use config::SurfaceConfig;
pub use engine::{Command, EngineService, TICK_INTERVAL};
pub use error::{Error, Result};
pub use geometry::{Axis, Direction, Rect, Vec2};
pub use motion::{Align, MotionSnapshot, MotionState};
pub use registry::{ElementId, DEBOUNCE_INTERVAL, MOVE_THRESHOLD};
