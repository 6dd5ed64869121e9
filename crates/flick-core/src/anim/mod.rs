//! Animation primitives for programmatic scrolls and overscroll bounce.
//!
//! - `easing` - Pure easing functions (cubic, quintic, exponential)
//! - `timing` - Time calculation utilities (progress, interpolation)
//! - `transition` - A timed interpolation between two offsets
//!
//! The drag engine installs a [`Transition`] for animated jumps and for the
//! spring-back out of overscroll, then samples it every simulation tick.

pub mod easing;
pub mod timing;
pub mod transition;

pub use easing::Easing;
pub use transition::Transition;
