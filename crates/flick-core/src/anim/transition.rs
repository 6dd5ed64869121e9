//! A timed interpolation between two offsets.

use std::time::Duration;

use tokio::time::Instant;

use super::easing::Easing;
use super::timing::{lerp_vec2, progress};
use crate::geometry::Vec2;

/// An in-flight animated move of the surface offset.
///
/// Installed by programmatic scrolls (`animated = true`) and by the
/// overscroll bounce; sampled once per simulation tick until complete.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    start: Instant,
    from: Vec2,
    to: Vec2,
    duration: Duration,
    easing: Easing,
}

impl Transition {
    /// Begin a transition at `start`, moving from `from` to `to`.
    pub fn new(start: Instant, from: Vec2, to: Vec2, duration: Duration, easing: Easing) -> Self {
        Self {
            start,
            from,
            to,
            duration,
            easing,
        }
    }

    /// The final offset this transition lands on.
    #[inline]
    pub fn target(&self) -> Vec2 {
        self.to
    }

    /// Interpolated offset at time `now`.
    #[inline]
    pub fn sample(&self, now: Instant) -> Vec2 {
        let t = progress(self.start, now, self.duration);
        lerp_vec2(self.from, self.to, self.easing.apply(t))
    }

    /// Whether the transition has run its full duration at time `now`.
    #[inline]
    pub fn is_complete(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start) >= self.duration
    }
}
