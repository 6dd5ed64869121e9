//! Time calculation utilities for scroll animations.
//!
//! Pure functions; the current time is always passed in explicitly so the
//! callers stay deterministic under tokio's paused test clock.

use std::time::Duration;

use tokio::time::Instant;

use crate::geometry::Vec2;

/// Calculate animation progress (0.0 to 1.0) from start time and duration
///
/// Zero-duration animations report completion immediately.
#[inline]
pub fn progress(start: Instant, now: Instant, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(start);
    let ratio = elapsed.as_secs_f64() / duration.as_secs_f64();
    ratio.clamp(0.0, 1.0)
}

/// Linear interpolation between two values
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Linear interpolation between two vectors, component-wise
#[inline]
pub fn lerp_vec2(from: Vec2, to: Vec2, t: f64) -> Vec2 {
    Vec2::new(lerp(from.x, to.x, t), lerp(from.y, to.y, t))
}
