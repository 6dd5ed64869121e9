//! 2D vector and rectangle math used throughout the engine.
//!
//! All motion quantities (offset, velocity, acceleration, overflow) are
//! [`Vec2`] values. Axis participation is handled once, by [`Vec2::masked`],
//! so the rest of the engine stays free of per-axis branching.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Which axes participate in drag and inertia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Vertical motion only.
    Vertical,
    /// Horizontal motion only.
    Horizontal,
    /// Free motion on both axes.
    Both,
}

impl Axis {
    /// Whether the vertical axis participates.
    #[inline]
    pub fn vertical(self) -> bool {
        matches!(self, Axis::Vertical | Axis::Both)
    }

    /// Whether the horizontal axis participates.
    #[inline]
    pub fn horizontal(self) -> bool {
        matches!(self, Axis::Horizontal | Axis::Both)
    }
}

/// Scroll direction of the surface.
///
/// `Reverse` inverts the visual offset sign and flips how element positions
/// are measured (from the far edge instead of the near edge), so a chat-style
/// bottom-up surface can reuse the same scrolling logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Measured from the top/leading edge.
    Normal,
    /// Measured from the bottom/trailing edge.
    Reverse,
}

impl Direction {
    /// Sign applied to edge-relative measurements: `+1.0` for `Normal`,
    /// `-1.0` for `Reverse`.
    #[inline]
    pub fn scale(self) -> f64 {
        match self {
            Direction::Normal => 1.0,
            Direction::Reverse => -1.0,
        }
    }
}

/// A 2-component vector of `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    /// Create a vector from components.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Zero out the components whose axis does not participate in `axis`.
    #[inline]
    pub fn masked(self, axis: Axis) -> Self {
        Self {
            x: if axis.horizontal() { self.x } else { 0.0 },
            y: if axis.vertical() { self.y } else { 0.0 },
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec2) {
        *self = *self + rhs;
    }
}

impl SubAssign for Vec2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vec2) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    #[inline]
    fn mul(self, k: f64) -> Vec2 {
        Vec2::new(self.x * k, self.y * k)
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;

    #[inline]
    fn div(self, k: f64) -> Vec2 {
        Vec2::new(self.x / k, self.y / k)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// An axis-aligned rectangle: origin plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    /// The zero rectangle.
    pub const ZERO: Rect = Rect {
        origin: Vec2::ZERO,
        size: Vec2::ZERO,
    };

    /// Create a rectangle from origin and size components.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.size.y
    }
}
