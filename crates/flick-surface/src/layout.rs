//! Render mapping: from engine offset to the transform and layout corner
//! the host applies to its content.

use flick_core::{Axis, Direction, Vec2};

/// The corner the host should pin the content to, given the surface's axis
/// and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentAlignment {
    TopLeading,
    Top,
    Leading,
    BottomTrailing,
    Bottom,
    Trailing,
}

/// Translation the host applies to the content for a given engine offset.
///
/// A normal surface renders content shifted by the negated offset; a reverse
/// surface applies the raw offset against its far-edge anchoring.
#[inline]
pub fn render_transform(direction: Direction, offset: Vec2) -> Vec2 {
    match direction {
        Direction::Normal => -offset,
        Direction::Reverse => offset,
    }
}

/// Layout corner consistent with the surface's axis and direction.
pub fn content_alignment(axis: Axis, direction: Direction) -> ContentAlignment {
    match (axis, direction) {
        (Axis::Both, Direction::Normal) => ContentAlignment::TopLeading,
        (Axis::Both, Direction::Reverse) => ContentAlignment::BottomTrailing,
        (Axis::Vertical, Direction::Normal) => ContentAlignment::Top,
        (Axis::Vertical, Direction::Reverse) => ContentAlignment::Bottom,
        (Axis::Horizontal, Direction::Normal) => ContentAlignment::Leading,
        (Axis::Horizontal, Direction::Reverse) => ContentAlignment::Trailing,
    }
}
