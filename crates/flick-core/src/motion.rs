//! Shared motion state of a scrollable surface.
//!
//! One [`MotionState`] exists per surface instance, owned by the engine
//! service task. The drag engine mutates the offset during simulation ticks;
//! everything else observes it through [`MotionSnapshot`] values published on
//! a watch channel.

use std::collections::HashMap;
use std::sync::Arc;

use bitflags::bitflags;

use crate::config::SurfaceConfig;
use crate::geometry::{Axis, Direction, Rect, Vec2};
use crate::registry::ElementId;

bitflags! {
    /// Edge/center selection flags for scroll targeting.
    ///
    /// Used twice by [`MotionState::scroll_target`]: as the *anchor* (which
    /// point within the element is aligned) and as the *alignment* (which
    /// point within the viewport that anchor lands on).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Align: u8 {
        const VERTICAL_START = 1 << 0;
        const VERTICAL_CENTER = 1 << 1;
        const VERTICAL_END = 1 << 2;
        const HORIZONTAL_START = 1 << 3;
        const HORIZONTAL_CENTER = 1 << 4;
        const HORIZONTAL_END = 1 << 5;

        /// Top edge (vertical start).
        const TOP = Self::VERTICAL_START.bits();
        /// Bottom edge (vertical end).
        const BOTTOM = Self::VERTICAL_END.bits();
        /// Leading edge (horizontal start).
        const LEADING = Self::HORIZONTAL_START.bits();
        /// Trailing edge (horizontal end).
        const TRAILING = Self::HORIZONTAL_END.bits();
        /// Centered on both axes.
        const CENTER = Self::VERTICAL_CENTER.bits() | Self::HORIZONTAL_CENTER.bits();
    }
}

/// The externally observable state of a surface at one instant.
///
/// Velocity and acceleration are owned by the drag engine but exposed here
/// for display and debugging. The positions map is shared, not copied, so
/// publishing at tick rate stays cheap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MotionSnapshot {
    pub offset: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub overflow: Vec2,
    pub frame: Rect,
    pub content_size: Vec2,
    pub positions: Arc<HashMap<ElementId, Rect>>,
}

/// Shared, mutable state of one scrollable surface.
#[derive(Debug)]
pub struct MotionState {
    /// Current scroll translation, in content coordinates before direction
    /// flipping.
    pub offset: Vec2,
    /// Viewport bounds in the surface coordinate space.
    pub frame: Rect,
    /// Full scrollable content size.
    pub content_size: Vec2,
    /// Axes that participate in drag and inertia.
    pub axis: Axis,
    /// Scroll direction.
    pub direction: Direction,
    /// Deceleration coefficient applied while settling.
    pub friction: f64,
    /// Stiffness of the elastic pull-back past the scroll bounds.
    pub resistance: f64,
    /// Last committed, direction-normalized rectangle of each tracked
    /// element.
    pub positions: HashMap<ElementId, Rect>,
}

impl MotionState {
    /// Create the state for a new surface from its validated configuration.
    pub fn new(config: &SurfaceConfig) -> Self {
        Self {
            offset: Vec2::ZERO,
            frame: Rect::ZERO,
            content_size: Vec2::ZERO,
            axis: config.axis,
            direction: config.direction,
            friction: config.friction,
            resistance: config.resistance,
            positions: HashMap::new(),
        }
    }

    /// The largest in-bounds offset per axis: `max(0, content - frame)`.
    pub fn max_offset(&self) -> Vec2 {
        Vec2::new(
            (self.content_size.x - self.frame.width()).max(0.0),
            (self.content_size.y - self.frame.height()).max(0.0),
        )
    }

    /// How far the offset sits past the scrollable bounds, per axis.
    ///
    /// Zero while the offset is inside `[0, max_offset]`; negative when
    /// dragged before the start, positive when dragged past the end. Always
    /// derived, never stored: clamped offset + overflow == offset.
    pub fn overflow(&self) -> Vec2 {
        let max_offset = self.max_offset();
        Vec2::new(
            axis_overflow(self.offset.x, max_offset.x),
            axis_overflow(self.offset.y, max_offset.y),
        )
    }

    /// Compute the target offset that brings a tracked element into view.
    ///
    /// Returns `None` when `id` is not currently tracked - a normal
    /// condition while layout is still settling, not an error. The target is
    /// computed independently per active axis; inactive axes keep the
    /// current offset. With `restricted`, the active axes are clamped into
    /// `[0, max_offset]`.
    pub fn scroll_target(
        &self,
        id: &str,
        alignment: Align,
        anchor: Align,
        restricted: bool,
    ) -> Option<Vec2> {
        let rect = self.positions.get(id)?;
        let scale = self.direction.scale();

        let mut anchor_offset = Vec2::ZERO;
        if self.axis.vertical() {
            if anchor.contains(Align::VERTICAL_START) {
                anchor_offset.y = 0.0;
            }
            if anchor.contains(Align::VERTICAL_CENTER) {
                anchor_offset.y = scale * rect.height() / 2.0;
            }
            if anchor.contains(Align::VERTICAL_END) {
                anchor_offset.y = scale * rect.height();
            }
        }
        if self.axis.horizontal() {
            if anchor.contains(Align::HORIZONTAL_START) {
                anchor_offset.x = 0.0;
            }
            if anchor.contains(Align::HORIZONTAL_CENTER) {
                anchor_offset.x = scale * rect.width() / 2.0;
            }
            if anchor.contains(Align::HORIZONTAL_END) {
                anchor_offset.x = scale * rect.width();
            }
        }

        let mut alignment_offset = Vec2::ZERO;
        if self.axis.vertical() {
            let half = self.frame.height() / 2.0;
            if alignment.contains(Align::VERTICAL_START) {
                alignment_offset.y = -half + scale * half;
            }
            if alignment.contains(Align::VERTICAL_CENTER) {
                alignment_offset.y = -half;
            }
            if alignment.contains(Align::VERTICAL_END) {
                alignment_offset.y = -half - scale * half;
            }
        }
        if self.axis.horizontal() {
            let half = self.frame.width() / 2.0;
            if alignment.contains(Align::HORIZONTAL_START) {
                alignment_offset.x = -half + scale * half;
            }
            if alignment.contains(Align::HORIZONTAL_CENTER) {
                alignment_offset.x = -half;
            }
            if alignment.contains(Align::HORIZONTAL_END) {
                alignment_offset.x = -half - scale * half;
            }
        }

        let max_offset = self.max_offset();
        let mut target = self.offset;
        if self.axis.vertical() {
            target.y = rect.origin.y + alignment_offset.y + anchor_offset.y;
            if restricted {
                target.y = target.y.clamp(0.0, max_offset.y);
            }
        }
        if self.axis.horizontal() {
            target.x = rect.origin.x + alignment_offset.x + anchor_offset.x;
            if restricted {
                target.x = target.x.clamp(0.0, max_offset.x);
            }
        }

        Some(target)
    }

    /// Build the observable snapshot for the current state.
    pub fn snapshot(
        &self,
        velocity: Vec2,
        acceleration: Vec2,
        positions: Arc<HashMap<ElementId, Rect>>,
    ) -> MotionSnapshot {
        MotionSnapshot {
            offset: self.offset,
            velocity,
            acceleration,
            overflow: self.overflow(),
            frame: self.frame,
            content_size: self.content_size,
            positions,
        }
    }
}

/// Signed overscroll distance on one axis.
fn axis_overflow(offset: f64, max_offset: f64) -> f64 {
    let clamped = offset.clamp(0.0, max_offset);
    if clamped == 0.0 && offset < 0.0 {
        offset
    } else if clamped == max_offset && offset > max_offset {
        offset - max_offset
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::normalize_rect;

    fn vertical_state() -> MotionState {
        let mut state = MotionState::new(&SurfaceConfig::default());
        state.content_size = Vec2::new(400.0, 5000.0);
        state.frame = Rect::new(0.0, 0.0, 400.0, 800.0);
        state
    }

    #[test]
    fn overflow_is_zero_within_bounds() {
        let mut state = vertical_state();
        for y in [0.0, 1.0, 2100.0, 4200.0] {
            state.offset = Vec2::new(0.0, y);
            assert_eq!(state.overflow(), Vec2::ZERO, "offset {}", y);
        }
    }

    #[test]
    fn overflow_sign_convention_holds_per_axis() {
        let mut state = vertical_state();
        state.axis = Axis::Both;
        state.content_size = Vec2::new(1000.0, 5000.0);
        let max_offset = state.max_offset();

        for offset in [
            Vec2::new(-30.0, -5.0),
            Vec2::new(0.0, 4200.0),
            Vec2::new(700.0, 4250.0),
            Vec2::new(120.0, 2000.0),
            Vec2::new(-1.0, 4201.0),
        ] {
            state.offset = offset;
            let overflow = state.overflow();
            let clamped = Vec2::new(
                offset.x.clamp(0.0, max_offset.x),
                offset.y.clamp(0.0, max_offset.y),
            );
            assert_eq!(clamped + overflow, offset, "offset {:?}", offset);
        }
    }

    #[test]
    fn degenerate_content_overflows_by_the_whole_offset() {
        let mut state = vertical_state();
        state.content_size = Vec2::new(400.0, 500.0); // shorter than the viewport
        assert_eq!(state.max_offset(), Vec2::ZERO);

        state.offset = Vec2::new(0.0, 35.0);
        assert_eq!(state.overflow(), Vec2::new(0.0, 35.0));
    }

    #[test]
    fn centered_scroll_target_scenario() {
        let mut state = vertical_state();
        state
            .positions
            .insert("msg_42".to_string(), Rect::new(0.0, 4200.0, 400.0, 40.0));

        let target = state
            .scroll_target("msg_42", Align::CENTER, Align::CENTER, true)
            .unwrap();

        // 4200 + 20 (anchor center) - 400 (viewport center) = 3820
        assert_eq!(target.y, 3820.0);
        assert!(target.y >= 0.0 && target.y <= state.max_offset().y);
    }

    #[test]
    fn untracked_element_yields_no_target() {
        let state = vertical_state();
        assert!(state
            .scroll_target("missing", Align::CENTER, Align::CENTER, true)
            .is_none());
    }

    #[test]
    fn restricted_target_is_idempotent_and_in_bounds() {
        let mut state = vertical_state();
        state
            .positions
            .insert("tail".to_string(), Rect::new(0.0, 4960.0, 400.0, 40.0));

        let first = state
            .scroll_target("tail", Align::TOP, Align::VERTICAL_START, true)
            .unwrap();
        state.offset = first;
        let second = state
            .scroll_target("tail", Align::TOP, Align::VERTICAL_START, true)
            .unwrap();

        assert_eq!(first, second);
        assert!(first.y >= 0.0 && first.y <= state.max_offset().y);
    }

    #[test]
    fn inactive_axis_keeps_current_offset() {
        let mut state = vertical_state();
        state.offset = Vec2::new(12.0, 100.0);
        state
            .positions
            .insert("a".to_string(), Rect::new(50.0, 2000.0, 100.0, 40.0));

        let target = state
            .scroll_target("a", Align::CENTER, Align::CENTER, true)
            .unwrap();
        assert_eq!(target.x, 12.0);
    }

    #[test]
    fn direction_symmetry_reflects_targets() {
        let raw = Rect::new(0.0, 4200.0, 400.0, 40.0);
        let content = Vec2::new(400.0, 5000.0);

        let mut normal = vertical_state();
        normal
            .positions
            .insert("a".to_string(), normalize_rect(raw, Direction::Normal, content));

        let mut reverse = vertical_state();
        reverse.direction = Direction::Reverse;
        reverse
            .positions
            .insert("a".to_string(), normalize_rect(raw, Direction::Reverse, content));

        // The reverse-normalized rect is measured from the far edge.
        assert_eq!(reverse.positions["a"].origin.y, content.y - raw.origin.y);

        // The direction scale mirrors start/end semantics internally, so the
        // same flag set names the mirrored request under the other direction
        // and the unrestricted targets reflect about the scrollable range.
        let max_offset = normal.max_offset().y;
        for (alignment, anchor) in [
            (Align::CENTER, Align::CENTER),
            (Align::TOP, Align::VERTICAL_START),
            (Align::BOTTOM, Align::VERTICAL_END),
            (Align::TOP, Align::VERTICAL_CENTER),
        ] {
            let n = normal
                .scroll_target("a", alignment, anchor, false)
                .unwrap()
                .y;
            let r = reverse
                .scroll_target("a", alignment, anchor, false)
                .unwrap()
                .y;
            assert!(
                (n + r - max_offset).abs() < 1e-9,
                "alignment {:?} anchor {:?}: normal {} reverse {}",
                alignment,
                anchor,
                n,
                r
            );
        }
    }
}
