//! Position registry: a debounced, direction-normalized map of element id
//! to its rectangle within the scrollable content.
//!
//! Raw layout batches can arrive every layout pass. The registry coalesces
//! them - latest batch wins, any pending commit is rescheduled - so the
//! motion state is updated at most once per [`DEBOUNCE_INTERVAL`] and always
//! from the freshest data. On commit, entries only move if their origin
//! shifted more than [`MOVE_THRESHOLD`]; entries missing from the incoming
//! batch are dropped (the element left the layout tree).

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::geometry::{Direction, Rect, Vec2};

/// Stable identifier for a tracked element, chosen by the content.
pub type ElementId = String;

/// Minimum delay between raw layout input and the commit into the motion
/// state.
pub const DEBOUNCE_INTERVAL: Duration = Duration::from_millis(100);

/// Origin movement (per axis) below which a stored rectangle is kept as-is.
pub const MOVE_THRESHOLD: f64 = 1.0;

/// Transform a raw element rectangle into the direction-normalized space.
///
/// `Normal` keeps the origin as measured from the top-leading corner of the
/// content; `Reverse` remeasures it from the bottom-trailing corner, so the
/// scroll-targeting math downstream never branches on direction.
#[inline]
pub fn normalize_rect(rect: Rect, direction: Direction, content_size: Vec2) -> Rect {
    match direction {
        Direction::Normal => rect,
        Direction::Reverse => Rect {
            origin: Vec2::new(content_size.x - rect.origin.x, content_size.y - rect.origin.y),
            size: rect.size,
        },
    }
}

/// Merge an incoming batch into the stored positions.
///
/// Inserts new entries, updates entries whose origin moved more than
/// `threshold` on either axis, and removes entries absent from the batch.
/// Returns whether the stored map changed.
pub fn merge_positions(
    current: &mut HashMap<ElementId, Rect>,
    incoming: &HashMap<ElementId, Rect>,
    threshold: f64,
) -> bool {
    let mut changed = false;

    for (id, rect) in incoming {
        match current.get(id) {
            Some(previous) => {
                let dx = (rect.origin.x - previous.origin.x).abs();
                let dy = (rect.origin.y - previous.origin.y).abs();
                if dx > threshold || dy > threshold {
                    current.insert(id.clone(), *rect);
                    changed = true;
                }
            }
            None => {
                current.insert(id.clone(), *rect);
                changed = true;
            }
        }
    }

    let stale: Vec<ElementId> = current
        .keys()
        .filter(|id| !incoming.contains_key(*id))
        .cloned()
        .collect();
    for id in stale {
        current.remove(&id);
        changed = true;
    }

    changed
}

/// Debounce state for layout batches.
///
/// Owned by the engine service; `submit` is called from the command handler
/// and `take_due` from the deadline branch of the same select loop, so
/// commits are naturally serialized on the state-owning context.
#[derive(Debug, Default)]
pub struct PositionRegistry {
    pending: Option<HashMap<ElementId, Rect>>,
    deadline: Option<Instant>,
}

impl PositionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a normalized batch, replacing any batch already staged and
    /// pushing the commit deadline out to `now + DEBOUNCE_INTERVAL`.
    pub fn submit(&mut self, batch: HashMap<ElementId, Rect>, now: Instant) {
        self.pending = Some(batch);
        self.deadline = Some(now + DEBOUNCE_INTERVAL);
    }

    /// The instant the staged batch becomes committable, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Take the staged batch if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<HashMap<ElementId, Rect>> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Direction;

    fn rect(x: f64, y: f64) -> Rect {
        Rect::new(x, y, 10.0, 10.0)
    }

    #[test]
    fn normal_direction_keeps_origin() {
        let r = Rect::new(30.0, 400.0, 100.0, 20.0);
        let content = Vec2::new(500.0, 5000.0);
        assert_eq!(normalize_rect(r, Direction::Normal, content), r);
    }

    #[test]
    fn reverse_direction_measures_from_far_edge() {
        let r = Rect::new(30.0, 400.0, 100.0, 20.0);
        let content = Vec2::new(500.0, 5000.0);
        let n = normalize_rect(r, Direction::Reverse, content);

        assert_eq!(n.origin, Vec2::new(470.0, 4600.0));
        assert_eq!(n.size, r.size);
    }

    #[test]
    fn merge_inserts_new_entries() {
        let mut current = HashMap::new();
        let incoming = HashMap::from([("a".to_string(), rect(0.0, 0.0))]);

        assert!(merge_positions(&mut current, &incoming, MOVE_THRESHOLD));
        assert_eq!(current.len(), 1);
    }

    #[test]
    fn merge_ignores_sub_threshold_movement() {
        let mut current = HashMap::from([("a".to_string(), rect(0.0, 0.0))]);
        let incoming = HashMap::from([("a".to_string(), rect(0.5, 0.9))]);

        assert!(!merge_positions(&mut current, &incoming, MOVE_THRESHOLD));
        assert_eq!(current["a"], rect(0.0, 0.0));
    }

    #[test]
    fn merge_applies_movement_past_threshold() {
        let mut current = HashMap::from([("a".to_string(), rect(0.0, 0.0))]);
        let incoming = HashMap::from([("a".to_string(), rect(0.0, 1.5))]);

        assert!(merge_positions(&mut current, &incoming, MOVE_THRESHOLD));
        assert_eq!(current["a"], rect(0.0, 1.5));
    }

    #[test]
    fn merge_prunes_entries_missing_from_batch() {
        let mut current = HashMap::from([
            ("a".to_string(), rect(0.0, 0.0)),
            ("b".to_string(), rect(0.0, 50.0)),
        ]);
        let incoming = HashMap::from([("a".to_string(), rect(0.0, 0.0))]);

        assert!(merge_positions(&mut current, &incoming, MOVE_THRESHOLD));
        assert_eq!(current.len(), 1);
        assert!(current.contains_key("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn resubmitting_reschedules_the_deadline() {
        let mut registry = PositionRegistry::new();
        let t0 = Instant::now();

        registry.submit(HashMap::from([("a".to_string(), rect(0.0, 0.0))]), t0);
        let first_deadline = registry.deadline().unwrap();

        // A second batch half a window later supersedes the first and pushes
        // the deadline out.
        let t1 = t0 + DEBOUNCE_INTERVAL / 2;
        registry.submit(HashMap::from([("a".to_string(), rect(0.0, 99.0))]), t1);
        assert!(registry.deadline().unwrap() > first_deadline);

        // Not due at the first deadline.
        assert!(registry.take_due(first_deadline).is_none());

        // Due one full interval after the last submit, with the last data.
        let batch = registry.take_due(t1 + DEBOUNCE_INTERVAL).unwrap();
        assert_eq!(batch["a"], rect(0.0, 99.0));
        assert!(registry.deadline().is_none());
    }
}
