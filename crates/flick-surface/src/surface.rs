//! The surface controller: one handle per scrollable surface.
//!
//! Owns the engine's lifecycle (spawned on construction, stopped on
//! [`Surface::shutdown`] or drop), bridges gesture and layout events into
//! engine commands, and hands the host a watch subscription for rendering.

use std::collections::HashMap;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::warn;

use flick_core::registry::normalize_rect;
use flick_core::{
    Align, Axis, Command, Direction, ElementId, EngineService, MotionSnapshot, Rect, SurfaceConfig,
    Vec2,
};

use crate::layout::{content_alignment, render_transform, ContentAlignment};

/// Name of the coordinate space element measurements must be taken in:
/// relative to the scrollable content's origin, before the render transform
/// is applied.
pub const COORDINATE_SPACE: &str = "flick";

/// A scrollable surface driven by the drag/inertia engine.
///
/// One `Surface` owns exactly one engine and one motion state; instances
/// share nothing. Construction spawns the simulation task, so a `Surface`
/// must be created inside a tokio runtime.
#[derive(Debug)]
pub struct Surface {
    command_tx: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<MotionSnapshot>,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
    axis: Axis,
    direction: Direction,
}

impl Surface {
    /// Validate the configuration and start the engine.
    pub fn new(config: SurfaceConfig) -> flick_core::Result<Self> {
        config.validate()?;

        let (service, command_tx, state_rx) = EngineService::new(&config);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(service.run(shutdown_rx));

        Ok(Self {
            command_tx,
            state_rx,
            shutdown_tx,
            task: Some(task),
            axis: config.axis,
            direction: config.direction,
        })
    }

    /// Subscribe to motion state changes.
    pub fn subscribe(&self) -> watch::Receiver<MotionSnapshot> {
        self.state_rx.clone()
    }

    /// The most recently published motion state.
    pub fn snapshot(&self) -> MotionSnapshot {
        self.state_rx.borrow().clone()
    }

    /// A drag gesture began or moved; `translation` is cumulative from the
    /// gesture start.
    pub fn drag_changed(&self, translation: Vec2) {
        self.send(Command::DragChanged(translation));
    }

    /// The drag gesture was released; the engine switches to inertial
    /// settling and resets its gesture-local offset tracking.
    pub fn drag_ended(&self) {
        self.send(Command::DragEnded);
    }

    /// The viewport frame was measured.
    pub fn set_frame(&self, frame: Rect) {
        self.send(Command::SetFrame(frame));
    }

    /// The scrollable content size was measured.
    pub fn set_content_size(&self, size: Vec2) {
        self.send(Command::SetContentSize(size));
    }

    /// Reduce a raw layout batch into the position registry.
    ///
    /// Rects are expected in [`COORDINATE_SPACE`]. Normalization fans out
    /// per entry, rejoins, and the batch is staged on the engine's context,
    /// where the debounced commit keeps the update rate bounded. Batches may
    /// arrive every layout pass; submitting is cheap.
    pub async fn submit_positions(&self, raw: HashMap<ElementId, Rect>) {
        let direction = self.direction;
        let content_size = self.state_rx.borrow().content_size;

        let mut tasks = JoinSet::new();
        for (id, rect) in raw {
            tasks.spawn(async move { (id, normalize_rect(rect, direction, content_size)) });
        }

        let mut normalized = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, rect)) => {
                    normalized.insert(id, rect);
                }
                Err(e) => warn!("Position normalization task failed: {}", e),
            }
        }

        self.send(Command::SubmitPositions(normalized));
    }

    /// Bring a tracked element into view. A no-op if the element is not
    /// currently tracked.
    pub fn scroll_to_element(
        &self,
        id: impl Into<ElementId>,
        alignment: Align,
        anchor: Align,
        restricted: bool,
        animated: bool,
    ) {
        self.send(Command::ScrollToElement {
            id: id.into(),
            alignment,
            anchor,
            restricted,
            animated,
        });
    }

    /// Jump to an absolute offset, clearing residual inertia.
    pub fn scroll_to(&self, offset: Vec2, animated: bool) {
        self.send(Command::ScrollTo { offset, animated });
    }

    /// Jump by a relative delta, clearing residual inertia.
    pub fn scroll_by(&self, delta: Vec2, animated: bool) {
        self.send(Command::ScrollBy { delta, animated });
    }

    /// Translation the host applies to its content for a snapshot.
    pub fn render_transform(&self, snapshot: &MotionSnapshot) -> Vec2 {
        render_transform(self.direction, snapshot.offset)
    }

    /// Layout corner the host pins the content to.
    pub fn content_alignment(&self) -> ContentAlignment {
        content_alignment(self.axis, self.direction)
    }

    /// Stop the engine and wait for its last tick to finish.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Engine task ended abnormally: {}", e);
            }
        }
    }

    fn send(&self, command: Command) {
        if self.command_tx.send(command).is_err() {
            warn!("Surface engine is stopped; dropping command");
        }
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        // Signal rather than abort: the engine breaks out of its loop at the
        // next wakeup and both timers die with it.
        let _ = self.shutdown_tx.send(true);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use flick_core::{DEBOUNCE_INTERVAL, TICK_INTERVAL};

    fn vertical_surface() -> Surface {
        Surface::new(SurfaceConfig::default()).unwrap()
    }

    async fn measured(surface: &Surface, content: Vec2, frame: Rect) {
        surface.set_content_size(content);
        surface.set_frame(frame);
        tokio::time::sleep(TICK_INTERVAL).await;
    }

    #[tokio::test(start_paused = true)]
    async fn drag_gesture_moves_the_surface() {
        let surface = vertical_surface();
        measured(
            &surface,
            Vec2::new(400.0, 5000.0),
            Rect::new(0.0, 0.0, 400.0, 800.0),
        )
        .await;

        for i in 1..=5 {
            surface.drag_changed(Vec2::new(0.0, 10.0 * i as f64));
            tokio::time::sleep(TICK_INTERVAL).await;
        }
        surface.drag_ended();
        tokio::time::sleep(TICK_INTERVAL * 2).await;

        let snapshot = surface.snapshot();
        assert!(snapshot.offset.y > 0.0);

        surface.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn positions_flow_through_normalization_and_debounce() {
        let config = SurfaceConfig {
            direction: Direction::Reverse,
            ..Default::default()
        };
        let surface = Surface::new(config).unwrap();
        measured(
            &surface,
            Vec2::new(400.0, 5000.0),
            Rect::new(0.0, 0.0, 400.0, 800.0),
        )
        .await;

        surface
            .submit_positions(HashMap::from([(
                "msg".to_string(),
                Rect::new(30.0, 400.0, 100.0, 20.0),
            )]))
            .await;
        tokio::time::sleep(DEBOUNCE_INTERVAL + TICK_INTERVAL).await;

        let positions = surface.snapshot().positions;
        // Reverse surfaces measure from the far edge.
        assert_eq!(positions["msg"].origin, Vec2::new(370.0, 4600.0));
        assert_eq!(positions["msg"].size, Vec2::new(100.0, 20.0));

        surface.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn scroll_to_element_centers_the_target() {
        let surface = vertical_surface();
        measured(
            &surface,
            Vec2::new(400.0, 5000.0),
            Rect::new(0.0, 0.0, 400.0, 800.0),
        )
        .await;

        surface
            .submit_positions(HashMap::from([(
                "msg_42".to_string(),
                Rect::new(0.0, 4200.0, 400.0, 40.0),
            )]))
            .await;
        tokio::time::sleep(DEBOUNCE_INTERVAL + TICK_INTERVAL).await;

        surface.scroll_to_element("msg_42", Align::CENTER, Align::CENTER, true, false);
        tokio::time::sleep(TICK_INTERVAL).await;

        assert_eq!(surface.snapshot().offset.y, 3820.0);

        surface.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn animated_scroll_converges_on_the_target() {
        let surface = vertical_surface();
        measured(
            &surface,
            Vec2::new(400.0, 5000.0),
            Rect::new(0.0, 0.0, 400.0, 800.0),
        )
        .await;

        surface.scroll_to(Vec2::new(0.0, 1000.0), true);
        tokio::time::sleep(Duration::from_millis(500)).await;

        let snapshot = surface.snapshot();
        assert_eq!(snapshot.offset.y, 1000.0);
        assert_eq!(snapshot.velocity, Vec2::ZERO);

        surface.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn transform_and_alignment_follow_direction() {
        let normal = vertical_surface();
        let reverse = Surface::new(SurfaceConfig {
            direction: Direction::Reverse,
            ..Default::default()
        })
        .unwrap();

        let snapshot = MotionSnapshot {
            offset: Vec2::new(0.0, 120.0),
            ..Default::default()
        };
        assert_eq!(normal.render_transform(&snapshot), Vec2::new(0.0, -120.0));
        assert_eq!(reverse.render_transform(&snapshot), Vec2::new(0.0, 120.0));

        assert_eq!(normal.content_alignment(), ContentAlignment::Top);
        assert_eq!(reverse.content_alignment(), ContentAlignment::Bottom);

        normal.shutdown().await;
        reverse.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_closes_the_command_channel() {
        let surface = vertical_surface();
        let command_tx = surface.command_tx.clone();

        surface.shutdown().await;

        // The engine is gone; later commands are dropped at the channel.
        assert!(command_tx.send(Command::DragEnded).is_err());
    }
}
