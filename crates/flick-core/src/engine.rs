//! Drag/inertia engine: the fixed-rate simulation loop of a surface.
//!
//! The engine ticks at [`TICK_INTERVAL`] regardless of gesture event
//! frequency. While a drag is active the gesture translation drives the
//! velocity and acceleration; once released the surface free-runs under
//! friction decay, with an elastic pull-back whenever the offset sits past
//! the scrollable bounds. The same service loop owns the position registry's
//! debounce deadline, so simulation ticks and position commits are both
//! serialized on the one state-owning task.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::anim::{Easing, Transition};
use crate::config::SurfaceConfig;
use crate::geometry::{Rect, Vec2};
use crate::motion::{Align, MotionSnapshot, MotionState};
use crate::registry::{merge_positions, ElementId, PositionRegistry, MOVE_THRESHOLD};

/// Simulation tick period (60 Hz).
pub const TICK_INTERVAL: Duration = Duration::from_micros(16_667);

/// Per-axis speed below which a settling surface is considered at rest.
const VELOCITY_EPSILON: f64 = 1.0;

/// Numerator of the elastic boundary term `ELASTIC_SCALE / overflow /
/// resistance`.
const ELASTIC_SCALE: f64 = 1_000_000.0;

/// Upper bound on the integration step. A stall (suspend/resume, debugger
/// pause) must not turn into one giant step that destabilizes the friction
/// decay.
const MAX_TICK_DT: f64 = 0.1;

/// Duration of the spring-back out of overscroll.
const BOUNCE_DURATION: Duration = Duration::from_millis(350);

/// Duration of animated programmatic scrolls.
const SCROLL_DURATION: Duration = Duration::from_millis(250);

/// Commands accepted by the engine service.
#[derive(Debug, Clone)]
pub enum Command {
    /// A drag gesture began or moved; carries the cumulative translation.
    DragChanged(Vec2),
    /// The drag gesture was released.
    DragEnded,
    /// The viewport frame was measured.
    SetFrame(Rect),
    /// The scrollable content size was measured.
    SetContentSize(Vec2),
    /// A normalized layout batch to stage for the debounced commit.
    SubmitPositions(HashMap<ElementId, Rect>),
    /// Bring a tracked element into view.
    ScrollToElement {
        id: ElementId,
        alignment: Align,
        anchor: Align,
        restricted: bool,
        animated: bool,
    },
    /// Jump to an absolute offset.
    ScrollTo { offset: Vec2, animated: bool },
    /// Jump by a relative delta.
    ScrollBy { delta: Vec2, animated: bool },
}

/// Simulation-owned state: velocity, acceleration, and gesture tracking.
#[derive(Debug)]
struct DragState {
    velocity: Vec2,
    acceleration: Vec2,
    last_tick: Instant,
    /// Cumulative gesture translation while a drag is in progress; `None`
    /// once released, which switches the engine to inertial settling.
    translation: Option<Vec2>,
    /// Gesture-local offset. Follows the pointer exactly during a drag and
    /// is reset to zero when the drag ends.
    gesture_offset: Vec2,
    /// In-flight animated move (programmatic scroll or overscroll bounce).
    transition: Option<Transition>,
}

impl DragState {
    fn new(now: Instant) -> Self {
        Self {
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            last_tick: now,
            translation: None,
            gesture_offset: Vec2::ZERO,
            transition: None,
        }
    }
}

/// Advance the simulation by one tick.
fn step(motion: &mut MotionState, drag: &mut DragState, now: Instant) {
    let dt = now.saturating_duration_since(drag.last_tick).as_secs_f64();
    drag.last_tick = now;
    if dt <= 0.0 {
        return;
    }
    let dt = dt.min(MAX_TICK_DT);

    if let Some(translation) = drag.translation {
        // Dragging: the gesture-local offset follows the pointer with no
        // lag, including past the scrollable bounds.
        drag.transition = None;

        let ds = (translation - drag.gesture_offset).masked(motion.axis);
        drag.gesture_offset = translation;

        let velocity = ds / dt;
        let dv = (velocity - drag.velocity).masked(motion.axis);
        drag.acceleration = dv / dt;
    } else if let Some(transition) = drag.transition {
        // An animated move owns the offset until it completes.
        motion.offset = transition.sample(now);
        drag.velocity = Vec2::ZERO;
        drag.acceleration = Vec2::ZERO;
        if transition.is_complete(now) {
            motion.offset = transition.target();
            drag.transition = None;
        }
        return;
    } else {
        // Released: decay toward rest.
        if drag.velocity.x.abs() < VELOCITY_EPSILON {
            drag.velocity.x = 0.0;
        }
        if drag.velocity.y.abs() < VELOCITY_EPSILON {
            drag.velocity.y = 0.0;
        }
        drag.acceleration = drag.velocity.masked(motion.axis) * -motion.friction;

        let overflow = motion.overflow();
        if overflow != Vec2::ZERO {
            // Resting out of bounds: spring back to the nearest legal bound.
            drag.acceleration = Vec2::ZERO;
            drag.velocity = Vec2::ZERO;
            drag.transition = Some(Transition::new(
                now,
                motion.offset,
                motion.offset - overflow,
                BOUNCE_DURATION,
                Easing::Cubic,
            ));
            return;
        }
    }

    // Elastic boundary correction, per axis independently: the restoring
    // bound tightens the further the surface sits out of bounds, and the
    // stronger force wins against the branch-computed acceleration.
    let overflow = motion.overflow();
    if overflow.y < 0.0 {
        drag.acceleration.y = drag
            .acceleration
            .y
            .max(ELASTIC_SCALE / overflow.y / motion.resistance);
    } else if overflow.y > 0.0 {
        drag.acceleration.y = drag
            .acceleration
            .y
            .min(ELASTIC_SCALE / overflow.y / motion.resistance);
    }
    if overflow.x < 0.0 {
        drag.acceleration.x = drag
            .acceleration
            .x
            .max(ELASTIC_SCALE / overflow.x / motion.resistance);
    } else if overflow.x > 0.0 {
        drag.acceleration.x = drag
            .acceleration
            .x
            .min(ELASTIC_SCALE / overflow.x / motion.resistance);
    }

    drag.velocity += drag.acceleration * dt;
    motion.offset += drag.velocity * dt;
}

/// The simulation service owning one surface's motion state.
///
/// Runs until the shutdown signal fires or every command sender is dropped;
/// no tick or commit executes after either.
pub struct EngineService {
    motion: MotionState,
    drag: DragState,
    registry: PositionRegistry,
    command_rx: mpsc::UnboundedReceiver<Command>,
    state_tx: watch::Sender<MotionSnapshot>,
    shared_positions: Arc<HashMap<ElementId, Rect>>,
}

impl EngineService {
    /// Build a service plus its command sender and state receiver.
    pub fn new(
        config: &SurfaceConfig,
    ) -> (
        Self,
        mpsc::UnboundedSender<Command>,
        watch::Receiver<MotionSnapshot>,
    ) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(MotionSnapshot::default());

        let service = Self {
            motion: MotionState::new(config),
            drag: DragState::new(Instant::now()),
            registry: PositionRegistry::new(),
            command_rx,
            state_tx,
            shared_positions: Arc::new(HashMap::new()),
        };

        (service, command_tx, state_rx)
    }

    /// Run the simulation loop until shutdown.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Drag engine started: axis={:?}, direction={:?}, friction={}, resistance={}",
            self.motion.axis, self.motion.direction, self.motion.friction, self.motion.resistance
        );

        loop {
            let commit_deadline = self.registry.deadline();
            let commit_due = async {
                match commit_deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Drag engine received shutdown signal");
                        break;
                    }
                }

                _ = ticker.tick() => {
                    step(&mut self.motion, &mut self.drag, Instant::now());
                    self.publish();
                }

                command = self.command_rx.recv() => {
                    match command {
                        Some(command) => {
                            self.handle_command(command);
                            self.publish();
                        }
                        // Every handle is gone; nobody can observe us either.
                        None => break,
                    }
                }

                _ = commit_due => {
                    self.commit_positions(Instant::now());
                    self.publish();
                }
            }
        }

        info!("Drag engine stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::DragChanged(translation) => {
                self.drag.translation = Some(translation);
            }
            Command::DragEnded => {
                self.drag.translation = None;
                self.drag.gesture_offset = Vec2::ZERO;
            }
            Command::SetFrame(frame) => {
                self.motion.frame = frame;
            }
            Command::SetContentSize(size) => {
                self.motion.content_size = size;
            }
            Command::SubmitPositions(batch) => {
                self.registry.submit(batch, Instant::now());
            }
            Command::ScrollToElement {
                id,
                alignment,
                anchor,
                restricted,
                animated,
            } => match self.motion.scroll_target(&id, alignment, anchor, restricted) {
                Some(target) => {
                    debug!("Scrolling to element '{}' at {:?}", id, target);
                    self.jump_to(target, animated);
                }
                // Normal while layout is still settling; not an error.
                None => debug!("Scroll target '{}' is not tracked, ignoring", id),
            },
            Command::ScrollTo { offset, animated } => {
                self.jump_to(offset, animated);
            }
            Command::ScrollBy { delta, animated } => {
                // Chain from the in-flight target so rapid relative scrolls
                // accumulate instead of restarting.
                let base = self
                    .drag
                    .transition
                    .map(|t| t.target())
                    .unwrap_or(self.motion.offset);
                self.jump_to(base + delta, animated);
            }
        }
    }

    /// Move the offset programmatically. An explicit jump always clears
    /// residual inertia.
    fn jump_to(&mut self, target: Vec2, animated: bool) {
        self.drag.velocity = Vec2::ZERO;
        self.drag.acceleration = Vec2::ZERO;
        if animated {
            self.drag.transition = Some(Transition::new(
                Instant::now(),
                self.motion.offset,
                target,
                SCROLL_DURATION,
                Easing::Cubic,
            ));
        } else {
            self.drag.transition = None;
            self.motion.offset = target;
        }
    }

    fn commit_positions(&mut self, now: Instant) {
        if let Some(batch) = self.registry.take_due(now) {
            if merge_positions(&mut self.motion.positions, &batch, MOVE_THRESHOLD) {
                self.shared_positions = Arc::new(self.motion.positions.clone());
                debug!("Committed {} tracked element positions", self.shared_positions.len());
            }
        }
    }

    fn publish(&self) {
        let snapshot = self.motion.snapshot(
            self.drag.velocity,
            self.drag.acceleration,
            Arc::clone(&self.shared_positions),
        );
        self.state_tx.send_if_modified(|current| {
            if *current != snapshot {
                *current = snapshot;
                true
            } else {
                false
            }
        });
    }
}
