//! Gesture classifier — turns raw pointer sequences into gestures.
//!
//! The classifier is a pure state machine: every [`PointerEvent`] carries its
//! own timestamp and the pending long-press deadline is exposed through
//! [`GestureClassifier::long_press_deadline`] so the caller decides how to
//! wait for it. [`GestureClassifier::poll`] fires the long press once the
//! deadline has passed; events arriving after the deadline fire it lazily.
//!
//! Only one gesture is tracked at a time. A second pointer going down cancels
//! the current gesture (this is what suppresses pinch-zoom) and everything is
//! ignored until all pointers are released.

use std::time::Duration;

use tokio::time::Instant;

use crate::controls::ControlHandle;

/// Screen position in CSS pixels. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Identifies one finger (or the mouse) for the lifetime of a press.
pub type PointerId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// Which part of a bound control the pointer hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRole {
    /// The draggable thumb of a slider.
    SliderThumb,
    /// The slider track outside the thumb.
    SliderTrack,
    /// A tappable tile.
    Tile,
}

/// Result of hit-testing a pointer position against the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitTarget {
    pub control: ControlHandle,
    pub role: TargetRole,
}

impl HitTarget {
    #[must_use]
    pub fn new(control: ControlHandle, role: TargetRole) -> Self {
        Self { control, role }
    }

    #[must_use]
    pub fn is_draggable(&self) -> bool {
        self.role == TargetRole::SliderThumb
    }
}

/// One raw pointer (or touch) event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub pointer: PointerId,
    pub position: Point,
    pub at: Instant,
    pub target: Option<HitTarget>,
}

impl PointerEvent {
    #[must_use]
    pub fn new(
        phase: PointerPhase,
        pointer: PointerId,
        position: Point,
        at: Instant,
        target: Option<HitTarget>,
    ) -> Self {
        Self {
            phase,
            pointer,
            position,
            at,
            target,
        }
    }

    #[must_use]
    pub fn down(pointer: PointerId, position: Point, at: Instant, target: Option<HitTarget>) -> Self {
        Self::new(PointerPhase::Down, pointer, position, at, target)
    }

    #[must_use]
    pub fn moved(pointer: PointerId, position: Point, at: Instant) -> Self {
        Self::new(PointerPhase::Move, pointer, position, at, None)
    }

    #[must_use]
    pub fn up(pointer: PointerId, position: Point, at: Instant) -> Self {
        Self::new(PointerPhase::Up, pointer, position, at, None)
    }

    #[must_use]
    pub fn cancel(pointer: PointerId, position: Point, at: Instant) -> Self {
        Self::new(PointerPhase::Cancel, pointer, position, at, None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

impl SwipeDirection {
    /// Direction along the axis with the larger absolute delta.
    #[must_use]
    pub fn from_delta(dx: f64, dy: f64) -> Self {
        if dx.abs() > dy.abs() {
            if dx > 0.0 { Self::Right } else { Self::Left }
        } else if dy > 0.0 {
            Self::Down
        } else {
            Self::Up
        }
    }
}

/// A classified gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Tap {
        target: Option<HitTarget>,
        position: Point,
    },
    LongPress {
        target: Option<HitTarget>,
        position: Point,
    },
    Swipe {
        direction: SwipeDirection,
        target: Option<HitTarget>,
    },
    DragStart {
        target: HitTarget,
        /// Where the pointer went down; drag deltas are measured from here.
        origin: Point,
    },
    DragMove {
        target: HitTarget,
        position: Point,
    },
    DragEnd {
        target: HitTarget,
        position: Point,
    },
    /// The drag was aborted by pointer-cancel or a second pointer.
    DragCancel {
        target: HitTarget,
    },
}

/// Classification thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Distance in pixels beyond which a press becomes a drag.
    pub drag_threshold: f64,
    /// Minimum distance in pixels of a swipe.
    pub swipe_threshold: f64,
    /// A tap must be released before this.
    pub tap_timeout: Duration,
    /// A swipe must be released before this.
    pub swipe_timeout: Duration,
    /// Holding still this long is a long press.
    pub long_press: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 10.0,
            swipe_threshold: 50.0,
            tap_timeout: Duration::from_millis(300),
            swipe_timeout: Duration::from_millis(300),
            long_press: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Press {
    pointer: PointerId,
    origin: Point,
    started_at: Instant,
    target: Option<HitTarget>,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    /// Down, still within the drag threshold; long press armed.
    Pressed(Press),
    /// Past the drag threshold over a non-draggable target (swipe candidate).
    Moving(Press),
    /// Past the drag threshold over a slider thumb.
    Dragging(Press, HitTarget),
    /// Ignore everything until all pointers are up.
    Suppressed,
}

/// Pointer-sequence state machine.
#[derive(Debug)]
pub struct GestureClassifier {
    config: GestureConfig,
    phase: Phase,
    pointers_down: Vec<PointerId>,
}

impl GestureClassifier {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            pointers_down: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// When the armed long press fires, if one is armed.
    #[must_use]
    pub fn long_press_deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Pressed(press) => Some(press.started_at + self.config.long_press),
            _ => None,
        }
    }

    /// Target of the drag in progress, if any.
    #[must_use]
    pub fn active_drag(&self) -> Option<HitTarget> {
        match self.phase {
            Phase::Dragging(_, target) => Some(target),
            _ => None,
        }
    }

    /// Fire the long press if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<Gesture> {
        let Phase::Pressed(press) = self.phase else {
            return None;
        };
        if now < press.started_at + self.config.long_press {
            return None;
        }
        self.phase = Phase::Suppressed;
        Some(Gesture::LongPress {
            target: press.target,
            position: press.origin,
        })
    }

    /// Feed one pointer event and collect the gestures it completes.
    pub fn handle(&mut self, event: PointerEvent) -> Vec<Gesture> {
        let mut out = Vec::new();
        if let Some(long_press) = self.poll(event.at) {
            out.push(long_press);
        }

        match event.phase {
            PointerPhase::Down => self.on_down(event, &mut out),
            PointerPhase::Move => self.on_move(event, &mut out),
            PointerPhase::Up => self.on_up(event, &mut out),
            PointerPhase::Cancel => self.on_cancel(event, &mut out),
        }
        out
    }

    fn on_down(&mut self, event: PointerEvent, out: &mut Vec<Gesture>) {
        if !self.pointers_down.contains(&event.pointer) {
            self.pointers_down.push(event.pointer);
        }
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Pressed(Press {
                    pointer: event.pointer,
                    origin: event.position,
                    started_at: event.at,
                    target: event.target,
                });
            }
            Phase::Pressed(press) | Phase::Moving(press) if press.pointer != event.pointer => {
                tracing::debug!("second pointer down, gesture cancelled");
                self.phase = Phase::Suppressed;
            }
            Phase::Dragging(press, target) if press.pointer != event.pointer => {
                tracing::debug!("second pointer down, drag cancelled");
                out.push(Gesture::DragCancel { target });
                self.phase = Phase::Suppressed;
            }
            _ => {}
        }
    }

    fn on_move(&mut self, event: PointerEvent, out: &mut Vec<Gesture>) {
        match self.phase {
            Phase::Pressed(press) if press.pointer == event.pointer => {
                if press.origin.distance_to(event.position) <= self.config.drag_threshold {
                    return;
                }
                match press.target.filter(HitTarget::is_draggable) {
                    Some(target) => {
                        out.push(Gesture::DragStart {
                            target,
                            origin: press.origin,
                        });
                        out.push(Gesture::DragMove {
                            target,
                            position: event.position,
                        });
                        self.phase = Phase::Dragging(press, target);
                    }
                    None => self.phase = Phase::Moving(press),
                }
            }
            Phase::Dragging(press, target) if press.pointer == event.pointer => {
                out.push(Gesture::DragMove {
                    target,
                    position: event.position,
                });
            }
            _ => {}
        }
    }

    fn on_up(&mut self, event: PointerEvent, out: &mut Vec<Gesture>) {
        self.release(event.pointer);
        match self.phase {
            Phase::Pressed(press) | Phase::Moving(press) if press.pointer == event.pointer => {
                if let Some(gesture) = self.classify_release(press, event) {
                    out.push(gesture);
                }
                self.phase = Phase::Idle;
            }
            Phase::Dragging(press, target) if press.pointer == event.pointer => {
                out.push(Gesture::DragEnd {
                    target,
                    position: event.position,
                });
                self.phase = Phase::Idle;
            }
            Phase::Suppressed if self.pointers_down.is_empty() => self.phase = Phase::Idle,
            _ => {}
        }
    }

    fn on_cancel(&mut self, event: PointerEvent, out: &mut Vec<Gesture>) {
        let owns_gesture = match self.phase {
            Phase::Pressed(press) | Phase::Moving(press) | Phase::Dragging(press, _) => {
                press.pointer == event.pointer
            }
            Phase::Idle | Phase::Suppressed => false,
        };
        if !owns_gesture && !self.pointers_down.contains(&event.pointer) {
            tracing::trace!(pointer = event.pointer, "cancel for untracked pointer ignored");
            return;
        }
        self.release(event.pointer);
        if let Phase::Dragging(_, target) = self.phase {
            out.push(Gesture::DragCancel { target });
        }
        self.phase = if self.pointers_down.is_empty() {
            Phase::Idle
        } else {
            Phase::Suppressed
        };
    }

    fn release(&mut self, pointer: PointerId) {
        self.pointers_down.retain(|p| *p != pointer);
    }

    fn classify_release(&self, press: Press, event: PointerEvent) -> Option<Gesture> {
        let elapsed = event.at.saturating_duration_since(press.started_at);
        let distance = press.origin.distance_to(event.position);

        if elapsed < self.config.tap_timeout && distance < self.config.swipe_threshold {
            return Some(Gesture::Tap {
                target: press.target,
                position: event.position,
            });
        }
        if elapsed < self.config.swipe_timeout && distance >= self.config.swipe_threshold {
            return Some(Gesture::Swipe {
                direction: SwipeDirection::from_delta(
                    event.position.x - press.origin.x,
                    event.position.y - press.origin.y,
                ),
                target: press.target,
            });
        }
        tracing::trace!(?elapsed, distance, "release not classified");
        None
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn thumb() -> HitTarget {
        HitTarget::new(ControlHandle::from_raw(1), TargetRole::SliderThumb)
    }

    fn tile() -> HitTarget {
        HitTarget::new(ControlHandle::from_raw(2), TargetRole::Tile)
    }

    fn run(classifier: &mut GestureClassifier, events: &[PointerEvent]) -> Vec<Gesture> {
        events.iter().flat_map(|e| classifier.handle(*e)).collect()
    }

    #[test]
    fn should_classify_short_still_press_as_single_tap() {
        let t0 = Instant::now();
        let mut classifier = GestureClassifier::default();
        let gestures = run(
            &mut classifier,
            &[
                PointerEvent::down(0, Point::new(100.0, 100.0), t0, Some(tile())),
                PointerEvent::moved(0, Point::new(104.0, 103.0), t0 + ms(100)),
                PointerEvent::up(0, Point::new(104.0, 103.0), t0 + ms(250)),
            ],
        );
        assert_eq!(gestures.len(), 1);
        assert!(matches!(gestures[0], Gesture::Tap { target: Some(t), .. } if t == tile()));
    }

    #[test]
    fn should_not_start_drag_for_tap_on_thumb() {
        let t0 = Instant::now();
        let mut classifier = GestureClassifier::default();
        let gestures = run(
            &mut classifier,
            &[
                PointerEvent::down(0, Point::new(10.0, 10.0), t0, Some(thumb())),
                PointerEvent::moved(0, Point::new(15.0, 10.0), t0 + ms(50)),
                PointerEvent::up(0, Point::new(15.0, 10.0), t0 + ms(100)),
            ],
        );
        assert!(!gestures.iter().any(|g| matches!(g, Gesture::DragStart { .. })));
        assert_eq!(
            gestures.iter().filter(|g| matches!(g, Gesture::Tap { .. })).count(),
            1
        );
    }

    #[test]
    fn should_classify_fast_horizontal_motion_as_swipe_right() {
        let t0 = Instant::now();
        let mut classifier = GestureClassifier::default();
        let gestures = run(
            &mut classifier,
            &[
                PointerEvent::down(0, Point::new(100.0, 300.0), t0, None),
                PointerEvent::moved(0, Point::new(140.0, 302.0), t0 + ms(100)),
                PointerEvent::up(0, Point::new(180.0, 305.0), t0 + ms(200)),
            ],
        );
        assert_eq!(
            gestures,
            vec![Gesture::Swipe {
                direction: SwipeDirection::Right,
                target: None
            }]
        );
    }

    #[test]
    fn should_classify_leftward_motion_as_swipe_left() {
        let t0 = Instant::now();
        let mut classifier = GestureClassifier::default();
        let gestures = run(
            &mut classifier,
            &[
                PointerEvent::down(0, Point::new(300.0, 300.0), t0, Some(tile())),
                PointerEvent::up(0, Point::new(220.0, 290.0), t0 + ms(200)),
            ],
        );
        assert!(matches!(
            gestures.as_slice(),
            [Gesture::Swipe {
                direction: SwipeDirection::Left,
                ..
            }]
        ));
    }

    #[test]
    fn should_pick_vertical_direction_when_dy_dominates() {
        assert_eq!(SwipeDirection::from_delta(10.0, 80.0), SwipeDirection::Down);
        assert_eq!(SwipeDirection::from_delta(-10.0, -80.0), SwipeDirection::Up);
    }

    #[test]
    fn should_ignore_slow_release() {
        let t0 = Instant::now();
        let mut classifier = GestureClassifier::default();
        let gestures = run(
            &mut classifier,
            &[
                PointerEvent::down(0, Point::new(0.0, 0.0), t0, Some(tile())),
                PointerEvent::moved(0, Point::new(30.0, 0.0), t0 + ms(100)),
                PointerEvent::up(0, Point::new(30.0, 0.0), t0 + ms(400)),
            ],
        );
        assert!(gestures.is_empty());
    }

    #[test]
    fn should_fire_long_press_when_polled_after_deadline() {
        let t0 = Instant::now();
        let mut classifier = GestureClassifier::default();
        classifier.handle(PointerEvent::down(0, Point::new(5.0, 5.0), t0, Some(tile())));
        assert_eq!(classifier.long_press_deadline(), Some(t0 + ms(500)));
        assert_eq!(classifier.poll(t0 + ms(499)), None);

        let fired = classifier.poll(t0 + ms(500));
        assert!(matches!(fired, Some(Gesture::LongPress { target: Some(t), .. }) if t == tile()));
        assert_eq!(classifier.long_press_deadline(), None);

        let after = classifier.handle(PointerEvent::up(0, Point::new(5.0, 5.0), t0 + ms(700)));
        assert!(after.is_empty());
    }

    #[test]
    fn should_fire_long_press_lazily_on_late_release() {
        let t0 = Instant::now();
        let mut classifier = GestureClassifier::default();
        let gestures = run(
            &mut classifier,
            &[
                PointerEvent::down(0, Point::new(5.0, 5.0), t0, Some(tile())),
                PointerEvent::up(0, Point::new(5.0, 5.0), t0 + ms(900)),
            ],
        );
        assert!(matches!(gestures.as_slice(), [Gesture::LongPress { .. }]));
    }

    #[test]
    fn should_disarm_long_press_once_moved_past_drag_threshold() {
        let t0 = Instant::now();
        let mut classifier = GestureClassifier::default();
        classifier.handle(PointerEvent::down(0, Point::new(0.0, 0.0), t0, Some(tile())));
        classifier.handle(PointerEvent::moved(0, Point::new(20.0, 0.0), t0 + ms(100)));
        assert_eq!(classifier.long_press_deadline(), None);
        assert_eq!(classifier.poll(t0 + ms(800)), None);
    }

    #[test]
    fn should_emit_drag_sequence_over_thumb() {
        let t0 = Instant::now();
        let mut classifier = GestureClassifier::default();
        let gestures = run(
            &mut classifier,
            &[
                PointerEvent::down(0, Point::new(50.0, 10.0), t0, Some(thumb())),
                PointerEvent::moved(0, Point::new(65.0, 10.0), t0 + ms(30)),
                PointerEvent::moved(0, Point::new(90.0, 12.0), t0 + ms(60)),
                PointerEvent::up(0, Point::new(95.0, 12.0), t0 + ms(900)),
            ],
        );
        assert_eq!(
            gestures,
            vec![
                Gesture::DragStart {
                    target: thumb(),
                    origin: Point::new(50.0, 10.0)
                },
                Gesture::DragMove {
                    target: thumb(),
                    position: Point::new(65.0, 10.0)
                },
                Gesture::DragMove {
                    target: thumb(),
                    position: Point::new(90.0, 12.0)
                },
                Gesture::DragEnd {
                    target: thumb(),
                    position: Point::new(95.0, 12.0)
                },
            ]
        );
        assert_eq!(classifier.active_drag(), None);
    }

    #[test]
    fn should_cancel_drag_when_second_pointer_goes_down() {
        let t0 = Instant::now();
        let mut classifier = GestureClassifier::default();
        let gestures = run(
            &mut classifier,
            &[
                PointerEvent::down(0, Point::new(50.0, 10.0), t0, Some(thumb())),
                PointerEvent::moved(0, Point::new(80.0, 10.0), t0 + ms(30)),
                PointerEvent::down(1, Point::new(300.0, 300.0), t0 + ms(40), None),
                PointerEvent::moved(0, Point::new(120.0, 10.0), t0 + ms(50)),
                PointerEvent::up(0, Point::new(120.0, 10.0), t0 + ms(60)),
                PointerEvent::up(1, Point::new(300.0, 300.0), t0 + ms(70)),
            ],
        );
        assert_eq!(
            gestures.last(),
            Some(&Gesture::DragCancel { target: thumb() })
        );
        assert!(!gestures.iter().any(|g| matches!(g, Gesture::DragEnd { .. })));

        let next = run(
            &mut classifier,
            &[
                PointerEvent::down(0, Point::new(0.0, 0.0), t0 + ms(1000), Some(tile())),
                PointerEvent::up(0, Point::new(0.0, 0.0), t0 + ms(1100)),
            ],
        );
        assert!(matches!(next.as_slice(), [Gesture::Tap { .. }]));
    }

    #[test]
    fn should_suppress_tap_when_pinching() {
        let t0 = Instant::now();
        let mut classifier = GestureClassifier::default();
        let gestures = run(
            &mut classifier,
            &[
                PointerEvent::down(0, Point::new(0.0, 0.0), t0, Some(tile())),
                PointerEvent::down(1, Point::new(40.0, 40.0), t0 + ms(10), Some(tile())),
                PointerEvent::up(1, Point::new(60.0, 60.0), t0 + ms(100)),
                PointerEvent::up(0, Point::new(0.0, 0.0), t0 + ms(120)),
            ],
        );
        assert!(gestures.is_empty());
    }

    #[test]
    fn should_discard_gesture_on_pointer_cancel() {
        let t0 = Instant::now();
        let mut classifier = GestureClassifier::default();
        let gestures = run(
            &mut classifier,
            &[
                PointerEvent::down(0, Point::new(0.0, 0.0), t0, Some(tile())),
                PointerEvent::cancel(0, Point::new(0.0, 0.0), t0 + ms(50)),
            ],
        );
        assert!(gestures.is_empty());
        assert_eq!(classifier.long_press_deadline(), None);
    }

    #[test]
    fn should_ignore_cancel_of_untracked_pointer() {
        let t0 = Instant::now();
        let mut classifier = GestureClassifier::default();
        let gestures = run(
            &mut classifier,
            &[
                PointerEvent::down(0, Point::new(0.0, 0.0), t0, Some(tile())),
                PointerEvent::cancel(7, Point::new(300.0, 300.0), t0 + ms(20)),
                PointerEvent::up(0, Point::new(1.0, 0.0), t0 + ms(80)),
            ],
        );
        assert_eq!(gestures.len(), 1);
        assert!(matches!(gestures[0], Gesture::Tap { target: Some(t), .. } if t == tile()));
    }

    #[test]
    fn should_emit_drag_cancel_on_pointer_cancel_during_drag() {
        let t0 = Instant::now();
        let mut classifier = GestureClassifier::default();
        let gestures = run(
            &mut classifier,
            &[
                PointerEvent::down(0, Point::new(0.0, 0.0), t0, Some(thumb())),
                PointerEvent::moved(0, Point::new(40.0, 0.0), t0 + ms(20)),
                PointerEvent::cancel(0, Point::new(40.0, 0.0), t0 + ms(50)),
            ],
        );
        assert_eq!(
            gestures.last(),
            Some(&Gesture::DragCancel { target: thumb() })
        );
    }

    #[test]
    fn should_not_drag_non_draggable_target() {
        let t0 = Instant::now();
        let mut classifier = GestureClassifier::default();
        let gestures = run(
            &mut classifier,
            &[
                PointerEvent::down(0, Point::new(0.0, 0.0), t0, Some(tile())),
                PointerEvent::moved(0, Point::new(30.0, 0.0), t0 + ms(20)),
                PointerEvent::moved(0, Point::new(60.0, 0.0), t0 + ms(40)),
            ],
        );
        assert!(gestures.is_empty());
        assert_eq!(classifier.active_drag(), None);
    }
}
