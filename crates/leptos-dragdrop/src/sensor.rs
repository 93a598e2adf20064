//! Drag Sensors
//!
//! Pointer and keyboard input turned into drag gestures. Both sensors are
//! plain state machines so they can be driven from DOM listeners or tests.

use crate::collision::{corner_distance, Droppable};
use crate::geometry::{Point, Rect};

/// Pointer travel in pixels before a press becomes a drag
pub const DEFAULT_ACTIVATION_DISTANCE: f64 = 10.0;

/// Where the pointer sensor is in a gesture
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PointerPhase {
    #[default]
    Idle,
    /// Button is down but the pointer has not travelled far enough yet
    Pending { id: String, origin: Point, rect: Rect },
    Dragging { id: String, origin: Point, rect: Rect, current: Point },
}

/// Result of feeding pointer motion to the sensor
#[derive(Clone, Debug, PartialEq)]
pub enum PointerMotion {
    /// Activation distance exceeded, a drag begins
    Activated { id: String, rect: Rect },
    /// Drag in progress, `rect` is the dragged card at its current position
    Moved { id: String, rect: Rect },
}

/// Pointer sensor with an anti-jitter activation constraint
#[derive(Clone, Debug, PartialEq)]
pub struct PointerSensor {
    activation_distance: f64,
    phase: PointerPhase,
}

impl Default for PointerSensor {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVATION_DISTANCE)
    }
}

impl PointerSensor {
    pub fn new(activation_distance: f64) -> Self {
        Self { activation_distance, phase: PointerPhase::Idle }
    }

    pub fn phase(&self) -> &PointerPhase {
        &self.phase
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, PointerPhase::Dragging { .. })
    }

    /// Button pressed on a draggable whose rectangle is `rect`
    pub fn press(&mut self, id: impl Into<String>, at: Point, rect: Rect) {
        self.phase = PointerPhase::Pending { id: id.into(), origin: at, rect };
    }

    pub fn motion(&mut self, at: Point) -> Option<PointerMotion> {
        match &mut self.phase {
            PointerPhase::Idle => None,
            PointerPhase::Pending { id, origin, rect } => {
                if at.distance(*origin) <= self.activation_distance {
                    return None;
                }
                let (id, origin, rect) = (id.clone(), *origin, *rect);
                let moved = rect.translate(at.delta_from(origin));
                self.phase = PointerPhase::Dragging { id: id.clone(), origin, rect, current: at };
                Some(PointerMotion::Activated { id, rect: moved })
            }
            PointerPhase::Dragging { id, origin, rect, current } => {
                *current = at;
                Some(PointerMotion::Moved {
                    id: id.clone(),
                    rect: rect.translate(at.delta_from(*origin)),
                })
            }
        }
    }

    /// Button released. Returns the dragged id when a drag was active;
    /// a press that never activated is an ordinary click and yields `None`.
    pub fn release(&mut self) -> Option<String> {
        match std::mem::take(&mut self.phase) {
            PointerPhase::Dragging { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Arrow direction for keyboard moves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// What a key press means to the keyboard sensor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Pick,
    Drop,
    Cancel,
    Move(Direction),
}

/// Map a `KeyboardEvent.key` value to a drag action
pub fn key_action(key: &str, dragging: bool) -> Option<KeyAction> {
    match (key, dragging) {
        (" " | "Enter", false) => Some(KeyAction::Pick),
        (" " | "Enter", true) => Some(KeyAction::Drop),
        ("Escape", true) => Some(KeyAction::Cancel),
        ("ArrowUp", true) => Some(KeyAction::Move(Direction::Up)),
        ("ArrowDown", true) => Some(KeyAction::Move(Direction::Down)),
        ("ArrowLeft", true) => Some(KeyAction::Move(Direction::Left)),
        ("ArrowRight", true) => Some(KeyAction::Move(Direction::Right)),
        _ => None,
    }
}

/// A keyboard-driven drag in progress
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardDrag {
    pub id: String,
    pub rect: Rect,
    pub over: Option<String>,
}

impl KeyboardDrag {
    pub fn new(id: impl Into<String>, rect: Rect) -> Self {
        let id = id.into();
        Self { over: Some(id.clone()), id, rect }
    }

    /// Jump to the nearest drop zone in `direction`. Returns the new over id.
    pub fn step(&mut self, direction: Direction, droppables: &[Droppable]) -> Option<String> {
        let (over, rect) = keyboard_coordinates(&self.rect, direction, droppables, self.over.as_deref())?;
        self.rect = rect;
        self.over = Some(over.clone());
        Some(over)
    }
}

/// Nearest drop zone (by corner proximity) lying in `direction` from the
/// active rectangle, skipping `current`. Up/Down compare top edges.
/// Left/Right need the zone to clear the active rectangle entirely and only
/// land on outer zones (those not nested in another zone), so a horizontal
/// step reaches the neighbouring container rather than an item in it.
/// Returns its id and the active rectangle re-anchored onto it.
pub fn keyboard_coordinates(
    active: &Rect,
    direction: Direction,
    droppables: &[Droppable],
    current: Option<&str>,
) -> Option<(String, Rect)> {
    let horizontal = matches!(direction, Direction::Left | Direction::Right);
    droppables
        .iter()
        .filter(|d| Some(d.id.as_str()) != current)
        .filter(|d| !horizontal || !is_nested(d, droppables))
        .filter(|d| match direction {
            Direction::Up => d.rect.top < active.top,
            Direction::Down => d.rect.top > active.top,
            Direction::Left => d.rect.right() <= active.left,
            Direction::Right => d.rect.left >= active.right(),
        })
        .map(|d| (corner_distance(active, &d.rect), d))
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, d)| (d.id.clone(), active.moved_to(d.rect.top_left())))
}

fn is_nested(zone: &Droppable, droppables: &[Droppable]) -> bool {
    droppables
        .iter()
        .any(|outer| outer.id != zone.id && outer.rect != zone.rect && outer.rect.contains(&zone.rect))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> Rect {
        Rect::new(10.0, 10.0, 200.0, 80.0)
    }

    #[test]
    fn test_click_does_not_activate() {
        let mut sensor = PointerSensor::new(10.0);
        sensor.press("lead-1", Point::new(50.0, 50.0), card());
        assert_eq!(sensor.motion(Point::new(56.0, 56.0)), None);
        assert!(!sensor.is_dragging());
        assert_eq!(sensor.release(), None);
        assert_eq!(sensor.phase(), &PointerPhase::Idle);
    }

    #[test]
    fn test_activation_after_threshold() {
        let mut sensor = PointerSensor::new(10.0);
        sensor.press("lead-1", Point::new(50.0, 50.0), card());
        let motion = sensor.motion(Point::new(62.0, 50.0));
        assert_eq!(
            motion,
            Some(PointerMotion::Activated { id: "lead-1".into(), rect: Rect::new(22.0, 10.0, 200.0, 80.0) })
        );
        assert!(sensor.is_dragging());

        let motion = sensor.motion(Point::new(150.0, 90.0));
        assert_eq!(
            motion,
            Some(PointerMotion::Moved { id: "lead-1".into(), rect: Rect::new(110.0, 50.0, 200.0, 80.0) })
        );
        assert_eq!(sensor.release(), Some("lead-1".to_string()));
        assert!(!sensor.is_dragging());
    }

    #[test]
    fn test_motion_without_press_is_ignored() {
        let mut sensor = PointerSensor::default();
        assert_eq!(sensor.motion(Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_key_actions() {
        assert_eq!(key_action(" ", false), Some(KeyAction::Pick));
        assert_eq!(key_action("Enter", true), Some(KeyAction::Drop));
        assert_eq!(key_action("Escape", true), Some(KeyAction::Cancel));
        assert_eq!(key_action("Escape", false), None);
        assert_eq!(key_action("ArrowLeft", false), None);
        assert_eq!(key_action("ArrowRight", true), Some(KeyAction::Move(Direction::Right)));
    }

    #[test]
    fn test_keyboard_steps_to_next_lane() {
        let zones = vec![
            Droppable::new("new", Rect::new(0.0, 0.0, 250.0, 600.0)),
            Droppable::new("lead-1", Rect::new(10.0, 10.0, 200.0, 80.0)),
            Droppable::new("in-attendance", Rect::new(266.0, 0.0, 250.0, 600.0)),
            Droppable::new("contacted", Rect::new(532.0, 0.0, 250.0, 600.0)),
        ];
        let mut drag = KeyboardDrag::new("lead-1", card());
        assert_eq!(drag.step(Direction::Right, &zones), Some("in-attendance".to_string()));
        assert_eq!(drag.rect.top_left(), Point::new(266.0, 0.0));
        assert_eq!(drag.step(Direction::Right, &zones), Some("contacted".to_string()));
        assert_eq!(drag.step(Direction::Right, &zones), None);
        assert_eq!(drag.over.as_deref(), Some("contacted"));
    }

    #[test]
    fn test_keyboard_right_skips_cards_in_next_lane() {
        let zones = vec![
            Droppable::new("new", Rect::new(0.0, 0.0, 250.0, 600.0)),
            Droppable::new("lead-1", Rect::new(10.0, 10.0, 200.0, 80.0)),
            Droppable::new("in-attendance", Rect::new(266.0, 0.0, 250.0, 600.0)),
            Droppable::new("lead-2", Rect::new(276.0, 10.0, 200.0, 80.0)),
            Droppable::new("lead-3", Rect::new(276.0, 100.0, 200.0, 80.0)),
        ];
        let mut drag = KeyboardDrag::new("lead-1", card());
        assert_eq!(drag.step(Direction::Right, &zones), Some("in-attendance".to_string()));
        // Vertical steps still reach the cards inside the lane
        assert_eq!(drag.step(Direction::Down, &zones), Some("lead-2".to_string()));
        assert_eq!(drag.step(Direction::Left, &zones), Some("new".to_string()));
    }
}
