//! Input state management for mouse/touch/keyboard events.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
    /// Double-click reported by the host. Hosts that only forward raw
    /// presses get the same result from [`InputState`]'s own detection.
    DoubleClick {
        position: Point,
    },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::DoubleClick { position } => *position,
        }
    }
}

/// Keyboard event type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

/// Double-click detection constants.
const DOUBLE_CLICK_TIME: Duration = Duration::from_millis(500);
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Tracks the current input state across frames.
///
/// Time only moves when [`InputState::advance`] is called, so gestures
/// replay identically given the same events and ticks.
#[derive(Debug, Clone)]
pub struct InputState {
    /// Current pointer position.
    pub pointer_position: Point,
    /// Current modifier keys state.
    pub modifiers: Modifiers,
    /// Time accumulated from ticks.
    clock: Duration,
    /// Last click time for double-click detection.
    last_click_time: Option<Duration>,
    /// Last click position for double-click detection.
    last_click_position: Option<Point>,
    /// Whether a double-click was detected this frame.
    double_click_detected: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            pointer_position: Point::ZERO,
            modifiers: Modifiers::default(),
            clock: Duration::ZERO,
            last_click_time: None,
            last_click_position: None,
            double_click_detected: false,
        }
    }
}

impl InputState {
    /// Create a new input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the start of each frame to reset per-frame state.
    pub fn begin_frame(&mut self) {
        self.double_click_detected = false;
    }

    /// Advance the input clock.
    pub fn advance(&mut self, dt: Duration) {
        self.clock += dt;
    }

    /// Time accumulated from ticks.
    pub fn now(&self) -> Duration {
        self.clock
    }

    /// Process a pointer event.
    pub fn handle_pointer_event(&mut self, event: &PointerEvent) {
        match *event {
            PointerEvent::Down { position, button } => {
                self.pointer_position = position;
                if button == MouseButton::Left {
                    self.detect_double_click(position);
                }
            }
            PointerEvent::Up { position, .. } | PointerEvent::Move { position } => {
                self.pointer_position = position;
            }
            PointerEvent::DoubleClick { position } => {
                self.pointer_position = position;
                self.double_click_detected = true;
                self.last_click_time = None;
                self.last_click_position = None;
            }
        }
    }

    fn detect_double_click(&mut self, position: Point) {
        let now = self.clock;
        if let (Some(last_time), Some(last_pos)) = (self.last_click_time, self.last_click_position) {
            if now.saturating_sub(last_time) < DOUBLE_CLICK_TIME
                && position.distance(last_pos) < DOUBLE_CLICK_DISTANCE
            {
                self.double_click_detected = true;
                // Reset so a third click starts a new pair
                self.last_click_time = None;
                self.last_click_position = None;
                return;
            }
        }
        self.last_click_time = Some(now);
        self.last_click_position = Some(position);
    }

    /// Update modifier keys state.
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// Check if a double-click was detected this frame.
    pub fn is_double_click(&self) -> bool {
        self.double_click_detected
    }
}
