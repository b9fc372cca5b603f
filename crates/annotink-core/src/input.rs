//! Pointer and keyboard events reported by the rendering surface.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer event with a stage-relative position.
///
/// Touch input maps onto the same variants: a tap is a `Click` and a
/// double tap a `DoubleClick`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
    Click { position: Point },
    DoubleClick { position: Point },
}

impl PointerEvent {
    /// Stage-relative pointer position.
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position }
            | PointerEvent::Click { position }
            | PointerEvent::DoubleClick { position } => position,
        }
    }
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    #[default]
    Enter,
    Escape,
    Tab,
    Character(String),
}

impl Key {
    /// Map a legacy DOM key code.
    pub fn from_key_code(code: u32) -> Option<Self> {
        match code {
            13 => Some(Key::Enter),
            27 => Some(Key::Escape),
            9 => Some(Key::Tab),
            _ => char::from_u32(code)
                .filter(|c| !c.is_control())
                .map(|c| Key::Character(c.to_string())),
        }
    }
}

/// Double-click detection constants.
const DOUBLE_CLICK_TIME_MS: u64 = 500;
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Synthesises `Click` and `DoubleClick` events for surfaces that only
/// report raw press and release.
///
/// [`Editor::handle_raw_pointer`](crate::Editor::handle_raw_pointer) runs
/// every raw event through one of these.
#[derive(Debug, Clone, Default)]
pub struct ClickDetector {
    /// Where the current press started.
    press_position: Option<Point>,
    /// Time and position of the last completed click.
    last_click: Option<(u64, Point)>,
}

impl ClickDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a raw event with its timestamp in milliseconds.
    ///
    /// Returns the raw event followed by any synthesised click events.
    pub fn feed(&mut self, event: PointerEvent, time_ms: u64) -> Vec<PointerEvent> {
        let mut out = vec![event];
        match event {
            PointerEvent::Down { position } => {
                self.press_position = Some(position);
            }
            PointerEvent::Up { position } => {
                let Some(pressed) = self.press_position.take() else {
                    return out;
                };
                if pressed.distance(position) >= DOUBLE_CLICK_DISTANCE {
                    // A drag, not a click.
                    self.last_click = None;
                    return out;
                }
                out.push(PointerEvent::Click { position });
                match self.last_click {
                    Some((last_time, last_pos))
                        if time_ms.saturating_sub(last_time) < DOUBLE_CLICK_TIME_MS
                            && last_pos.distance(position) < DOUBLE_CLICK_DISTANCE =>
                    {
                        out.push(PointerEvent::DoubleClick { position });
                        // Reset so a triple click is not a second double click.
                        self.last_click = None;
                    }
                    _ => self.last_click = Some((time_ms, position)),
                }
            }
            _ => {}
        }
        out
    }
}
