//! Keyboard and pointer input primitives.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn ctrl_shift() -> Self {
        Self {
            ctrl: true,
            shift: true,
            ..Self::NONE
        }
    }
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Delete,
    Backspace,
    Enter,
    Character(char),
}

impl Key {
    /// Map a DOM/winit style key name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Escape" | "Esc" => Some(Key::Escape),
            "Delete" | "Del" => Some(Key::Delete),
            "Backspace" => Some(Key::Backspace),
            "Enter" | "Return" => Some(Key::Enter),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Key::Character(c.to_ascii_lowercase())),
                    _ => None,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

/// Detects double clicks from consecutive presses.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    last: Option<(Instant, Point)>,
    window: Duration,
    max_distance: f64,
}

impl ClickTracker {
    pub fn new(window: Duration, max_distance: f64) -> Self {
        Self {
            last: None,
            window,
            max_distance,
        }
    }

    /// Record a press; true if it completes a double click.
    pub fn register(&mut self, position: Point, now: Instant) -> bool {
        let is_double = self.last.is_some_and(|(at, pos)| {
            now.saturating_duration_since(at) <= self.window
                && (position - pos).hypot() <= self.max_distance
        });
        // A third click starts a new pair.
        self.last = if is_double { None } else { Some((now, position)) };
        is_double
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
