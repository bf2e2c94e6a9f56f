//! Keyboard shortcut registry and dispatch.

use crate::canvas::Canvas;
use crate::input::{Key, KeyPress};
use crate::tools::ToolKind;

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Back to the select tool with nothing selected.
    Cancel,
    DeleteSelected,
    Undo,
    Redo,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub action: ShortcutAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        action: ShortcutAction,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            action,
            description,
        }
    }

    /// Display form, e.g. "Ctrl+Shift+Z".
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Every shortcut, for the help surface. Meta works wherever Ctrl does.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Escape", false, false, ShortcutAction::Cancel, "Select tool, clear selection"),
            Shortcut::new("Delete", false, false, ShortcutAction::DeleteSelected, "Delete selected shape"),
            Shortcut::new("Backspace", false, false, ShortcutAction::DeleteSelected, "Delete selected shape"),
            Shortcut::new("Z", true, false, ShortcutAction::Undo, "Undo"),
            Shortcut::new("Z", true, true, ShortcutAction::Redo, "Redo"),
            Shortcut::new("Y", true, false, ShortcutAction::Redo, "Redo"),
        ]
    }

    pub fn resolve(press: &KeyPress) -> Option<ShortcutAction> {
        let command = press.modifiers.command();
        match press.key {
            Key::Escape => Some(ShortcutAction::Cancel),
            Key::Delete | Key::Backspace => Some(ShortcutAction::DeleteSelected),
            Key::Character('z') if command && press.modifiers.shift => Some(ShortcutAction::Redo),
            Key::Character('z') if command => Some(ShortcutAction::Undo),
            Key::Character('y') if command => Some(ShortcutAction::Redo),
            _ => None,
        }
    }

    /// Run `action` against the canvas. Returns true if anything changed.
    pub fn apply(action: ShortcutAction, canvas: &mut Canvas) -> bool {
        match action {
            ShortcutAction::Cancel => {
                canvas.set_tool(ToolKind::Select);
                canvas.clear_selection();
                true
            }
            ShortcutAction::DeleteSelected => canvas.delete_selected().is_some(),
            ShortcutAction::Undo => canvas.undo(),
            ShortcutAction::Redo => canvas.redo(),
        }
    }
}
