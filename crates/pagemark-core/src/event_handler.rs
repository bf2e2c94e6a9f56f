//! Event handling for tool interactions.
//!
//! Pointer positions arrive in screen pixels and are mapped to page
//! coordinates through the canvas viewport. Moves never touch history; each
//! gesture commits at most once, on release.

use crate::canvas::Canvas;
use crate::input::{ClickTracker, Key, KeyPress};
use crate::selection::{HandleKind, ManipulationState, apply_manipulation, hit_test_handles};
use crate::shortcuts::{ShortcutAction, ShortcutRegistry};
use crate::tools::{ToolKind, begin_draft, extend_draft};
use kurbo::Point;
use std::time::Instant;

/// What currently owns the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyFocus {
    #[default]
    Canvas,
    /// A form field elsewhere in the shell, e.g. the export name input.
    TextInput,
}

#[derive(Debug, Clone)]
enum Gesture {
    Draft,
    Manipulate(ManipulationState),
    Pan { last: Point },
}

/// Translates pointer and keyboard events into canvas operations.
#[derive(Debug, Clone)]
pub struct EventHandler {
    gesture: Option<Gesture>,
    clicks: ClickTracker,
}

impl EventHandler {
    pub fn new(canvas: &Canvas) -> Self {
        Self {
            gesture: None,
            clicks: ClickTracker::new(
                canvas.config.double_click_window(),
                canvas.config.double_click_distance,
            ),
        }
    }

    pub fn is_manipulating(&self) -> bool {
        matches!(self.gesture, Some(Gesture::Manipulate(_)))
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.gesture, Some(Gesture::Pan { .. }))
    }

    pub fn manipulation(&self) -> Option<&ManipulationState> {
        match &self.gesture {
            Some(Gesture::Manipulate(m)) => Some(m),
            _ => None,
        }
    }

    /// Abort the current gesture. A manipulated shape snaps back.
    pub fn cancel(&mut self, canvas: &mut Canvas) {
        if let Some(Gesture::Manipulate(m)) = self.gesture.take() {
            if let Some(shape) = canvas.document.get_shape_mut(m.shape_id) {
                *shape = m.original_shape;
            }
        }
    }

    /// Pointer down at `screen_point`.
    pub fn handle_press(&mut self, canvas: &mut Canvas, screen_point: Point, now: Instant) {
        let world = canvas.viewport.screen_to_world(screen_point);
        let double = self.clicks.register(screen_point, now);
        let tolerance = canvas.config.hit_tolerance / canvas.viewport.zoom;

        if let Some(editing) = canvas.editing {
            let hits = canvas.document.shapes_at_point(canvas.current_page(), world, tolerance);
            if hits.first() == Some(&editing) {
                return;
            }
            canvas.exit_text_edit();
        }

        let tool = canvas.current_tool();
        match tool {
            ToolKind::Pan => {
                self.gesture = Some(Gesture::Pan { last: screen_point });
            }
            ToolKind::Select => self.press_select(canvas, world, tolerance, double),
            ToolKind::Text => {
                let page = canvas.current_page();
                if let Some(shape) = begin_draft(tool, world, page, &canvas.defaults) {
                    let id = canvas.add_shape(shape);
                    canvas.enter_text_edit(id);
                }
            }
            _ => {
                canvas.clear_selection();
                let page = canvas.current_page();
                if let Some(shape) = begin_draft(tool, world, page, &canvas.defaults) {
                    canvas.begin_draft(shape, world);
                    self.gesture = Some(Gesture::Draft);
                }
            }
        }
    }

    fn press_select(&mut self, canvas: &mut Canvas, world: Point, tolerance: f64, double: bool) {
        let hits = canvas.document.shapes_at_point(canvas.current_page(), world, tolerance);
        let top = hits.first().copied();

        if double {
            if let Some(id) = top.filter(|id| canvas.document.get_shape(*id).is_some_and(|s| s.is_text())) {
                canvas.enter_text_edit(id);
                return;
            }
        }

        let handle_tolerance = canvas.config.handle_hit_radius / canvas.viewport.zoom;
        if let Some(selected) = canvas.selected_shape() {
            if let Some(handle) = hit_test_handles(selected, world, handle_tolerance) {
                log::debug!("Grabbed {:?} on {}", handle, selected.id);
                self.gesture = Some(Gesture::Manipulate(ManipulationState::new(
                    selected.id,
                    Some(handle),
                    world,
                    selected.clone(),
                )));
                return;
            }
        }

        let Some(id) = top else {
            canvas.clear_selection();
            return;
        };
        canvas.select(Some(id));
        if let Some(shape) = canvas.document.get_shape(id).filter(|s| s.is_transformable()) {
            self.gesture = Some(Gesture::Manipulate(ManipulationState::new(
                id,
                None,
                world,
                shape.clone(),
            )));
        }
    }

    /// Pointer moved to `screen_point` with the button held.
    pub fn handle_drag(&mut self, canvas: &mut Canvas, screen_point: Point) {
        let world = canvas.viewport.screen_to_world(screen_point);
        match &mut self.gesture {
            Some(Gesture::Pan { last }) => {
                canvas.viewport.pan(screen_point - *last);
                *last = screen_point;
            }
            Some(Gesture::Manipulate(m)) => {
                m.current_point = world;
                let min_size = canvas.config.min_resize;
                if let Some(updated) = apply_manipulation(&m.original_shape, m.handle, m.delta(), min_size) {
                    if let Some(shape) = canvas.document.get_shape_mut(m.shape_id) {
                        *shape = updated;
                    }
                }
            }
            Some(Gesture::Draft) => {
                let threshold = canvas.config.decimation_threshold;
                if let Some((id, origin)) = canvas.tool_manager.drafting() {
                    if let Some(shape) = canvas.document.get_shape_mut(id) {
                        extend_draft(shape, origin, world, threshold);
                    }
                }
            }
            None => {}
        }
    }

    /// Pointer up. Finishes the gesture with a single history commit.
    pub fn handle_release(&mut self, canvas: &mut Canvas) {
        match self.gesture.take() {
            Some(Gesture::Draft) => {
                canvas.commit_draft();
            }
            Some(Gesture::Manipulate(m)) => {
                if m.moved() && canvas.commit() {
                    let what = match m.handle {
                        None => "Moved",
                        Some(HandleKind::Anchor(_)) => "Dragged anchor of",
                        Some(_) => "Resized",
                    };
                    log::debug!("{} {}", what, m.shape_id);
                }
            }
            Some(Gesture::Pan { .. }) | None => {}
        }
    }

    pub fn handle_wheel(&mut self, canvas: &mut Canvas, screen_point: Point, delta_y: f64) -> bool {
        canvas.wheel(screen_point, delta_y)
    }

    /// Keyboard input. The open text overlay gets first refusal; global
    /// shortcuts are ignored while a text input has focus.
    pub fn handle_key(&mut self, canvas: &mut Canvas, press: KeyPress, focus: KeyFocus) -> bool {
        if canvas.is_editing() {
            return match press.key {
                Key::Escape => {
                    canvas.exit_text_edit();
                    true
                }
                Key::Enter if !press.modifiers.shift => {
                    canvas.exit_text_edit();
                    true
                }
                _ => false,
            };
        }
        if focus == KeyFocus::TextInput {
            return false;
        }
        let Some(action) = ShortcutRegistry::resolve(&press) else {
            return false;
        };
        if action == ShortcutAction::Cancel {
            self.cancel(canvas);
        }
        ShortcutRegistry::apply(action, canvas)
    }

    /// Overlay blur commits the edit.
    pub fn handle_text_blur(&mut self, canvas: &mut Canvas) {
        canvas.exit_text_edit();
    }
}
