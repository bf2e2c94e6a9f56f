//! Canvas document and state management.

use crate::color::SerializableColor;
use crate::config::EditorConfig;
use crate::history::History;
use crate::pages::PageState;
use crate::shapes::{FontStyle, Shape, ShapeId, ShapeKind, ShapePatch};
use crate::style::DefaultStyle;
use crate::tools::{ToolKind, ToolManager};
use crate::viewport::Viewport;
use kurbo::{Point, Size};

/// The annotation scene plus its undo history.
///
/// Shapes are kept in paint order (later = on top). `insert` and `update`
/// leave the history alone; `commit` records the live scene.
#[derive(Debug, Clone, Default)]
pub struct CanvasDocument {
    shapes: Vec<Shape>,
    history: History,
}

impl CanvasDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from persisted annotations; they become the first snapshot.
    pub fn from_shapes(shapes: Vec<Shape>) -> Self {
        Self {
            history: History::new(shapes.clone()),
            shapes,
        }
    }

    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history = self.history.with_limit(limit);
        self
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.iter().any(|s| s.id == id)
    }

    pub fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn get_shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    /// Shapes on `page`, bottom to top.
    pub fn shapes_on_page(&self, page: u32) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().filter(move |s| s.page == page)
    }

    /// Visible shapes on `page` under `point`, topmost first.
    pub fn shapes_at_point(&self, page: u32, point: Point, tolerance: f64) -> Vec<ShapeId> {
        self.shapes
            .iter()
            .rev()
            .filter(|s| s.page == page && s.visible && s.hit_test(point, tolerance))
            .map(|s| s.id)
            .collect()
    }

    /// Layer list for `page`, most recent first.
    pub fn layers(&self, page: u32) -> Vec<&Shape> {
        self.shapes.iter().rev().filter(|s| s.page == page).collect()
    }

    /// Append without recording history.
    pub fn insert(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id;
        self.shapes.push(shape);
        id
    }

    /// Append and record a snapshot.
    pub fn push_shape(&mut self, shape: Shape) -> ShapeId {
        let id = self.insert(shape);
        self.commit();
        id
    }

    /// Merge `patch` into the shape without recording history.
    pub fn update(&mut self, id: ShapeId, patch: &ShapePatch) -> bool {
        match self.get_shape_mut(id) {
            Some(shape) => {
                shape.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Remove without recording history.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.shapes.iter().position(|s| s.id == id)?;
        Some(self.shapes.remove(index))
    }

    /// Record the live scene as a snapshot. Returns false when it equals the
    /// current snapshot.
    pub fn commit(&mut self) -> bool {
        self.history.push(self.shapes.clone())
    }

    /// Step back, restoring the scene from the previous snapshot.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.shapes = snapshot.to_vec();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.shapes = snapshot.to_vec();
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Serialize the annotations in the persisted flat schema.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.shapes)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::from_shapes(serde_json::from_str(json)?))
    }
}

/// Where the text edit overlay sits, in screen pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOverlay {
    pub id: ShapeId,
    pub position: Point,
    /// Font size scaled by the zoom.
    pub font_size: f64,
    pub font_family: String,
    pub font_style: FontStyle,
    pub color: SerializableColor,
    pub text: String,
}

/// Runtime canvas state (not persisted).
#[derive(Debug, Clone)]
pub struct Canvas {
    pub document: CanvasDocument,
    pub viewport: Viewport,
    pub tool_manager: ToolManager,
    /// Style applied to the next drafted shape.
    pub defaults: DefaultStyle,
    pub selection: Option<ShapeId>,
    /// Text shape whose overlay is open.
    pub editing: Option<ShapeId>,
    pub pages: PageState,
    /// Size of the visible container in screen pixels.
    pub container_size: Size,
    pub config: EditorConfig,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self::with_shapes(Vec::new(), config)
    }

    /// Open a canvas on persisted annotations.
    pub fn with_shapes(shapes: Vec<Shape>, config: EditorConfig) -> Self {
        Self {
            document: CanvasDocument::from_shapes(shapes).with_history_limit(config.history_limit),
            viewport: Viewport::new().with_zoom_bounds(config.min_zoom, config.max_zoom),
            tool_manager: ToolManager::new(),
            defaults: DefaultStyle::default(),
            selection: None,
            editing: None,
            pages: PageState::default(),
            container_size: Size::new(800.0, 600.0),
            config,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.pages.current()
    }

    pub fn current_tool(&self) -> ToolKind {
        self.tool_manager.current_tool
    }

    pub fn set_container_size(&mut self, width: f64, height: f64) {
        self.container_size = Size::new(width, height);
    }

    /// Add a finished shape and record it.
    ///
    /// Text becomes selected, ink and eraser strokes leave the selection
    /// alone, anything else clears it.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        let id = self.document.push_shape(shape);
        self.apply_add_selection(id);
        id
    }

    /// Insert a shape that is still being drawn. Nothing is recorded until
    /// [`Canvas::commit_draft`].
    pub fn begin_draft(&mut self, shape: Shape, origin: Point) -> ShapeId {
        let id = self.document.insert(shape);
        self.tool_manager.begin(id, origin);
        id
    }

    /// Finish the in-progress draft with a single history entry.
    pub fn commit_draft(&mut self) -> Option<ShapeId> {
        let id = self.tool_manager.finish()?;
        if !self.document.contains(id) {
            return None;
        }
        self.document.commit();
        self.apply_add_selection(id);
        log::debug!("Committed draft {}", id);
        Some(id)
    }

    fn apply_add_selection(&mut self, id: ShapeId) {
        let Some(shape) = self.document.get_shape(id) else {
            return;
        };
        if shape.is_text() {
            self.selection = Some(id);
        } else if !shape.is_stroke() {
            self.selection = None;
        }
    }

    /// Merge `patch` into a shape. With `push_history` false the scene changes
    /// but history does not. Restyling the selected shape also updates the
    /// default style.
    pub fn update_shape(&mut self, id: ShapeId, patch: &ShapePatch, push_history: bool) -> bool {
        if !self.document.update(id, patch) {
            return false;
        }
        if push_history {
            self.document.commit();
        }
        if self.selection == Some(id) && self.defaults.sync_from(patch) {
            log::debug!("Default style synced from {}", id);
        }
        true
    }

    /// Record the live scene, e.g. at the end of a drag.
    pub fn commit(&mut self) -> bool {
        self.document.commit()
    }

    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        let removed = self.document.remove(id)?;
        self.selection = None;
        if self.editing == Some(id) {
            self.editing = None;
        }
        self.document.commit();
        Some(removed)
    }

    pub fn delete_selected(&mut self) -> Option<Shape> {
        let id = self.selection?;
        self.remove_shape(id)
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.document.undo();
        if changed {
            self.after_history_move();
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.document.redo();
        if changed {
            self.after_history_move();
        }
        changed
    }

    fn after_history_move(&mut self) {
        if self.selection.is_some_and(|id| !self.document.contains(id)) {
            self.selection = None;
        }
        if self.editing.is_some_and(|id| !self.document.contains(id)) {
            self.editing = None;
        }
        if let Some((id, _)) = self.tool_manager.drafting() {
            if !self.document.contains(id) {
                self.tool_manager.finish();
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.document.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.document.can_redo()
    }

    /// Select a shape, or clear the selection with `None`.
    pub fn select(&mut self, id: Option<ShapeId>) {
        self.selection = id.filter(|id| self.document.contains(*id));
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selected_shape(&self) -> Option<&Shape> {
        self.selection.and_then(|id| self.document.get_shape(id))
    }

    /// Switch tools, committing a draft that was still in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if let Some(id) = self.tool_manager.set_tool(tool) {
            self.commit_abandoned_draft(id);
        }
    }

    fn commit_abandoned_draft(&mut self, id: ShapeId) {
        if self.document.contains(id) {
            self.document.commit();
        }
    }

    pub fn set_visibility(&mut self, id: ShapeId, visible: bool) -> bool {
        self.update_shape(id, &ShapePatch::new().with_visible(visible), true)
    }

    pub fn set_locked(&mut self, id: ShapeId, locked: bool) -> bool {
        self.update_shape(id, &ShapePatch::new().with_locked(locked), true)
    }

    /// Open the angle on `id` to `degrees`, keeping arm 1 and arm 2's length.
    pub fn set_angle_degrees(&mut self, id: ShapeId, degrees: f64) -> bool {
        let Some(ShapeKind::Angle(angle)) = self.document.get_shape(id).map(|s| &s.kind) else {
            return false;
        };
        let points = angle.with_degrees(degrees).points.to_vec();
        self.update_shape(id, &ShapePatch::new().with_points(points), true)
    }

    /// Apply a style change from the style editor: the selected shape is
    /// restyled, otherwise only the defaults change.
    pub fn apply_style(&mut self, patch: &ShapePatch) {
        if let Some(id) = self.selection {
            if self.update_shape(id, patch, true) {
                return;
            }
        }
        self.defaults.sync_from(patch);
        if let Some(style) = patch.font_style {
            self.defaults.font_style = style;
        }
        if let Some(family) = &patch.font_family {
            self.defaults.font_family = family.clone();
        }
    }

    fn current_font_style(&self) -> FontStyle {
        match self.selected_shape().map(|s| &s.kind) {
            Some(ShapeKind::Text(t)) => t.font_style,
            _ => self.defaults.font_style,
        }
    }

    pub fn toggle_bold(&mut self) {
        let style = self.current_font_style().toggle_bold();
        self.apply_style(&ShapePatch::new().with_font_style(style));
    }

    pub fn toggle_italic(&mut self) {
        let style = self.current_font_style().toggle_italic();
        self.apply_style(&ShapePatch::new().with_font_style(style));
    }

    /// Open the text overlay on a text shape. Any other edit is committed first.
    pub fn enter_text_edit(&mut self, id: ShapeId) -> bool {
        if !self.document.get_shape(id).is_some_and(Shape::is_text) {
            return false;
        }
        if self.editing.is_some_and(|current| current != id) {
            self.exit_text_edit();
        }
        self.selection = Some(id);
        self.editing = Some(id);
        true
    }

    /// Live keystroke update. Not recorded in history.
    pub fn set_edit_text(&mut self, text: &str) -> bool {
        match self.editing {
            Some(id) => self.update_shape(id, &ShapePatch::new().with_text(text), false),
            None => false,
        }
    }

    /// Close the overlay. Blank text deletes the shape, anything else is
    /// committed. Returns the id of a shape that survived.
    pub fn exit_text_edit(&mut self) -> Option<ShapeId> {
        let id = self.editing.take()?;
        let blank = match self.document.get_shape(id).map(|s| &s.kind) {
            Some(ShapeKind::Text(t)) => t.is_blank(),
            _ => return None,
        };
        if blank {
            self.remove_shape(id);
            None
        } else {
            self.document.commit();
            Some(id)
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn text_overlay(&self) -> Option<TextOverlay> {
        let id = self.editing?;
        let shape = self.document.get_shape(id)?;
        let ShapeKind::Text(text) = &shape.kind else {
            return None;
        };
        Some(TextOverlay {
            id,
            position: self.viewport.world_to_screen(text.origin()),
            font_size: text.font_size * self.viewport.zoom,
            font_family: text.font_family.clone(),
            font_style: text.font_style,
            color: shape.style.fill.solid().unwrap_or(shape.style.stroke),
            text: text.text.clone(),
        })
    }

    /// Layers of the displayed page, most recent first.
    pub fn layers(&self) -> Vec<&Shape> {
        self.document.layers(self.current_page())
    }

    pub fn fit_to_page(&mut self) {
        let page = self.pages.size();
        self.viewport
            .fit_to_page(self.container_size, page, &self.config.fit_padding);
    }

    pub fn zoom_in(&mut self) -> bool {
        self.viewport.zoom_step(self.container_size, self.config.zoom_step)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.viewport.zoom_step(self.container_size, -self.config.zoom_step)
    }

    /// Wheel zoom about the pointer.
    pub fn wheel(&mut self, screen_point: Point, delta_y: f64) -> bool {
        self.viewport
            .zoom_wheel(screen_point, delta_y, self.config.wheel_zoom_factor)
    }

    /// Display another page. Open edits and drafts are committed and the
    /// selection is cleared.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        if !self.pages.contains(page) || page == self.current_page() {
            return false;
        }
        self.exit_text_edit();
        if let Some(id) = self.tool_manager.finish() {
            self.commit_abandoned_draft(id);
        }
        self.selection = None;
        self.pages.go_to(page)
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.current_page() + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        self.current_page() > 1 && self.go_to_page(self.current_page() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MeasureUnit;
    use crate::shapes::{Angle, Frame, Measurement, Polyline, ShapeStyle, Text};
    use crate::tools::{begin_draft, extend_draft};

    fn rect(page: u32) -> Shape {
        Shape::new(
            page,
            ShapeStyle::default(),
            ShapeKind::Rectangle(Frame::new(Point::ZERO, 100.0, 50.0)),
        )
    }

    fn text(content: &str) -> Shape {
        let mut text = Text::new(Point::new(10.0, 10.0), 16.0, "Inter");
        text.text = content.to_string();
        Shape::new(1, ShapeStyle::default(), ShapeKind::Text(text))
    }

    fn pen() -> Shape {
        Shape::new(1, ShapeStyle::default(), ShapeKind::Pen(Polyline::single(Point::ZERO)))
    }

    #[test]
    fn test_document_creation() {
        let doc = CanvasDocument::new();
        assert!(doc.is_empty());
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_rectangle_and_text_undo_redo() {
        let mut canvas = Canvas::new();
        let rect_id = canvas.add_shape(rect(1));
        canvas.add_shape(text("Kitchen"));
        assert_eq!(canvas.document.len(), 2);

        assert!(canvas.undo());
        assert!(canvas.undo());
        assert!(canvas.document.is_empty());
        assert!(!canvas.undo());

        assert!(canvas.redo());
        assert_eq!(canvas.document.len(), 1);
        assert_eq!(canvas.document.shapes()[0].id, rect_id);
    }

    #[test]
    fn test_n_ops_n_undos_empty() {
        let mut canvas = Canvas::new();
        let a = canvas.add_shape(rect(1));
        canvas.add_shape(rect(1));
        canvas.update_shape(a, &ShapePatch::new().with_origin(Point::new(5.0, 5.0)), true);
        canvas.remove_shape(a);
        let final_state = canvas.document.shapes().to_vec();

        for _ in 0..4 {
            assert!(canvas.undo());
        }
        assert!(canvas.document.is_empty());
        for _ in 0..4 {
            assert!(canvas.redo());
        }
        assert_eq!(canvas.document.shapes(), final_state.as_slice());
    }

    #[test]
    fn test_update_without_history_is_invisible_to_undo() {
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(rect(1));
        let cursor = canvas.document.history().cursor();
        canvas.update_shape(id, &ShapePatch::new().with_size(10.0, 10.0), false);
        assert_eq!(canvas.document.history().cursor(), cursor);
        assert!((canvas.document.get_shape(id).unwrap().bounds().width() - 10.0).abs() < f64::EPSILON);

        // Undo goes straight back to the empty scene.
        assert!(canvas.undo());
        assert!(canvas.document.is_empty());
        assert!(canvas.redo());
        assert!((canvas.document.get_shape(id).unwrap().bounds().width() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_push_after_undo_discards_redo() {
        let mut canvas = Canvas::new();
        canvas.add_shape(rect(1));
        canvas.undo();
        assert!(canvas.can_redo());
        canvas.add_shape(rect(1));
        assert!(!canvas.can_redo());
        assert!(!canvas.redo());
    }

    #[test]
    fn test_history_matches_scene_after_commits() {
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(rect(1));
        canvas.update_shape(id, &ShapePatch::new().with_stroke_width(3.0), true);
        assert_eq!(canvas.document.history().current(), canvas.document.shapes());
        canvas.remove_shape(id);
        assert_eq!(canvas.document.history().current(), canvas.document.shapes());
    }

    #[test]
    fn test_update_missing_shape_is_noop() {
        let mut canvas = Canvas::new();
        canvas.add_shape(rect(1));
        let len = canvas.document.history().len();
        assert!(!canvas.update_shape(uuid::Uuid::new_v4(), &ShapePatch::new().with_opacity(0.5), true));
        assert_eq!(canvas.document.history().len(), len);
    }

    #[test]
    fn test_add_selection_policy() {
        let mut canvas = Canvas::new();
        let first = canvas.add_shape(rect(1));
        canvas.select(Some(first));

        canvas.add_shape(pen());
        assert_eq!(canvas.selection, Some(first));

        let text_id = canvas.add_shape(text("hi"));
        assert_eq!(canvas.selection, Some(text_id));

        canvas.add_shape(rect(1));
        assert_eq!(canvas.selection, None);
    }

    #[test]
    fn test_style_sync_only_for_selected() {
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(rect(1));
        let red = SerializableColor::rgb(255, 0, 0);

        canvas.update_shape(id, &ShapePatch::new().with_stroke_width(7.0), true);
        assert!((canvas.defaults.stroke_width - 1.0).abs() < f64::EPSILON);

        canvas.select(Some(id));
        canvas.update_shape(id, &ShapePatch::new().with_stroke(red), true);
        assert_eq!(canvas.defaults.stroke, red);

        // Geometry changes never touch the defaults.
        let before = canvas.defaults.clone();
        canvas.update_shape(id, &ShapePatch::new().with_origin(Point::new(3.0, 3.0)), true);
        assert_eq!(canvas.defaults, before);
    }

    #[test]
    fn test_apply_style_without_selection_sets_defaults() {
        let mut canvas = Canvas::new();
        canvas.apply_style(&ShapePatch::new().with_unit(MeasureUnit::Cm).with_font_family("Roboto"));
        assert_eq!(canvas.defaults.unit, MeasureUnit::Cm);
        assert_eq!(canvas.defaults.font_family, "Roboto");
        canvas.toggle_bold();
        assert!(canvas.defaults.font_style.bold);
    }

    #[test]
    fn test_toggle_bold_on_selected_text() {
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(text("hi"));
        canvas.toggle_bold();
        let ShapeKind::Text(t) = &canvas.document.get_shape(id).unwrap().kind else {
            panic!("expected text");
        };
        assert!(t.font_style.bold);
        assert!(!canvas.defaults.font_style.bold);
    }

    #[test]
    fn test_draft_commits_once() {
        let mut canvas = Canvas::new();
        let origin = Point::new(10.0, 10.0);
        let shape = begin_draft(ToolKind::Rectangle, origin, 1, &canvas.defaults).unwrap();
        let id = canvas.begin_draft(shape, origin);
        let len = canvas.document.history().len();

        for i in 1..10 {
            let shape = canvas.document.get_shape_mut(id).unwrap();
            extend_draft(shape, origin, Point::new(10.0 + i as f64 * 5.0, 40.0), 4.0);
        }
        assert_eq!(canvas.document.history().len(), len);

        assert_eq!(canvas.commit_draft(), Some(id));
        assert_eq!(canvas.document.history().len(), len + 1);
        assert!(canvas.undo());
        assert!(canvas.document.is_empty());
    }

    #[test]
    fn test_tool_switch_commits_draft() {
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Line);
        let shape = begin_draft(ToolKind::Line, Point::ZERO, 1, &canvas.defaults).unwrap();
        canvas.begin_draft(shape, Point::ZERO);
        canvas.set_tool(ToolKind::Select);
        assert!(!canvas.tool_manager.is_active());
        assert!(canvas.can_undo());
        assert_eq!(canvas.document.history().current().len(), 1);
    }

    #[test]
    fn test_measurement_label_end_to_end() {
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(Shape::new(
            1,
            ShapeStyle::default(),
            ShapeKind::Measurement(Measurement::new(Point::ZERO, Point::new(72.0, 0.0), MeasureUnit::In)),
        ));
        let ShapeKind::Measurement(m) = &canvas.document.get_shape(id).unwrap().kind else {
            panic!("expected a measurement");
        };
        assert_eq!(m.label(), "1.00 in");
    }

    #[test]
    fn test_remove_clears_selection_and_undo_clears_stale_selection() {
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(rect(1));
        canvas.select(Some(id));
        canvas.remove_shape(id);
        assert_eq!(canvas.selection, None);

        canvas.undo();
        canvas.select(Some(id));
        canvas.undo();
        assert_eq!(canvas.selection, None);
    }

    #[test]
    fn test_text_edit_commit_and_blank_delete() {
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(text(""));
        assert!(canvas.enter_text_edit(id));
        canvas.set_edit_text("Kit");
        canvas.set_edit_text("Kitchen");
        let len = canvas.document.history().len();
        assert_eq!(canvas.exit_text_edit(), Some(id));
        assert_eq!(canvas.document.history().len(), len + 1);
        assert!(!canvas.is_editing());

        let blank = canvas.add_shape(text(""));
        canvas.enter_text_edit(blank);
        canvas.set_edit_text("   ");
        assert_eq!(canvas.exit_text_edit(), None);
        assert!(!canvas.document.contains(blank));
    }

    #[test]
    fn test_text_overlay_scales_with_zoom() {
        let mut canvas = Canvas::new();
        canvas.viewport.zoom = 2.0;
        canvas.viewport.offset = kurbo::Vec2::new(5.0, 7.0);
        let id = canvas.add_shape(text("a"));
        canvas.enter_text_edit(id);
        let overlay = canvas.text_overlay().unwrap();
        assert_eq!(overlay.position, Point::new(25.0, 27.0));
        assert!((overlay.font_size - 32.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_angle_degrees() {
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(Shape::new(
            1,
            ShapeStyle::default(),
            ShapeKind::Angle(Angle::new(Point::new(10.0, 0.0), Point::ZERO, Point::new(0.0, 20.0))),
        ));
        assert!(canvas.set_angle_degrees(id, 45.0));
        let ShapeKind::Angle(angle) = &canvas.document.get_shape(id).unwrap().kind else {
            panic!("expected an angle");
        };
        assert!((angle.degrees() - 45.0).abs() < 1e-9);
        assert!((crate::geometry::distance(angle.vertex(), angle.points[2]) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_layers_and_page_filter() {
        let mut canvas = Canvas::new();
        canvas.pages.set_count(2);
        let a = canvas.add_shape(rect(1));
        canvas.add_shape(rect(2));
        let c = canvas.add_shape(rect(1));
        let layers: Vec<ShapeId> = canvas.layers().iter().map(|s| s.id).collect();
        assert_eq!(layers, vec![c, a]);

        assert!(canvas.next_page());
        assert_eq!(canvas.layers().len(), 1);
        assert!(!canvas.next_page());
    }

    #[test]
    fn test_shapes_at_point_topmost_first_and_skips_hidden() {
        let mut doc = CanvasDocument::new();
        let mut bottom = rect(1);
        bottom.style.fill = crate::color::Paint::Solid(SerializableColor::white());
        let mut top = bottom.clone();
        top.id = uuid::Uuid::new_v4();
        let bottom_id = doc.push_shape(bottom);
        let top_id = doc.push_shape(top);

        assert_eq!(doc.shapes_at_point(1, Point::new(20.0, 20.0), 2.0), vec![top_id, bottom_id]);
        assert!(doc.shapes_at_point(2, Point::new(20.0, 20.0), 2.0).is_empty());

        doc.update(top_id, &ShapePatch::new().with_visible(false));
        assert_eq!(doc.shapes_at_point(1, Point::new(20.0, 20.0), 2.0), vec![bottom_id]);
    }

    #[test]
    fn test_json_roundtrip_preserves_order() {
        let mut doc = CanvasDocument::new();
        doc.push_shape(rect(1));
        doc.push_shape(text("note"));
        let restored = CanvasDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(restored.shapes(), doc.shapes());
        assert!(!restored.can_undo());
    }

    #[test]
    fn test_visibility_toggle_is_undoable() {
        let mut canvas = Canvas::new();
        let id = canvas.add_shape(rect(1));
        canvas.set_visibility(id, false);
        assert!(!canvas.document.get_shape(id).unwrap().visible);
        canvas.undo();
        assert!(canvas.document.get_shape(id).unwrap().visible);
    }
}
