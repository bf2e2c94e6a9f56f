//! Tool system for the annotation canvas.

mod draft;

pub use draft::{begin_draft, extend_draft};

use crate::shapes::ShapeId;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Pen,
    Line,
    Arrow,
    Rectangle,
    Ellipse,
    Text,
    Measure,
    Angle,
    Eraser,
}

impl ToolKind {
    pub const ALL: [ToolKind; 11] = [
        ToolKind::Select,
        ToolKind::Pan,
        ToolKind::Pen,
        ToolKind::Line,
        ToolKind::Arrow,
        ToolKind::Rectangle,
        ToolKind::Ellipse,
        ToolKind::Text,
        ToolKind::Measure,
        ToolKind::Angle,
        ToolKind::Eraser,
    ];

    /// Tools that create a shape on pointer-down.
    pub fn creates_shapes(self) -> bool {
        !matches!(self, ToolKind::Select | ToolKind::Pan)
    }

    /// Tools whose shape grows while the pointer is dragged.
    pub fn drafts(self) -> bool {
        self.creates_shapes() && self != ToolKind::Text
    }

    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Pan => "Pan",
            ToolKind::Pen => "Pen",
            ToolKind::Line => "Line",
            ToolKind::Arrow => "Arrow",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Ellipse => "Ellipse",
            ToolKind::Text => "Text",
            ToolKind::Measure => "Measure",
            ToolKind::Angle => "Angle",
            ToolKind::Eraser => "Eraser",
        }
    }
}

/// State of a drafting interaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ToolState {
    #[default]
    Idle,
    /// A shape is being drawn by an in-progress drag.
    Drafting {
        shape_id: ShapeId,
        /// Pointer-down position in page coordinates.
        origin: Point,
    },
}

/// Manages the current tool and its drafting state.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    pub current_tool: ToolKind,
    pub state: ToolState,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch tools. Returns the id of a draft that was in progress, which the
    /// caller must commit.
    pub fn set_tool(&mut self, tool: ToolKind) -> Option<ShapeId> {
        self.current_tool = tool;
        self.finish()
    }

    pub fn begin(&mut self, shape_id: ShapeId, origin: Point) {
        self.state = ToolState::Drafting { shape_id, origin };
    }

    /// End the draft, returning its shape id.
    pub fn finish(&mut self) -> Option<ShapeId> {
        match std::mem::take(&mut self.state) {
            ToolState::Drafting { shape_id, .. } => Some(shape_id),
            ToolState::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, ToolState::Drafting { .. })
    }

    pub fn drafting(&self) -> Option<(ShapeId, Point)> {
        match self.state {
            ToolState::Drafting { shape_id, origin } => Some((shape_id, origin)),
            ToolState::Idle => None,
        }
    }
}
