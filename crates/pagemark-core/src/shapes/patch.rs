//! Partial shape updates.

use super::text::FontStyle;
use crate::color::{Paint, SerializableColor};
use crate::geometry::MeasureUnit;
use kurbo::Point;

/// A set of attributes to merge into a shape. `None` leaves a field alone.
///
/// Fields that do not apply to the target's kind are ignored, as are point
/// lists of the wrong length for measurements (2) and angles (3).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapePatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub points: Option<Vec<Point>>,
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub font_style: Option<FontStyle>,
    pub stroke: Option<SerializableColor>,
    pub fill: Option<Paint>,
    pub stroke_width: Option<f64>,
    pub opacity: Option<f64>,
    pub dash: Option<Vec<f64>>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
    pub unit: Option<MeasureUnit>,
}

impl ShapePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.x = Some(origin.x);
        self.y = Some(origin.y);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_points(mut self, points: Vec<Point>) -> Self {
        self.points = Some(points);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    pub fn with_font_style(mut self, style: FontStyle) -> Self {
        self.font_style = Some(style);
        self
    }

    pub fn with_stroke(mut self, color: SerializableColor) -> Self {
        self.stroke = Some(color);
        self
    }

    pub fn with_fill(mut self, fill: Paint) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_dash(mut self, dash: Vec<f64>) -> Self {
        self.dash = Some(dash);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    pub fn with_unit(mut self, unit: MeasureUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether the patch touches an attribute mirrored into the default style.
    pub fn has_style(&self) -> bool {
        self.stroke.is_some()
            || self.fill.is_some()
            || self.stroke_width.is_some()
            || self.opacity.is_some()
            || self.dash.is_some()
            || self.font_size.is_some()
            || self.unit.is_some()
    }
}
