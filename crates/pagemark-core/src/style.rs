//! Default style template applied to newly drafted shapes.

use crate::color::{Paint, SerializableColor};
use crate::geometry::MeasureUnit;
use crate::shapes::{DEFAULT_FONT_FAMILY, FontStyle, ShapePatch, ShapeStyle, normalize_dash};
use serde::{Deserialize, Serialize};

/// Styling for the next drafted shape.
///
/// Owned by the [`Canvas`](crate::canvas::Canvas) and updated either from the
/// style editor or by restyling the selected shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefaultStyle {
    pub stroke: SerializableColor,
    pub fill: Paint,
    pub stroke_width: f64,
    pub opacity: f64,
    pub dash: Vec<f64>,
    pub font_size: f64,
    pub font_family: String,
    pub font_style: FontStyle,
    pub eraser_size: f64,
    pub unit: MeasureUnit,
}

impl Default for DefaultStyle {
    fn default() -> Self {
        Self {
            stroke: SerializableColor::rgb(0xef, 0x44, 0x44),
            fill: Paint::Transparent,
            stroke_width: 1.0,
            opacity: 1.0,
            dash: Vec::new(),
            font_size: 10.0,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_style: FontStyle::NORMAL,
            eraser_size: 20.0,
            unit: MeasureUnit::Mm,
        }
    }
}

impl DefaultStyle {
    /// Common style for a new drafted shape.
    pub fn shape_style(&self) -> ShapeStyle {
        ShapeStyle {
            stroke: self.stroke,
            stroke_width: self.stroke_width,
            fill: self.fill,
            opacity: self.opacity,
            dash: self.dash.clone(),
        }
    }

    /// Eraser strokes are opaque black at the eraser size.
    pub fn eraser_style(&self) -> ShapeStyle {
        ShapeStyle {
            stroke: SerializableColor::black(),
            stroke_width: self.eraser_size,
            fill: Paint::Transparent,
            opacity: 1.0,
            dash: self.dash.clone(),
        }
    }

    /// New text is filled with the stroke color and has no outline.
    pub fn text_style(&self) -> ShapeStyle {
        ShapeStyle {
            fill: Paint::Solid(self.stroke),
            stroke_width: 0.0,
            ..self.shape_style()
        }
    }

    /// Copy the style attributes carried by `patch`. Returns true if any was copied.
    pub fn sync_from(&mut self, patch: &ShapePatch) -> bool {
        if !patch.has_style() {
            return false;
        }
        if let Some(stroke) = patch.stroke {
            self.stroke = stroke;
        }
        if let Some(fill) = patch.fill {
            self.fill = fill;
        }
        if let Some(width) = patch.stroke_width {
            self.stroke_width = width;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(dash) = &patch.dash {
            self.dash = normalize_dash(dash);
        }
        if let Some(size) = patch.font_size {
            self.font_size = size;
        }
        if let Some(unit) = patch.unit {
            self.unit = unit;
        }
        true
    }
}
