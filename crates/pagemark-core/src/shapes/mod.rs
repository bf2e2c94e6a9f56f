//! Shape definitions for page annotations.

mod angle;
mod frame;
mod measurement;
mod patch;
mod points;
mod polyline;
mod text;

pub use angle::{Angle, VERTEX, WEDGE_RADIUS};
pub use frame::Frame;
pub use measurement::{LABEL_OFFSET, Measurement};
pub use patch::ShapePatch;
pub use polyline::Polyline;
pub use text::{DEFAULT_FONT_FAMILY, FontStyle, Text};

use crate::color::{Paint, SerializableColor};
use crate::geometry::point_to_segment_dist;
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// How a shape's pixels combine with the annotation layer beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composite {
    #[default]
    SourceOver,
    /// Removes existing annotation pixels where painted.
    DestinationOut,
}

fn default_opacity() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

/// Style attributes shared by every kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    pub stroke: SerializableColor,
    /// Stroke width; for text this is the outline width.
    pub stroke_width: f64,
    #[serde(default)]
    pub fill: Paint,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// On/off lengths; empty means solid.
    #[serde(default)]
    pub dash: Vec<f64>,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke: SerializableColor::black(),
            stroke_width: 1.0,
            fill: Paint::Transparent,
            opacity: 1.0,
            dash: Vec::new(),
        }
    }
}

/// Dash lengths usable for stroking. Negative and non-finite entries are
/// dropped; a pattern with no positive length becomes solid.
pub fn normalize_dash(dash: &[f64]) -> Vec<f64> {
    let kept: Vec<f64> = dash.iter().copied().filter(|d| d.is_finite() && *d >= 0.0).collect();
    if kept.iter().sum::<f64>() > 0.0 { kept } else { Vec::new() }
}

/// Kind-specific payload. The `type` tag matches the persisted schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShapeKind {
    #[serde(rename = "RECTANGLE")]
    Rectangle(Frame),
    #[serde(rename = "ELLIPSE")]
    Ellipse(Frame),
    #[serde(rename = "LINE")]
    Line(Polyline),
    #[serde(rename = "PEN")]
    Pen(Polyline),
    #[serde(rename = "ARROW")]
    Arrow(Polyline),
    #[serde(rename = "TEXT")]
    Text(Text),
    #[serde(rename = "MEASURE")]
    Measurement(Measurement),
    #[serde(rename = "ANGLE")]
    Angle(Angle),
    #[serde(rename = "ERASER")]
    Eraser(Polyline),
}

/// One annotation on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    /// 1-based page number.
    pub page: u32,
    #[serde(flatten)]
    pub style: ShapeStyle,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(flatten)]
    pub kind: ShapeKind,
}

impl Shape {
    pub fn new(page: u32, style: ShapeStyle, kind: ShapeKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            page,
            style,
            visible: true,
            locked: false,
            kind,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ShapeKind::Rectangle(_) => "Rectangle",
            ShapeKind::Ellipse(_) => "Ellipse",
            ShapeKind::Line(_) => "Line",
            ShapeKind::Pen(_) => "Pen",
            ShapeKind::Arrow(_) => "Arrow",
            ShapeKind::Text(_) => "Text",
            ShapeKind::Measurement(_) => "Measurement",
            ShapeKind::Angle(_) => "Angle",
            ShapeKind::Eraser(_) => "Eraser",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ShapeKind::Text(_))
    }

    pub fn is_angle(&self) -> bool {
        matches!(self.kind, ShapeKind::Angle(_))
    }

    /// Freehand ink and eraser strokes.
    pub fn is_stroke(&self) -> bool {
        matches!(self.kind, ShapeKind::Pen(_) | ShapeKind::Eraser(_))
    }

    pub fn composite(&self) -> Composite {
        match self.kind {
            ShapeKind::Eraser(_) => Composite::DestinationOut,
            _ => Composite::SourceOver,
        }
    }

    /// Whether the select tool may move or resize this shape as a whole.
    pub fn is_transformable(&self) -> bool {
        !self.locked && !matches!(self.kind, ShapeKind::Angle(_) | ShapeKind::Eraser(_))
    }

    /// Point list for point-based kinds.
    pub fn points(&self) -> Option<&[Point]> {
        match &self.kind {
            ShapeKind::Line(p) | ShapeKind::Pen(p) | ShapeKind::Arrow(p) | ShapeKind::Eraser(p) => {
                Some(&p.points)
            }
            ShapeKind::Measurement(m) => Some(&m.points),
            ShapeKind::Angle(a) => Some(&a.points),
            ShapeKind::Rectangle(_) | ShapeKind::Ellipse(_) | ShapeKind::Text(_) => None,
        }
    }

    /// Normalized bounding box in page coordinates.
    pub fn bounds(&self) -> Rect {
        match &self.kind {
            ShapeKind::Rectangle(f) | ShapeKind::Ellipse(f) => f.rect(),
            ShapeKind::Line(p) | ShapeKind::Pen(p) | ShapeKind::Arrow(p) | ShapeKind::Eraser(p) => {
                p.bounds()
            }
            ShapeKind::Text(t) => t.bounds(),
            ShapeKind::Measurement(m) => m.bounds(),
            ShapeKind::Angle(a) => a.bounds(),
        }
    }

    /// Hit test in page coordinates. Eraser strokes are never hit.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let reach = tolerance + self.style.stroke_width / 2.0;
        match &self.kind {
            ShapeKind::Rectangle(f) => {
                let rect = f.rect();
                if !self.style.fill.is_transparent() {
                    return rect.inflate(reach, reach).contains(point);
                }
                let corners = [
                    Point::new(rect.x0, rect.y0),
                    Point::new(rect.x1, rect.y0),
                    Point::new(rect.x1, rect.y1),
                    Point::new(rect.x0, rect.y1),
                ];
                (0..4).any(|i| point_to_segment_dist(point, corners[i], corners[(i + 1) % 4]) <= reach)
            }
            ShapeKind::Ellipse(f) => {
                if self.style.fill.is_transparent() {
                    f.ellipse_outline_hit(point, reach)
                } else {
                    f.ellipse_contains(point, reach)
                }
            }
            ShapeKind::Line(p) | ShapeKind::Pen(p) | ShapeKind::Arrow(p) => p.hit_test(point, reach),
            ShapeKind::Eraser(_) => false,
            ShapeKind::Text(t) => t.bounds().inflate(tolerance, tolerance).contains(point),
            ShapeKind::Measurement(m) => m.hit_test(point, reach),
            ShapeKind::Angle(a) => a.hit_test(point, reach),
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        match &mut self.kind {
            ShapeKind::Rectangle(f) | ShapeKind::Ellipse(f) => f.translate(delta),
            ShapeKind::Line(p) | ShapeKind::Pen(p) | ShapeKind::Arrow(p) | ShapeKind::Eraser(p) => {
                p.translate(delta)
            }
            ShapeKind::Text(t) => t.translate(delta),
            ShapeKind::Measurement(m) => m.translate(delta),
            ShapeKind::Angle(a) => a.translate(delta),
        }
    }

    pub fn transform(&mut self, affine: Affine) {
        match &mut self.kind {
            ShapeKind::Rectangle(f) | ShapeKind::Ellipse(f) => f.transform(affine),
            ShapeKind::Line(p) | ShapeKind::Pen(p) | ShapeKind::Arrow(p) | ShapeKind::Eraser(p) => {
                p.transform(affine)
            }
            ShapeKind::Text(t) => t.transform(affine),
            ShapeKind::Measurement(m) => m.transform(affine),
            ShapeKind::Angle(a) => a.transform(affine),
        }
    }

    /// Map the current bounds onto `target`. Degenerate axes only translate.
    pub fn fit_to_bounds(&mut self, target: Rect) {
        let current = self.bounds();
        let scale = |from: f64, to: f64| if from > f64::EPSILON { to / from } else { 1.0 };
        let affine = Affine::translate(target.origin().to_vec2())
            * Affine::scale_non_uniform(
                scale(current.width(), target.width()),
                scale(current.height(), target.height()),
            )
            * Affine::translate(-current.origin().to_vec2());
        self.transform(affine);
    }

    /// Merge `patch` into this shape.
    pub fn apply(&mut self, patch: &ShapePatch) {
        if let Some(stroke) = patch.stroke {
            self.style.stroke = stroke;
        }
        if let Some(fill) = patch.fill {
            self.style.fill = fill;
        }
        if let Some(width) = patch.stroke_width {
            self.style.stroke_width = width;
        }
        if let Some(opacity) = patch.opacity {
            self.style.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(dash) = &patch.dash {
            self.style.dash = normalize_dash(dash);
        }
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }

        match &mut self.kind {
            ShapeKind::Rectangle(f) | ShapeKind::Ellipse(f) => {
                f.x = patch.x.unwrap_or(f.x);
                f.y = patch.y.unwrap_or(f.y);
                f.width = patch.width.unwrap_or(f.width);
                f.height = patch.height.unwrap_or(f.height);
            }
            ShapeKind::Line(p) | ShapeKind::Pen(p) | ShapeKind::Arrow(p) | ShapeKind::Eraser(p) => {
                if let Some(points) = &patch.points {
                    p.points = points.clone();
                }
            }
            ShapeKind::Text(t) => {
                t.x = patch.x.unwrap_or(t.x);
                t.y = patch.y.unwrap_or(t.y);
                if let Some(text) = &patch.text {
                    t.text = text.clone();
                }
                t.font_size = patch.font_size.unwrap_or(t.font_size);
                if let Some(family) = &patch.font_family {
                    t.font_family = family.clone();
                }
                t.font_style = patch.font_style.unwrap_or(t.font_style);
            }
            ShapeKind::Measurement(m) => {
                if let Some([a, b]) = patch.points.as_deref() {
                    m.points = [*a, *b];
                }
                m.unit = patch.unit.unwrap_or(m.unit);
            }
            ShapeKind::Angle(a) => {
                if let Some([p1, v, p3]) = patch.points.as_deref() {
                    a.points = [*p1, *v, *p3];
                }
            }
        }
    }
}
