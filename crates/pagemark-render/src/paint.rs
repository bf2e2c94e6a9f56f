//! Declarative paint layer: shapes become ordered drawable primitives.
//!
//! Nothing here touches pixels. A [`DisplayList`] is a page-space
//! description of one frame that any [`Renderer`](crate::Renderer) can draw.

use crate::renderer::RenderContext;
use kurbo::{Affine, Arc, BezPath, Cap, Ellipse, Join, Point, Rect, Shape as _, Size, Stroke, Vec2};
use pagemark_core::color::SerializableColor;
use pagemark_core::geometry::AngleGeometry;
use pagemark_core::selection::{ANCHOR_RADIUS, HANDLE_SIZE, HandleKind, get_handles};
use pagemark_core::shapes::{Composite, DEFAULT_FONT_FAMILY, Shape, ShapeId, ShapeKind, ShapeStyle, WEDGE_RADIUS};

pub const ARROW_POINTER_LENGTH: f64 = 10.0;
pub const ARROW_POINTER_WIDTH: f64 = 10.0;
pub const MEASURE_POINTER: f64 = 6.0;
pub const LABEL_FONT_SIZE: f64 = 14.0;
pub const LABEL_FONT_FAMILY: &str = DEFAULT_FONT_FAMILY;
const WEDGE_ALPHA: f64 = 0.2;
const ANCHOR_FILL: SerializableColor = SerializableColor::rgb(0xfb, 0xbf, 0x24);
const ANCHOR_STROKE_WIDTH: f64 = 2.0;
const CURVE_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// The page raster.
    Background,
    /// Shapes; eraser strokes only cut into this layer.
    Annotations,
    /// Selection handles and anchors, never erased.
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    /// `anchor` is the top-left of the block.
    Left,
    /// `anchor` is the top-center of the block.
    Center,
}

/// A block of text to be shaped by the renderer.
#[derive(Debug, Clone)]
pub struct TextRun {
    pub anchor: Point,
    pub lines: Vec<String>,
    pub font_size: f64,
    pub font_family: String,
    pub bold: bool,
    pub italic: bool,
    pub align: TextAlign,
    pub fill: SerializableColor,
    pub outline: Option<(Stroke, SerializableColor)>,
}

#[derive(Debug, Clone)]
pub enum Drawable {
    /// The page raster, or a blank white page when none is loaded.
    Page { rect: Rect },
    Fill { path: BezPath, color: SerializableColor },
    Stroke {
        path: BezPath,
        stroke: Stroke,
        color: SerializableColor,
    },
    Text(TextRun),
}

#[derive(Debug, Clone)]
pub struct DisplayItem {
    pub layer: Layer,
    /// Shape this item was derived from, `None` for the page.
    pub shape_id: Option<ShapeId>,
    pub composite: Composite,
    pub drawable: Drawable,
}

/// An ordered frame description in page coordinates.
#[derive(Debug, Clone)]
pub struct DisplayList {
    /// Page space to output pixels.
    pub transform: Affine,
    pub page_size: Size,
    /// Fill for the area outside the page.
    pub backdrop: SerializableColor,
    pub items: Vec<DisplayItem>,
}

impl DisplayList {
    pub fn new(transform: Affine, page_size: Size) -> Self {
        Self {
            transform,
            page_size,
            backdrop: SerializableColor::white(),
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, layer: Layer, shape_id: Option<ShapeId>, composite: Composite, drawable: Drawable) {
        self.items.push(DisplayItem {
            layer,
            shape_id,
            composite,
            drawable,
        });
    }

    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &DisplayItem> {
        self.items.iter().filter(move |item| item.layer == layer)
    }

    /// Shapes that produced annotation items, in paint order.
    pub fn shape_ids(&self) -> Vec<ShapeId> {
        let mut ids: Vec<ShapeId> = Vec::new();
        for id in self.layer(Layer::Annotations).filter_map(|item| item.shape_id) {
            if ids.last() != Some(&id) {
                ids.push(id);
            }
        }
        ids
    }

    pub fn is_blank(&self) -> bool {
        self.items.iter().all(|item| item.layer == Layer::Background)
    }
}

/// Build the display list for one frame.
///
/// The page comes first, then visible shapes of the page in scene order
/// (except the one being text-edited), then affordances for the selection.
pub fn build_display_list(ctx: &RenderContext) -> DisplayList {
    let mut list = DisplayList::new(ctx.transform, ctx.page_size);
    list.backdrop = ctx.background();
    list.push(
        Layer::Background,
        None,
        Composite::SourceOver,
        Drawable::Page {
            rect: Rect::from_origin_size(Point::ZERO, ctx.page_size),
        },
    );

    let drawn = ctx
        .shapes
        .iter()
        .filter(|s| s.page == ctx.page && s.visible && Some(s.id) != ctx.editing_shape_id);
    for shape in drawn {
        let composite = shape.composite();
        for drawable in shape_drawables(shape) {
            list.push(Layer::Annotations, Some(shape.id), composite, drawable);
        }
    }

    if ctx.show_affordances {
        let selected = ctx.selection.and_then(|id| {
            ctx.shapes.iter().find(|s| {
                s.id == id && s.page == ctx.page && s.visible && Some(s.id) != ctx.editing_shape_id
            })
        });
        if let Some(shape) = selected {
            for drawable in affordance_drawables(shape, ctx.zoom, ctx.selection_color()) {
                list.push(Layer::Overlay, Some(shape.id), Composite::SourceOver, drawable);
            }
        }
    }

    list
}

/// `color` with its alpha scaled by `opacity`.
fn faded(color: SerializableColor, opacity: f64) -> SerializableColor {
    color.with_alpha(color.alpha() * opacity.clamp(0.0, 1.0))
}

fn outline(style: &ShapeStyle, width: f64) -> Stroke {
    let stroke = Stroke::new(width);
    if style.dash.is_empty() {
        stroke
    } else {
        stroke.with_dashes(0.0, style.dash.iter().copied())
    }
}

fn rounded(stroke: Stroke) -> Stroke {
    stroke.with_caps(Cap::Round).with_join(Join::Round)
}

/// Filled triangle pointing at `tip`, coming from `from`.
fn arrow_head(tip: Point, from: Point, length: f64, width: f64) -> Option<BezPath> {
    let dir = tip - from;
    let len = dir.hypot();
    if len < f64::EPSILON {
        return None;
    }
    let unit = dir / len;
    let normal = Vec2::new(-unit.y, unit.x) * (width / 2.0);
    let base = tip - unit * length;

    let mut path = BezPath::new();
    path.move_to(tip);
    path.line_to(base + normal);
    path.line_to(base - normal);
    path.close_path();
    Some(path)
}

/// Pie slice at the vertex sweeping from arm 1 by the angle value.
fn wedge(geometry: &AngleGeometry, radius: f64) -> Option<BezPath> {
    if geometry.degrees <= 0.0 {
        return None;
    }
    let arc = Arc {
        center: geometry.vertex,
        radii: Vec2::new(radius, radius),
        start_angle: geometry.start_bearing,
        sweep_angle: geometry.degrees.to_radians(),
        x_rotation: 0.0,
    };
    let mut path = BezPath::new();
    path.move_to(geometry.vertex);
    path.line_to(geometry.vertex + Vec2::from_angle(geometry.start_bearing) * radius);
    for el in arc.append_iter(CURVE_TOLERANCE) {
        path.push(el);
    }
    path.close_path();
    Some(path)
}

fn segment(a: Point, b: Point) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(a);
    path.line_to(b);
    path
}

fn label(anchor: Point, text: String, color: SerializableColor) -> Drawable {
    Drawable::Text(TextRun {
        anchor,
        lines: vec![text],
        font_size: LABEL_FONT_SIZE,
        font_family: LABEL_FONT_FAMILY.to_string(),
        bold: true,
        italic: false,
        align: TextAlign::Center,
        fill: color,
        outline: None,
    })
}

/// Primitives for one shape in page coordinates, without affordances.
pub fn shape_drawables(shape: &Shape) -> Vec<Drawable> {
    let style = &shape.style;
    let ink = faded(style.stroke, style.opacity);
    let mut out = Vec::new();

    match &shape.kind {
        ShapeKind::Rectangle(frame) | ShapeKind::Ellipse(frame) => {
            let path = match &shape.kind {
                ShapeKind::Ellipse(_) => {
                    let r = frame.radii();
                    Ellipse::new(frame.center(), (r.x.abs(), r.y.abs()), 0.0).to_path(CURVE_TOLERANCE)
                }
                _ => frame.rect().to_path(CURVE_TOLERANCE),
            };
            if let Some(color) = style.fill.translucent(style.opacity).solid() {
                out.push(Drawable::Fill {
                    path: path.clone(),
                    color,
                });
            }
            if style.stroke_width > 0.0 {
                out.push(Drawable::Stroke {
                    path,
                    stroke: outline(style, style.stroke_width),
                    color: style.stroke,
                });
            }
        }
        ShapeKind::Line(line) | ShapeKind::Pen(line) => {
            out.push(Drawable::Stroke {
                path: line.to_path(),
                stroke: rounded(outline(style, style.stroke_width)),
                color: ink,
            });
        }
        ShapeKind::Arrow(line) => {
            out.push(Drawable::Stroke {
                path: line.to_path(),
                stroke: rounded(outline(style, style.stroke_width)),
                color: ink,
            });
            let head = line.last().and_then(|tip| {
                let from = line.points.iter().rev().find(|p| **p != tip)?;
                arrow_head(tip, *from, ARROW_POINTER_LENGTH, ARROW_POINTER_WIDTH)
            });
            if let Some(head) = head {
                out.push(Drawable::Fill {
                    path: head.clone(),
                    color: ink,
                });
                out.push(Drawable::Stroke {
                    path: head,
                    stroke: outline(style, style.stroke_width),
                    color: ink,
                });
            }
        }
        ShapeKind::Measurement(m) => {
            let [start, end] = m.points;
            out.push(Drawable::Stroke {
                path: segment(start, end),
                stroke: outline(style, style.stroke_width),
                color: ink,
            });
            for (tip, from) in [(end, start), (start, end)] {
                if let Some(head) = arrow_head(tip, from, MEASURE_POINTER, MEASURE_POINTER) {
                    out.push(Drawable::Fill { path: head, color: ink });
                }
            }
            out.push(label(m.label_anchor(), m.label(), ink));
        }
        ShapeKind::Angle(angle) => {
            let geometry = angle.geometry();
            let mut arms = BezPath::new();
            arms.move_to(geometry.arm1);
            arms.line_to(geometry.vertex);
            arms.line_to(geometry.arm2);
            out.push(Drawable::Stroke {
                path: arms,
                stroke: rounded(outline(style, style.stroke_width)),
                color: ink,
            });
            if let Some(path) = wedge(&geometry, WEDGE_RADIUS) {
                out.push(Drawable::Fill {
                    path: path.clone(),
                    color: faded(style.stroke.with_alpha(WEDGE_ALPHA), style.opacity),
                });
                out.push(Drawable::Stroke {
                    path,
                    stroke: Stroke::new(1.0),
                    color: ink,
                });
            }
            // Centered on the label point.
            let anchor = geometry.label - Vec2::new(0.0, LABEL_FONT_SIZE / 2.0);
            out.push(label(anchor, geometry.label_text(), ink));
        }
        ShapeKind::Text(text) => {
            if text.is_blank() {
                return out;
            }
            let fill = style.fill.solid().unwrap_or(style.stroke);
            let stroke_outline =
                (style.stroke_width > 1.0).then(|| (outline(style, style.stroke_width), ink));
            out.push(Drawable::Text(TextRun {
                anchor: text.origin(),
                lines: text.lines().map(str::to_string).collect(),
                font_size: text.font_size,
                font_family: text.font_family.clone(),
                bold: text.font_style.bold,
                italic: text.font_style.italic,
                align: TextAlign::Left,
                fill: faded(fill, style.opacity),
                outline: stroke_outline,
            }));
        }
        ShapeKind::Eraser(line) => {
            out.push(Drawable::Stroke {
                path: line.to_path(),
                stroke: rounded(Stroke::new(style.stroke_width)),
                color: SerializableColor::black(),
            });
        }
    }

    out
}

/// Selection affordances sized in screen pixels at `zoom`.
pub fn affordance_drawables(shape: &Shape, zoom: f64, selection_color: SerializableColor) -> Vec<Drawable> {
    let px = 1.0 / zoom.max(f64::EPSILON);
    let handles = get_handles(shape);
    let mut out = Vec::new();

    if shape.is_angle() && !shape.locked {
        for handle in handles {
            let circle = kurbo::Circle::new(handle.position, ANCHOR_RADIUS * px).to_path(CURVE_TOLERANCE);
            out.push(Drawable::Fill {
                path: circle.clone(),
                color: ANCHOR_FILL,
            });
            out.push(Drawable::Stroke {
                path: circle,
                stroke: Stroke::new(ANCHOR_STROKE_WIDTH * px),
                color: SerializableColor::white(),
            });
        }
        return out;
    }

    out.push(Drawable::Stroke {
        path: shape.bounds().to_path(CURVE_TOLERANCE),
        stroke: Stroke::new(px),
        color: selection_color,
    });
    let half = HANDLE_SIZE * px / 2.0;
    for handle in handles {
        if matches!(handle.kind, HandleKind::Anchor(_)) {
            continue;
        }
        let p = handle.position;
        let square = Rect::new(p.x - half, p.y - half, p.x + half, p.y + half).to_path(CURVE_TOLERANCE);
        out.push(Drawable::Fill {
            path: square.clone(),
            color: SerializableColor::white(),
        });
        out.push(Drawable::Stroke {
            path: square,
            stroke: Stroke::new(px),
            color: selection_color,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape as _;
    use pagemark_core::color::Paint;
    use pagemark_core::geometry::MeasureUnit;
    use pagemark_core::shapes::{Angle, Frame, LABEL_OFFSET, Measurement, Polyline, Text};

    fn shape(page: u32, kind: ShapeKind) -> Shape {
        Shape::new(page, ShapeStyle::default(), kind)
    }

    fn rect(page: u32) -> Shape {
        shape(page, ShapeKind::Rectangle(Frame::new(Point::new(10.0, 10.0), 40.0, 20.0)))
    }

    fn page_size() -> Size {
        Size::new(200.0, 100.0)
    }

    #[test]
    fn test_background_first_and_page_filter() {
        let shapes = vec![rect(1), rect(2)];
        let ctx = RenderContext::new(&shapes, 1, page_size());
        let list = build_display_list(&ctx);
        assert!(matches!(list.items[0].drawable, Drawable::Page { .. }));
        assert_eq!(list.items[0].layer, Layer::Background);
        assert_eq!(list.shape_ids(), vec![shapes[0].id]);
    }

    #[test]
    fn test_invisible_and_editing_skipped() {
        let mut hidden = rect(1);
        hidden.visible = false;
        let text = {
            let mut t = Text::new(Point::new(5.0, 5.0), 12.0, "Inter");
            t.text = "Kitchen".into();
            shape(1, ShapeKind::Text(t))
        };
        let shapes = vec![hidden, text.clone()];

        let list = build_display_list(&RenderContext::new(&shapes, 1, page_size()));
        assert_eq!(list.shape_ids(), vec![text.id]);

        let ctx = RenderContext::new(&shapes, 1, page_size()).with_editing_shape(Some(text.id));
        assert!(build_display_list(&ctx).is_blank());
    }

    #[test]
    fn test_rect_fill_is_translucent_stroke_is_not() {
        let mut r = rect(1);
        r.style.fill = Paint::Solid(SerializableColor::rgb(255, 0, 0));
        r.style.opacity = 0.5;
        let drawables = shape_drawables(&r);
        assert_eq!(drawables.len(), 2);
        match &drawables[0] {
            Drawable::Fill { color, .. } => assert_eq!(color.a, 128),
            other => panic!("expected fill, got {:?}", other),
        }
        match &drawables[1] {
            Drawable::Stroke { color, .. } => assert_eq!(color.a, 255),
            other => panic!("expected stroke, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_ellipse_uses_absolute_radii() {
        let e = shape(1, ShapeKind::Ellipse(Frame::new(Point::new(50.0, 50.0), -20.0, -10.0)));
        let Drawable::Stroke { path, .. } = &shape_drawables(&e)[0] else {
            panic!("expected stroke");
        };
        let b = path.bounding_box();
        assert!((b.x0 - 30.0).abs() < 1e-6 && (b.x1 - 50.0).abs() < 1e-6);
        assert!((b.y0 - 40.0).abs() < 1e-6 && (b.y1 - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_arrow_head_at_last_point() {
        let arrow = shape(
            1,
            ShapeKind::Arrow(Polyline::new(vec![Point::ZERO, Point::new(100.0, 0.0)])),
        );
        let drawables = shape_drawables(&arrow);
        let Drawable::Fill { path, .. } = &drawables[1] else {
            panic!("expected head fill");
        };
        let b = path.bounding_box();
        assert!((b.x1 - 100.0).abs() < 1e-9);
        assert!((b.x0 - 90.0).abs() < 1e-9);
        assert!((b.height() - ARROW_POINTER_WIDTH).abs() < 1e-9);
    }

    #[test]
    fn test_measurement_label() {
        let m = shape(
            1,
            ShapeKind::Measurement(Measurement::new(Point::ZERO, Point::new(72.0, 0.0), MeasureUnit::In)),
        );
        let drawables = shape_drawables(&m);
        let heads = drawables
            .iter()
            .filter(|d| matches!(d, Drawable::Fill { .. }))
            .count();
        assert_eq!(heads, 2);
        let Some(Drawable::Text(run)) = drawables.last() else {
            panic!("expected label");
        };
        assert_eq!(run.lines, vec!["1.00 in".to_string()]);
        assert!(run.bold);
        assert_eq!(run.anchor, Point::new(36.0, -LABEL_OFFSET));
        assert!((run.font_size - 14.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_angle_wedge_and_label() {
        let a = shape(
            1,
            ShapeKind::Angle(Angle::new(Point::new(50.0, 0.0), Point::ZERO, Point::new(0.0, 50.0))),
        );
        let drawables = shape_drawables(&a);
        let Drawable::Fill { path, color } = &drawables[1] else {
            panic!("expected wedge fill");
        };
        assert_eq!(color.a, 51);
        let b = path.bounding_box();
        assert!((b.x1 - WEDGE_RADIUS).abs() < 1e-3);
        assert!((b.y1 - WEDGE_RADIUS).abs() < 1e-3);
        let Some(Drawable::Text(run)) = drawables.last() else {
            panic!("expected label");
        };
        assert_eq!(run.lines, vec!["90.0°".to_string()]);
        assert_eq!(run.font_family, "Inter");
    }

    #[test]
    fn test_angle_opacity_fades_wedge() {
        let mut a = shape(
            1,
            ShapeKind::Angle(Angle::new(Point::new(50.0, 0.0), Point::ZERO, Point::new(0.0, 50.0))),
        );
        a.style.opacity = 0.5;
        let drawables = shape_drawables(&a);
        let Drawable::Fill { color, .. } = &drawables[1] else {
            panic!("expected wedge fill");
        };
        assert!((25..=26).contains(&color.a));
        let Drawable::Stroke { color: arms, .. } = &drawables[0] else {
            panic!("expected arms");
        };
        assert!((127..=128).contains(&arms.a));
    }

    #[test]
    fn test_text_fill_falls_back_to_stroke() {
        let mut t = Text::new(Point::new(5.0, 5.0), 12.0, "Inter");
        t.text = "a\nb".into();
        let mut s = shape(1, ShapeKind::Text(t));
        s.style.stroke = SerializableColor::rgb(1, 2, 3);
        s.style.stroke_width = 1.0;
        let Drawable::Text(run) = &shape_drawables(&s)[0] else {
            panic!("expected text");
        };
        assert_eq!(run.fill, SerializableColor::rgb(1, 2, 3));
        assert_eq!(run.lines.len(), 2);
        assert!(run.outline.is_none());

        s.style.stroke_width = 2.0;
        let Drawable::Text(run) = &shape_drawables(&s)[0] else {
            panic!("expected text");
        };
        assert!(run.outline.is_some());
    }

    #[test]
    fn test_eraser_is_destination_out() {
        let mut eraser = shape(
            1,
            ShapeKind::Eraser(Polyline::new(vec![Point::ZERO, Point::new(10.0, 0.0)])),
        );
        eraser.style.stroke_width = 20.0;
        let shapes = vec![eraser];
        let list = build_display_list(&RenderContext::new(&shapes, 1, page_size()));
        let item = list.layer(Layer::Annotations).next().unwrap();
        assert_eq!(item.composite, Composite::DestinationOut);
        let Drawable::Stroke { stroke, .. } = &item.drawable else {
            panic!("expected stroke");
        };
        assert!((stroke.width - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_dash_applies_to_strokes() {
        let mut r = rect(1);
        r.style.dash = vec![4.0, 2.0];
        let Drawable::Stroke { stroke, .. } = &shape_drawables(&r)[0] else {
            panic!("expected stroke");
        };
        assert_eq!(stroke.dash_pattern.len(), 2);
    }

    #[test]
    fn test_handles_scale_with_zoom() {
        let shapes = vec![rect(1)];
        let ctx = RenderContext::new(&shapes, 1, page_size())
            .with_transform(Affine::scale(2.0), 2.0)
            .with_selection(Some(shapes[0].id));
        let list = build_display_list(&ctx);
        let overlay: Vec<_> = list.layer(Layer::Overlay).collect();
        // Outline plus fill and border for 8 handles.
        assert_eq!(overlay.len(), 17);
        let Drawable::Fill { path, .. } = &overlay[1].drawable else {
            panic!("expected handle fill");
        };
        assert!((path.bounding_box().width() - HANDLE_SIZE / 2.0).abs() < 1e-9);

        let hidden = RenderContext::new(&shapes, 1, page_size())
            .with_selection(Some(shapes[0].id))
            .with_affordances(false);
        assert_eq!(build_display_list(&hidden).layer(Layer::Overlay).count(), 0);
    }

    #[test]
    fn test_angle_gets_anchors() {
        let a = shape(
            1,
            ShapeKind::Angle(Angle::new(Point::new(50.0, 0.0), Point::ZERO, Point::new(0.0, 50.0))),
        );
        let drawables = affordance_drawables(&a, 1.0, SerializableColor::rgb(59, 130, 246));
        assert_eq!(drawables.len(), 6);
        let Drawable::Fill { path, color } = &drawables[0] else {
            panic!("expected anchor fill");
        };
        assert_eq!(*color, ANCHOR_FILL);
        assert!((path.bounding_box().width() - 2.0 * ANCHOR_RADIUS).abs() < 1e-6);
    }
}
