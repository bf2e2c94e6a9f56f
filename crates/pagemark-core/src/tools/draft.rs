//! Shape creation and growth for the drafting tools.

use super::ToolKind;
use crate::shapes::{Angle, Frame, Measurement, Polyline, Shape, ShapeKind, Text};
use crate::style::DefaultStyle;
use kurbo::Point;

/// Create the shape a drafting tool places on pointer-down at `point`.
pub fn begin_draft(tool: ToolKind, point: Point, page: u32, defaults: &DefaultStyle) -> Option<Shape> {
    let (style, kind) = match tool {
        ToolKind::Select | ToolKind::Pan => return None,
        ToolKind::Rectangle => (
            defaults.shape_style(),
            ShapeKind::Rectangle(Frame::new(point, 0.0, 0.0)),
        ),
        ToolKind::Ellipse => (
            defaults.shape_style(),
            ShapeKind::Ellipse(Frame::new(point, 0.0, 0.0)),
        ),
        ToolKind::Line => (defaults.shape_style(), ShapeKind::Line(Polyline::degenerate(point))),
        ToolKind::Arrow => (defaults.shape_style(), ShapeKind::Arrow(Polyline::degenerate(point))),
        ToolKind::Pen => (defaults.shape_style(), ShapeKind::Pen(Polyline::single(point))),
        ToolKind::Eraser => (defaults.eraser_style(), ShapeKind::Eraser(Polyline::single(point))),
        ToolKind::Measure => (
            defaults.shape_style(),
            ShapeKind::Measurement(Measurement::new(point, point, defaults.unit)),
        ),
        ToolKind::Angle => (defaults.shape_style(), ShapeKind::Angle(Angle::degenerate(point))),
        ToolKind::Text => {
            let mut text = Text::new(point, defaults.font_size, defaults.font_family.clone());
            text.font_style = defaults.font_style;
            (defaults.text_style(), ShapeKind::Text(text))
        }
    };
    Some(Shape::new(page, style, kind))
}

/// Grow a drafted shape toward `pointer`. `origin` is the pointer-down point.
///
/// Ink only appends, so each call is constant time. Returns false when the
/// shape did not change.
pub fn extend_draft(shape: &mut Shape, origin: Point, pointer: Point, decimation: f64) -> bool {
    match &mut shape.kind {
        ShapeKind::Rectangle(f) | ShapeKind::Ellipse(f) => {
            f.width = pointer.x - origin.x;
            f.height = pointer.y - origin.y;
            true
        }
        ShapeKind::Line(p) | ShapeKind::Arrow(p) => {
            p.set_end(pointer);
            true
        }
        ShapeKind::Pen(p) | ShapeKind::Eraser(p) => p.push_decimated(pointer, decimation),
        ShapeKind::Measurement(m) => {
            m.points[1] = pointer;
            true
        }
        ShapeKind::Angle(a) => {
            *a = Angle::drafted(a.vertex(), pointer);
            true
        }
        ShapeKind::Text(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::SerializableColor;
    use crate::geometry::MeasureUnit;

    fn draft(tool: ToolKind, at: Point) -> Shape {
        begin_draft(tool, at, 1, &DefaultStyle::default()).unwrap()
    }

    #[test]
    fn test_non_drafting_tools() {
        let defaults = DefaultStyle::default();
        assert!(begin_draft(ToolKind::Select, Point::ZERO, 1, &defaults).is_none());
        assert!(begin_draft(ToolKind::Pan, Point::ZERO, 1, &defaults).is_none());
    }

    #[test]
    fn test_rectangle_keeps_sign() {
        let origin = Point::new(50.0, 50.0);
        let mut shape = draft(ToolKind::Rectangle, origin);
        assert!(extend_draft(&mut shape, origin, Point::new(20.0, 80.0), 4.0));
        let ShapeKind::Rectangle(f) = &shape.kind else {
            panic!("expected a rectangle");
        };
        assert!((f.x - 50.0).abs() < f64::EPSILON);
        assert!((f.width + 30.0).abs() < f64::EPSILON);
        assert!((f.height - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_line_moves_second_point() {
        let mut shape = draft(ToolKind::Arrow, Point::ZERO);
        extend_draft(&mut shape, Point::ZERO, Point::new(3.0, 4.0), 4.0);
        extend_draft(&mut shape, Point::ZERO, Point::new(6.0, 8.0), 4.0);
        assert_eq!(shape.points().unwrap(), &[Point::ZERO, Point::new(6.0, 8.0)]);
    }

    #[test]
    fn test_pen_decimation() {
        let mut shape = draft(ToolKind::Pen, Point::ZERO);
        assert!(!extend_draft(&mut shape, Point::ZERO, Point::new(1.0, 1.0), 4.0));
        assert!(!extend_draft(&mut shape, Point::ZERO, Point::new(2.0, 2.0), 4.0));
        assert_eq!(shape.points().unwrap().len(), 1);

        let mut shape = draft(ToolKind::Pen, Point::ZERO);
        for i in 1..=4 {
            assert!(extend_draft(&mut shape, Point::ZERO, Point::new(5.0 * i as f64, 0.0), 4.0));
        }
        assert_eq!(shape.points().unwrap().len(), 5);
    }

    #[test]
    fn test_eraser_style() {
        let defaults = DefaultStyle {
            eraser_size: 30.0,
            ..DefaultStyle::default()
        };
        let shape = begin_draft(ToolKind::Eraser, Point::ZERO, 2, &defaults).unwrap();
        assert_eq!(shape.page, 2);
        assert_eq!(shape.style.stroke, SerializableColor::black());
        assert!((shape.style.stroke_width - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_measure_uses_default_unit() {
        let defaults = DefaultStyle {
            unit: MeasureUnit::In,
            ..DefaultStyle::default()
        };
        let mut shape = begin_draft(ToolKind::Measure, Point::ZERO, 1, &defaults).unwrap();
        extend_draft(&mut shape, Point::ZERO, Point::new(72.0, 0.0), 4.0);
        let ShapeKind::Measurement(m) = &shape.kind else {
            panic!("expected a measurement");
        };
        assert_eq!(m.label(), "1.00 in");
    }

    #[test]
    fn test_angle_companion_arm() {
        let vertex = Point::new(10.0, 10.0);
        let mut shape = draft(ToolKind::Angle, vertex);
        extend_draft(&mut shape, vertex, Point::new(20.0, 10.0), 4.0);
        let points = shape.points().unwrap();
        assert_eq!(points[0], Point::new(20.0, 10.0));
        assert_eq!(points[1], vertex);
        let expected = 10.0 * std::f64::consts::FRAC_1_SQRT_2;
        assert!((points[2].x - (10.0 + expected)).abs() < 1e-9);
        assert!((points[2].y - (10.0 + expected)).abs() < 1e-9);
    }

    #[test]
    fn test_text_starts_empty_and_filled() {
        let shape = draft(ToolKind::Text, Point::new(5.0, 5.0));
        let ShapeKind::Text(t) = &shape.kind else {
            panic!("expected text");
        };
        assert!(t.text.is_empty());
        assert!((t.font_size - 10.0).abs() < f64::EPSILON);
        assert!(!shape.style.fill.is_transparent());
    }
}
