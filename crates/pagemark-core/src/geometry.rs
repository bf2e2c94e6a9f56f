//! Distance, angle and measurement helpers.
//!
//! World coordinates follow the PDF point convention: 72 units per inch.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Page units per inch.
pub const UNITS_PER_INCH: f64 = 72.0;

/// Distance from the vertex at which angle labels are placed.
pub const ANGLE_LABEL_RADIUS: f64 = 45.0;

/// Bearing offset of the companion arm generated while drafting an angle.
pub const ANGLE_DRAFT_OFFSET: f64 = PI / 4.0;

/// Display unit of a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureUnit {
    #[default]
    Mm,
    Cm,
    In,
    Ft,
}

impl MeasureUnit {
    pub const ALL: [MeasureUnit; 4] = [
        MeasureUnit::Mm,
        MeasureUnit::Cm,
        MeasureUnit::In,
        MeasureUnit::Ft,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            MeasureUnit::Mm => "mm",
            MeasureUnit::Cm => "cm",
            MeasureUnit::In => "in",
            MeasureUnit::Ft => "ft",
        }
    }

    /// Convert page units to this unit.
    pub fn convert(self, distance: f64) -> f64 {
        let inches = distance / UNITS_PER_INCH;
        match self {
            MeasureUnit::Mm => inches * 25.4,
            MeasureUnit::Cm => inches * 2.54,
            MeasureUnit::In => inches,
            MeasureUnit::Ft => inches / 12.0,
        }
    }
}

pub fn distance(a: Point, b: Point) -> f64 {
    (b - a).hypot()
}

/// Bearing of `to` as seen from `from`, in radians.
pub fn bearing(from: Point, to: Point) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Rotation from the first arm's bearing to the second, in degrees within `[0, 360)`.
pub fn angle_between(vertex: Point, arm1: Point, arm2: Point) -> f64 {
    let mut degrees = (bearing(vertex, arm2) - bearing(vertex, arm1)).to_degrees();
    if degrees < 0.0 {
        degrees += 360.0;
    }
    if degrees >= 360.0 {
        degrees -= 360.0;
    }
    if degrees == 0.0 { 0.0 } else { degrees }
}

/// Label text for a measured distance.
///
/// Millimetres are rounded to whole numbers and shown bare; the other units
/// carry two decimals and their suffix.
pub fn measurement_label(distance: f64, unit: MeasureUnit) -> String {
    let value = unit.convert(distance);
    match unit {
        MeasureUnit::Mm => format!("{:.0}", value),
        _ => format!("{:.2} {}", value, unit.suffix()),
    }
}

/// Point at `radius` from `vertex` along `bisector` (radians).
pub fn angle_label_position(vertex: Point, bisector: f64, radius: f64) -> Point {
    vertex + Vec2::from_angle(bisector) * radius
}

/// Round to one decimal, as shown in the angle value editor.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Shortest distance from `point` to the segment `a`..`b`.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq < f64::EPSILON {
        return distance(point, a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    distance(point, a + ab * t)
}

/// Derived values of a three-point angle: arm-1 end, vertex, arm-2 end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleGeometry {
    pub arm1: Point,
    pub vertex: Point,
    pub arm2: Point,
    /// Sweep from arm 1 to arm 2 in degrees, `[0, 360)`.
    pub degrees: f64,
    /// Bearing of arm 1 in radians.
    pub start_bearing: f64,
    /// Where the value label is drawn.
    pub label: Point,
}

impl AngleGeometry {
    pub fn new(arm1: Point, vertex: Point, arm2: Point) -> Self {
        let degrees = angle_between(vertex, arm1, arm2);
        let start_bearing = bearing(vertex, arm1);
        let bisector = start_bearing + degrees.to_radians() / 2.0;
        Self {
            arm1,
            vertex,
            arm2,
            degrees,
            start_bearing,
            label: angle_label_position(vertex, bisector, ANGLE_LABEL_RADIUS),
        }
    }

    /// Label text, e.g. `"90.0°"`.
    pub fn label_text(&self) -> String {
        format!("{:.1}°", self.degrees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_labels() {
        assert_eq!(measurement_label(72.0, MeasureUnit::In), "1.00 in");
        assert_eq!(measurement_label(72.0, MeasureUnit::Mm), "25");
        assert_eq!(measurement_label(864.0, MeasureUnit::Ft), "1.00 ft");
        assert_eq!(measurement_label(72.0, MeasureUnit::Cm), "2.54 cm");
    }

    #[test]
    fn test_default_unit_is_mm() {
        assert_eq!(MeasureUnit::default(), MeasureUnit::Mm);
    }

    #[test]
    fn test_angle_between_quadrants() {
        let v = Point::ZERO;
        let east = Point::new(1.0, 0.0);
        assert!((angle_between(v, east, Point::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((angle_between(v, east, Point::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_angle_between_normalizes_negative() {
        let v = Point::ZERO;
        let deg = angle_between(v, Point::new(0.0, 1.0), Point::new(1.0, 0.0));
        assert!((deg - 270.0).abs() < 1e-9);
        assert!((0.0..360.0).contains(&deg));
    }

    #[test]
    fn test_angle_between_degenerate_is_zero() {
        let v = Point::new(5.0, 5.0);
        assert_eq!(angle_between(v, v, v), 0.0);
    }

    #[test]
    fn test_label_sits_on_bisector() {
        let geom = AngleGeometry::new(Point::new(10.0, 0.0), Point::ZERO, Point::new(0.0, 200.0));
        let expected = Vec2::from_angle(PI / 4.0) * ANGLE_LABEL_RADIUS;
        assert!((geom.label.x - expected.x).abs() < 1e-9);
        assert!((geom.label.y - expected.y).abs() < 1e-9);
        assert_eq!(geom.label_text(), "90.0°");
    }

    #[test]
    fn test_point_to_segment_dist() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((point_to_segment_dist(Point::new(5.0, 3.0), a, b) - 3.0).abs() < f64::EPSILON);
        assert!((point_to_segment_dist(Point::new(-4.0, 3.0), a, b) - 5.0).abs() < f64::EPSILON);
        assert!((point_to_segment_dist(Point::new(1.0, 1.0), a, a) - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_round_tenth() {
        assert!((round_tenth(44.96) - 45.0).abs() < f64::EPSILON);
        assert!((round_tenth(12.34) - 12.3).abs() < 1e-12);
    }
}
