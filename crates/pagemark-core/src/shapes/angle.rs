//! Three-point angle annotations.

use super::points;
use crate::geometry::{ANGLE_DRAFT_OFFSET, AngleGeometry, bearing, distance, point_to_segment_dist};
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Radius of the wedge drawn at the vertex.
pub const WEDGE_RADIUS: f64 = 24.0;

/// Points are `[arm1 end, vertex, arm2 end]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Angle {
    #[serde(with = "points::fixed")]
    pub points: [Point; 3],
}

/// Index of the vertex in [`Angle::points`].
pub const VERTEX: usize = 1;

impl Angle {
    pub fn new(arm1: Point, vertex: Point, arm2: Point) -> Self {
        Self {
            points: [arm1, vertex, arm2],
        }
    }

    /// All three points at `point`.
    pub fn degenerate(point: Point) -> Self {
        Self::new(point, point, point)
    }

    /// Drafting layout: the vertex stays put, arm 1 ends at `pointer`, arm 2
    /// has the same length rotated a fixed 45° further.
    pub fn drafted(vertex: Point, pointer: Point) -> Self {
        let length = distance(vertex, pointer);
        let companion = bearing(vertex, pointer) + ANGLE_DRAFT_OFFSET;
        Self::new(pointer, vertex, vertex + Vec2::from_angle(companion) * length)
    }

    pub fn vertex(&self) -> Point {
        self.points[VERTEX]
    }

    pub fn geometry(&self) -> AngleGeometry {
        AngleGeometry::new(self.points[0], self.points[1], self.points[2])
    }

    pub fn degrees(&self) -> f64 {
        self.geometry().degrees
    }

    /// Rotate arm 2 so the angle reads `degrees`, keeping arm 2's length.
    pub fn with_degrees(&self, degrees: f64) -> Self {
        let [arm1, vertex, arm2] = self.points;
        let length = distance(vertex, arm2);
        let target = bearing(vertex, arm1) + degrees.to_radians();
        Self::new(arm1, vertex, vertex + Vec2::from_angle(target) * length)
    }

    pub fn bounds(&self) -> Rect {
        let [a, v, b] = self.points;
        Rect::from_points(a, v).union_pt(b)
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let [a, v, b] = self.points;
        point_to_segment_dist(point, v, a) <= tolerance
            || point_to_segment_dist(point, v, b) <= tolerance
            || distance(point, v) <= WEDGE_RADIUS
    }

    pub fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    pub fn transform(&mut self, affine: Affine) {
        for p in &mut self.points {
            *p = affine * *p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drafted_companion_arm() {
        let angle = Angle::drafted(Point::ZERO, Point::new(10.0, 0.0));
        let [arm1, vertex, arm2] = angle.points;
        assert_eq!(arm1, Point::new(10.0, 0.0));
        assert_eq!(vertex, Point::ZERO);
        let expected = 10.0 / 2f64.sqrt();
        assert!((arm2.x - expected).abs() < 1e-9);
        assert!((arm2.y - expected).abs() < 1e-9);
        assert!((angle.degrees() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_with_degrees_keeps_second_arm_length() {
        let angle = Angle::new(Point::new(10.0, 0.0), Point::ZERO, Point::new(0.0, 30.0));
        let edited = angle.with_degrees(120.0);
        assert_eq!(edited.points[0], angle.points[0]);
        assert_eq!(edited.points[1], angle.points[1]);
        assert!((distance(Point::ZERO, edited.points[2]) - 30.0).abs() < 1e-9);
        assert!((edited.degrees() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_angle_is_zero() {
        assert_eq!(Angle::degenerate(Point::new(3.0, 4.0)).degrees(), 0.0);
    }
}
