//! Point-list geometry for lines, arrows, pen ink and eraser strokes.

use super::points;
use crate::geometry::{distance, point_to_segment_dist};
use kurbo::{Affine, BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Ordered points in page-local coordinates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline {
    #[serde(with = "points::list")]
    pub points: Vec<Point>,
}

impl Polyline {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// A single-point stroke, as created on pointer-down for ink.
    pub fn single(point: Point) -> Self {
        Self::new(vec![point])
    }

    /// A two-point segment with both ends at `point`.
    pub fn degenerate(point: Point) -> Self {
        Self::new(vec![point, point])
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Append `point` unless it lies closer than `threshold` to the last point.
    /// Returns true if the point was appended.
    pub fn push_decimated(&mut self, point: Point, threshold: f64) -> bool {
        if let Some(last) = self.last() {
            if distance(last, point) < threshold {
                return false;
            }
        }
        self.points.push(point);
        true
    }

    /// Replace the final point, keeping the first.
    pub fn set_end(&mut self, point: Point) {
        match self.points.len() {
            0 => self.points.push(point),
            1 => self.points.push(point),
            n => self.points[n - 1] = point,
        }
    }

    pub fn bounds(&self) -> Rect {
        let mut iter = self.points.iter();
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        iter.fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p))
    }

    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    /// Distance-to-stroke test. A lone point is treated as a dot.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self.points.as_slice() {
            [] => false,
            [only] => distance(*only, point) <= tolerance,
            _ => self
                .segments()
                .any(|(a, b)| point_to_segment_dist(point, a, b) <= tolerance),
        }
    }

    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut iter = self.points.iter();
        if let Some(first) = iter.next() {
            path.move_to(*first);
            for p in iter {
                path.line_to(*p);
            }
        }
        path
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
    fn test_decimation_skips_close_points() {
        let mut line = Polyline::single(Point::ZERO);
        for i in 1..20 {
            let t = f64::from(i) * 0.1;
            line.push_decimated(Point::new(t, t), 4.0);
        }
        assert_eq!(line.points.len(), 1);
    }

    #[test]
    fn test_decimation_keeps_spaced_points() {
        let mut line = Polyline::single(Point::ZERO);
        for i in 1..=10 {
            assert!(line.push_decimated(Point::new(f64::from(i) * 5.0, 0.0), 4.0));
        }
        assert_eq!(line.points.len(), 11);
    }

    #[test]
    fn test_set_end_keeps_start() {
        let mut line = Polyline::degenerate(Point::new(1.0, 1.0));
        line.set_end(Point::new(9.0, 3.0));
        assert_eq!(line.points, vec![Point::new(1.0, 1.0), Point::new(9.0, 3.0)]);
    }

    #[test]
    fn test_bounds() {
        let line = Polyline::new(vec![
            Point::new(5.0, 10.0),
            Point::new(-5.0, 2.0),
            Point::new(3.0, 20.0),
        ]);
        assert_eq!(line.bounds(), Rect::new(-5.0, 2.0, 5.0, 20.0));
    }

    #[test]
    fn test_hit_test() {
        let line = Polyline::new(vec![Point::ZERO, Point::new(100.0, 0.0)]);
        assert!(line.hit_test(Point::new(50.0, 3.0), 5.0));
        assert!(!line.hit_test(Point::new(50.0, 10.0), 5.0));
    }

    #[test]
    fn test_flat_serialization() {
        let line = Polyline::new(vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]);
        let json = serde_json::to_string(&line).unwrap();
        assert_eq!(json, r#"{"points":[1.0,2.0,3.0,4.0]}"#);
        let back: Polyline = serde_json::from_str(&json).unwrap();
        assert_eq!(back, line);
    }
}
