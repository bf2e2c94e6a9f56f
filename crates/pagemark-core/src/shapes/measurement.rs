//! Two-point distance measurements.

use super::points;
use crate::geometry::{MeasureUnit, distance, measurement_label, point_to_segment_dist};
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Vertical offset of the label above the segment midpoint.
pub const LABEL_OFFSET: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    #[serde(with = "points::fixed")]
    pub points: [Point; 2],
    #[serde(default)]
    pub unit: MeasureUnit,
}

impl Measurement {
    pub fn new(start: Point, end: Point, unit: MeasureUnit) -> Self {
        Self {
            points: [start, end],
            unit,
        }
    }

    pub fn length(&self) -> f64 {
        distance(self.points[0], self.points[1])
    }

    /// The derived label, e.g. `"1.00 in"`.
    pub fn label(&self) -> String {
        measurement_label(self.length(), self.unit)
    }

    pub fn midpoint(&self) -> Point {
        self.points[0].midpoint(self.points[1])
    }

    /// Where the label is centered.
    pub fn label_anchor(&self) -> Point {
        self.midpoint() - Vec2::new(0.0, LABEL_OFFSET)
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.points[0], self.points[1])
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point_to_segment_dist(point, self.points[0], self.points[1]) <= tolerance
            || distance(point, self.label_anchor()) <= tolerance.max(LABEL_OFFSET / 2.0)
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
