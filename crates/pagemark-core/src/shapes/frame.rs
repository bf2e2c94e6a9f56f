//! Box geometry shared by rectangles and ellipses.

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Origin plus signed size.
///
/// Width and height keep the sign they were drafted with (dragging up or
/// left gives negative values); [`Frame::rect`] normalizes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl Frame {
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Normalized rectangle (non-negative size).
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height).abs()
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Ellipse radii (always non-negative).
    pub fn radii(&self) -> Vec2 {
        Vec2::new(self.width.abs() / 2.0, self.height.abs() / 2.0)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Apply an axis-aligned transform. The result is normalized.
    pub fn transform(&mut self, affine: Affine) {
        let rect = affine.transform_rect_bbox(self.rect());
        self.x = rect.x0;
        self.y = rect.y0;
        self.width = rect.width();
        self.height = rect.height();
    }

    /// Whether `point` lies inside the ellipse inscribed in this frame.
    pub fn ellipse_contains(&self, point: Point, tolerance: f64) -> bool {
        let radii = self.radii() + Vec2::new(tolerance, tolerance);
        if radii.x <= 0.0 || radii.y <= 0.0 {
            return false;
        }
        let d = point - self.center();
        (d.x / radii.x).powi(2) + (d.y / radii.y).powi(2) <= 1.0
    }

    /// Approximate distance test against the ellipse outline.
    pub fn ellipse_outline_hit(&self, point: Point, tolerance: f64) -> bool {
        let radii = self.radii();
        let d = point - self.center();
        if radii.x < f64::EPSILON || radii.y < f64::EPSILON {
            return self.rect().inflate(tolerance, tolerance).contains(point);
        }
        let normalized = ((d.x / radii.x).powi(2) + (d.y / radii.y).powi(2)).sqrt();
        (normalized - 1.0).abs() * radii.x.min(radii.y) <= tolerance
    }
}
