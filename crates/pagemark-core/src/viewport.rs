//! Viewport module for pan/zoom transforms.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 8.0;

/// Zoom factor applied per wheel notch.
pub const WHEEL_ZOOM_FACTOR: f64 = 1.1;

/// Zoom change per zoom-button press.
pub const ZOOM_STEP: f64 = 0.1;

/// Two-tier padding used when fitting a page into its container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitPadding {
    /// Containers narrower than this use the narrow padding.
    pub breakpoint: f64,
    pub narrow: f64,
    pub wide: f64,
}

impl Default for FitPadding {
    fn default() -> Self {
        Self {
            breakpoint: 1024.0,
            narrow: 8.0,
            wide: 32.0,
        }
    }
}

impl FitPadding {
    pub fn for_width(&self, container_width: f64) -> f64 {
        if container_width < self.breakpoint {
            self.narrow
        } else {
            self.wide
        }
    }
}

/// Viewport manages the view transform between screen and page space.
///
/// Page (world) coordinates are what shapes are stored in; screen coordinates
/// are pixels in the visible container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Pan offset in screen pixels.
    pub offset: Vec2,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zoom_bounds(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(min_zoom, max_zoom);
        self
    }

    /// World to screen.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen to world.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan by a delta in screen pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    pub fn accepts(&self, zoom: f64) -> bool {
        zoom.is_finite() && zoom >= self.min_zoom && zoom <= self.max_zoom
    }

    /// Set the zoom keeping `screen_point` over the same world point.
    /// Zoom levels outside the bounds are rejected; returns false then.
    pub fn set_zoom_at(&mut self, screen_point: Point, new_zoom: f64) -> bool {
        if !self.accepts(new_zoom) {
            return false;
        }

        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;

        let new_screen = self.world_to_screen(world_point);
        self.offset += screen_point - new_screen;
        true
    }

    /// Multiply the zoom by `factor` around `screen_point`.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) -> bool {
        self.set_zoom_at(screen_point, self.zoom * factor)
    }

    /// Wheel zoom: scrolling up (negative delta) zooms in.
    pub fn zoom_wheel(&mut self, screen_point: Point, delta_y: f64, factor: f64) -> bool {
        if delta_y < 0.0 {
            self.zoom_at(screen_point, factor)
        } else {
            self.zoom_at(screen_point, 1.0 / factor)
        }
    }

    /// Add `step` to the zoom around the container center.
    pub fn zoom_step(&mut self, container: Size, step: f64) -> bool {
        let center = Point::new(container.width / 2.0, container.height / 2.0);
        self.set_zoom_at(center, self.zoom + step)
    }

    /// Largest zoom that fits `page` inside `container` minus padding, centered.
    pub fn fit_to_page(&mut self, container: Size, page: Size, padding: &FitPadding) {
        if page.is_zero_area() || container.is_zero_area() {
            return;
        }
        let pad = padding.for_width(container.width);
        let available = Size::new(
            (container.width - pad).max(1.0),
            (container.height - pad).max(1.0),
        );

        let scale_x = available.width / page.width;
        let scale_y = available.height / page.height;
        self.zoom = scale_x.min(scale_y).clamp(self.min_zoom, self.max_zoom);

        self.offset = Vec2::new(
            (container.width - page.width * self.zoom) / 2.0,
            (container.height - page.height * self.zoom) / 2.0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_viewport() {
        let viewport = Viewport::new();
        assert_eq!(viewport.offset, Vec2::ZERO);
        assert!((viewport.zoom - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_offset_and_zoom() {
        let mut viewport = Viewport::new();
        viewport.offset = Vec2::new(50.0, 100.0);
        viewport.zoom = 2.0;
        let world = viewport.screen_to_world(Point::new(150.0, 300.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut viewport = Viewport::new();
        viewport.offset = Vec2::new(30.0, -20.0);
        viewport.zoom = 1.5;

        let original = Point::new(123.0, 456.0);
        let back = viewport.world_to_screen(viewport.screen_to_world(original));
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_keeps_pointer_anchor() {
        let mut viewport = Viewport::new();
        viewport.offset = Vec2::new(12.0, 7.0);
        let pointer = Point::new(200.0, 150.0);
        let before = viewport.screen_to_world(pointer);
        assert!(viewport.zoom_at(pointer, WHEEL_ZOOM_FACTOR));
        let after = viewport.screen_to_world(pointer);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_in_then_out_restores() {
        let mut viewport = Viewport::new();
        viewport.offset = Vec2::new(-40.0, 25.0);
        viewport.zoom = 1.3;
        let original = viewport.clone();
        let pointer = Point::new(321.0, 87.0);

        assert!(viewport.zoom_wheel(pointer, -1.0, WHEEL_ZOOM_FACTOR));
        assert!(viewport.zoom_wheel(pointer, 1.0, WHEEL_ZOOM_FACTOR));

        assert!((viewport.zoom - original.zoom).abs() < 1e-9);
        assert!((viewport.offset.x - original.offset.x).abs() < 1e-9);
        assert!((viewport.offset.y - original.offset.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_out_of_bounds_rejected() {
        let mut viewport = Viewport::new();
        viewport.zoom = 7.5;
        viewport.offset = Vec2::new(3.0, 4.0);
        assert!(!viewport.zoom_at(Point::ZERO, WHEEL_ZOOM_FACTOR));
        assert!((viewport.zoom - 7.5).abs() < f64::EPSILON);
        assert_eq!(viewport.offset, Vec2::new(3.0, 4.0));

        viewport.zoom = 0.105;
        assert!(!viewport.zoom_at(Point::ZERO, 1.0 / WHEEL_ZOOM_FACTOR));
        assert!((viewport.zoom - 0.105).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_step_bounds() {
        let mut viewport = Viewport::new();
        viewport.zoom = 0.15;
        assert!(!viewport.zoom_step(Size::new(800.0, 600.0), -ZOOM_STEP));
        assert!(viewport.zoom_step(Size::new(800.0, 600.0), ZOOM_STEP));
        assert!((viewport.zoom - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_fit_to_page_wide_container() {
        let mut viewport = Viewport::new();
        let container = Size::new(1232.0, 824.0);
        let page = Size::new(600.0, 800.0);
        viewport.fit_to_page(container, page, &FitPadding::default());
        // Height limits: (824 - 32) / 800
        assert!((viewport.zoom - 0.99).abs() < 1e-12);
        assert!((viewport.offset.x - (1232.0 - 600.0 * 0.99) / 2.0).abs() < 1e-9);
        assert!((viewport.offset.y - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_to_page_narrow_container() {
        let mut viewport = Viewport::new();
        viewport.fit_to_page(
            Size::new(408.0, 2000.0),
            Size::new(400.0, 400.0),
            &FitPadding::default(),
        );
        assert!((viewport.zoom - 1.0).abs() < 1e-12);
        assert!((viewport.offset.x - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_pan() {
        let mut viewport = Viewport::new();
        viewport.pan(Vec2::new(10.0, 20.0));
        assert!((viewport.offset.x - 10.0).abs() < f64::EPSILON);
        assert!((viewport.offset.y - 20.0).abs() < f64::EPSILON);
    }
}
