//! Selection handles and shape manipulation.

use crate::shapes::{Shape, ShapeId, ShapeKind};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Resize handle size in screen pixels.
pub const HANDLE_SIZE: f64 = 8.0;
/// Angle anchor radius in screen pixels.
pub const ANCHOR_RADIUS: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    Corner(Corner),
    /// Edge midpoint.
    Edge(Edge),
    /// Angle point: 0 and 2 are ray ends, 1 is the vertex.
    Anchor(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// A handle in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// `tolerance` is in page units, i.e. already divided by the zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position).hypot2() <= tolerance * tolerance
    }
}

/// Handles shown for a selected shape. Angles get their three anchors,
/// movable shapes get 4 corners and 4 edge midpoints, locked shapes none.
pub fn get_handles(shape: &Shape) -> Vec<Handle> {
    match &shape.kind {
        ShapeKind::Angle(angle) if !shape.locked => angle
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| Handle::new(*p, HandleKind::Anchor(i)))
            .collect(),
        _ if shape.is_transformable() => bounds_handles(shape.bounds()),
        _ => Vec::new(),
    }
}

fn bounds_handles(b: Rect) -> Vec<Handle> {
    let c = b.center();
    vec![
        Handle::new(Point::new(b.x0, b.y0), HandleKind::Corner(Corner::TopLeft)),
        Handle::new(Point::new(b.x1, b.y0), HandleKind::Corner(Corner::TopRight)),
        Handle::new(Point::new(b.x0, b.y1), HandleKind::Corner(Corner::BottomLeft)),
        Handle::new(Point::new(b.x1, b.y1), HandleKind::Corner(Corner::BottomRight)),
        Handle::new(Point::new(c.x, b.y0), HandleKind::Edge(Edge::Top)),
        Handle::new(Point::new(b.x1, c.y), HandleKind::Edge(Edge::Right)),
        Handle::new(Point::new(c.x, b.y1), HandleKind::Edge(Edge::Bottom)),
        Handle::new(Point::new(b.x0, c.y), HandleKind::Edge(Edge::Left)),
    ]
}

/// First handle of `shape` under `point`.
pub fn hit_test_handles(shape: &Shape, point: Point, tolerance: f64) -> Option<HandleKind> {
    get_handles(shape)
        .into_iter()
        .find(|h| h.hit_test(point, tolerance))
        .map(|h| h.kind)
}

/// An in-progress move, resize or anchor drag on one shape.
#[derive(Debug, Clone)]
pub struct ManipulationState {
    pub shape_id: ShapeId,
    /// `None` moves the whole shape.
    pub handle: Option<HandleKind>,
    pub start_point: Point,
    pub current_point: Point,
    /// The shape as it was at pointer-down.
    pub original_shape: Shape,
}

impl ManipulationState {
    pub fn new(shape_id: ShapeId, handle: Option<HandleKind>, start_point: Point, original_shape: Shape) -> Self {
        Self {
            shape_id,
            handle,
            start_point,
            current_point: start_point,
            original_shape,
        }
    }

    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }

    /// True once the pointer actually moved.
    pub fn moved(&self) -> bool {
        self.current_point != self.start_point
    }
}

/// Resized bounds for dragging `handle` of `bounds` by `delta`, normalized.
pub fn resized_bounds(bounds: Rect, handle: HandleKind, delta: Vec2) -> Rect {
    let (mut x0, mut y0, mut x1, mut y1) = (bounds.x0, bounds.y0, bounds.x1, bounds.y1);
    match handle {
        HandleKind::Corner(Corner::TopLeft) => {
            x0 += delta.x;
            y0 += delta.y;
        }
        HandleKind::Corner(Corner::TopRight) => {
            x1 += delta.x;
            y0 += delta.y;
        }
        HandleKind::Corner(Corner::BottomLeft) => {
            x0 += delta.x;
            y1 += delta.y;
        }
        HandleKind::Corner(Corner::BottomRight) => {
            x1 += delta.x;
            y1 += delta.y;
        }
        HandleKind::Edge(Edge::Top) => y0 += delta.y,
        HandleKind::Edge(Edge::Right) => x1 += delta.x,
        HandleKind::Edge(Edge::Bottom) => y1 += delta.y,
        HandleKind::Edge(Edge::Left) => x0 += delta.x,
        HandleKind::Anchor(_) => {}
    }
    Rect::new(x0, y0, x1, y1).abs()
}

/// Apply a manipulation to a copy of `original`.
///
/// Returns `None` when the result would be rejected: a resize below
/// `min_size` on either axis, or an anchor index the shape does not have.
pub fn apply_manipulation(original: &Shape, handle: Option<HandleKind>, delta: Vec2, min_size: f64) -> Option<Shape> {
    let mut shape = original.clone();
    match handle {
        None => shape.translate(delta),
        Some(HandleKind::Anchor(index)) => {
            let ShapeKind::Angle(angle) = &mut shape.kind else {
                return None;
            };
            let point = angle.points.get_mut(index)?;
            *point += delta;
        }
        Some(kind) => {
            let target = resized_bounds(original.bounds(), kind, delta);
            if target.width() < min_size || target.height() < min_size {
                return None;
            }
            shape.fit_to_bounds(target);
        }
    }
    Some(shape)
}
