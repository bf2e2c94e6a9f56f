//! Renderer abstraction and per-frame render context.

use crate::paint::DisplayList;
use kurbo::{Affine, Size};
use pagemark_core::canvas::Canvas;
use pagemark_core::color::SerializableColor;
use pagemark_core::pdf::PageImage;
use pagemark_core::shapes::{Shape, ShapeId};
use peniko::Color;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Invalid surface size {0}x{1}")]
    InvalidSize(u32, u32),
    #[error("Invalid page image: {0}")]
    InvalidImage(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
}

pub type RasterResult<T> = Result<T, RasterError>;

/// Everything the paint layer needs to describe one frame of one page.
pub struct RenderContext<'a> {
    /// The whole scene; only shapes of `page` are drawn.
    pub shapes: &'a [Shape],
    pub page: u32,
    /// Logical page size at 1×.
    pub page_size: Size,
    /// Page space to output pixels.
    pub transform: Affine,
    /// Zoom used to keep handles a constant on-screen size.
    pub zoom: f64,
    pub selection: Option<ShapeId>,
    /// Shape ID currently being edited (its overlay draws it instead).
    pub editing_shape_id: Option<ShapeId>,
    /// Color outside the page.
    pub background_color: Color,
    pub selection_color: Color,
    /// Selection outlines, handles and anchors.
    pub show_affordances: bool,
}

impl<'a> RenderContext<'a> {
    pub fn new(shapes: &'a [Shape], page: u32, page_size: Size) -> Self {
        Self {
            shapes,
            page,
            page_size,
            transform: Affine::IDENTITY,
            zoom: 1.0,
            selection: None,
            editing_shape_id: None,
            background_color: Color::from_rgba8(250, 250, 250, 255),
            selection_color: Color::from_rgba8(59, 130, 246, 255), // Blue
            show_affordances: true,
        }
    }

    /// The live view of a canvas: current page, viewport, selection and edit.
    pub fn for_canvas(canvas: &'a Canvas) -> Self {
        Self::new(canvas.document.shapes(), canvas.current_page(), canvas.pages.size())
            .with_transform(canvas.viewport.transform(), canvas.viewport.zoom)
            .with_selection(canvas.selection)
            .with_editing_shape(canvas.editing)
    }

    /// Headless page render at `scale` with no affordances.
    pub fn for_export(shapes: &'a [Shape], page: u32, page_size: Size, scale: f64) -> Self {
        Self::new(shapes, page, page_size)
            .with_transform(Affine::scale(scale), scale)
            .with_background(Color::WHITE)
            .with_affordances(false)
    }

    pub fn with_transform(mut self, transform: Affine, zoom: f64) -> Self {
        self.transform = transform;
        self.zoom = zoom;
        self
    }

    pub fn with_selection(mut self, selection: Option<ShapeId>) -> Self {
        self.selection = selection;
        self
    }

    /// Set the shape ID being edited (will be skipped).
    pub fn with_editing_shape(mut self, shape_id: Option<ShapeId>) -> Self {
        self.editing_shape_id = shape_id;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }

    pub fn with_affordances(mut self, show: bool) -> Self {
        self.show_affordances = show;
        self
    }

    pub fn background(&self) -> SerializableColor {
        SerializableColor::from(self.background_color)
    }

    pub fn selection_color(&self) -> SerializableColor {
        SerializableColor::from(self.selection_color)
    }
}

/// Trait for rendering backends that turn a display list into a frame.
///
/// The bundled implementation is the CPU [`Rasterizer`](crate::Rasterizer);
/// hosts with a GPU surface can provide their own.
pub trait Renderer {
    type Frame;

    /// Draw `list` onto a `width`×`height` surface, with `page` as the
    /// background raster when one is loaded.
    fn render(
        &mut self,
        list: &DisplayList,
        page: Option<&PageImage>,
        width: u32,
        height: u32,
    ) -> RasterResult<Self::Frame>;
}
