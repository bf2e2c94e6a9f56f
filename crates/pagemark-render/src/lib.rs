//! Pagemark Render Library
//!
//! Turns annotated pages into pixels and PDFs. Shapes are mapped to a
//! [`DisplayList`] first; the bundled CPU [`Rasterizer`] draws it with
//! tiny-skia, and the [`Exporter`] re-renders every page into a new PDF.

pub mod export;
pub mod paint;
pub mod raster;
mod renderer;
pub mod text;

pub use export::{ExportError, ExportedDocument, Exporter, compose_page, encode_jpeg};
pub use paint::{DisplayItem, DisplayList, Drawable, Layer, TextAlign, TextRun, build_display_list, shape_drawables};
pub use raster::{Rasterizer, encode_png, to_rgb, to_rgba};
pub use renderer::{RasterError, RasterResult, RenderContext, Renderer};
pub use text::FontBook;
