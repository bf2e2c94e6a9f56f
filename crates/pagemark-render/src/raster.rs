//! CPU rasterizer for display lists, built on tiny-skia.

use crate::paint::{DisplayItem, DisplayList, Drawable, Layer, TextRun};
use crate::renderer::{RasterError, RasterResult, Renderer};
use crate::text::FontBook;
use kurbo::{Affine, BezPath, Cap, Join, PathEl};
use pagemark_core::color::SerializableColor;
use pagemark_core::pdf::PageImage;
use pagemark_core::shapes::Composite;
use tiny_skia::{
    BlendMode, ColorU8, FillRule, FilterQuality, IntSize, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap,
    PixmapPaint, Rect, Stroke, StrokeDash, Transform,
};

/// Draws display lists into RGBA pixmaps.
pub struct Rasterizer {
    fonts: FontBook,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer {
    /// A rasterizer using the system fonts.
    pub fn new() -> Self {
        Self::with_fonts(FontBook::system())
    }

    pub fn with_fonts(fonts: FontBook) -> Self {
        Self { fonts }
    }

    pub fn fonts(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    fn draw_item(&mut self, pixmap: &mut Pixmap, item: &DisplayItem, transform: Transform) {
        let blend_mode = match item.composite {
            Composite::SourceOver => BlendMode::SourceOver,
            Composite::DestinationOut => BlendMode::DestinationOut,
        };
        match &item.drawable {
            Drawable::Fill { path, color } => {
                if let Some(path) = to_skia_path(path) {
                    let paint = paint(*color, blend_mode);
                    pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
                }
            }
            Drawable::Stroke { path, stroke, color } => {
                if let Some(path) = to_skia_path(path) {
                    let paint = paint(*color, blend_mode);
                    pixmap.stroke_path(&path, &paint, &to_skia_stroke(stroke), transform, None);
                }
            }
            Drawable::Text(run) => self.draw_text(pixmap, run, blend_mode, transform),
            // Drawn by `draw_page` on the base surface.
            Drawable::Page { .. } => {}
        }
    }

    fn draw_text(&mut self, pixmap: &mut Pixmap, run: &TextRun, blend_mode: BlendMode, transform: Transform) {
        let Some(outline) = self.fonts.outline(run) else {
            return;
        };
        let Some(path) = to_skia_path(&outline) else {
            return;
        };
        pixmap.fill_path(&path, &paint(run.fill, blend_mode), FillRule::Winding, transform, None);
        if let Some((stroke, color)) = &run.outline {
            pixmap.stroke_path(&path, &paint(*color, blend_mode), &to_skia_stroke(stroke), transform, None);
        }
    }
}

impl Renderer for Rasterizer {
    type Frame = Pixmap;

    /// Background first, then annotations on their own layer so erasers only
    /// cut into ink, then the overlay on top.
    fn render(&mut self, list: &DisplayList, page: Option<&PageImage>, width: u32, height: u32) -> RasterResult<Pixmap> {
        let mut base = Pixmap::new(width, height).ok_or(RasterError::InvalidSize(width, height))?;
        base.fill(skia_color(list.backdrop));
        let transform = to_skia_transform(list.transform);

        for item in list.layer(Layer::Background) {
            if let Drawable::Page { rect } = &item.drawable {
                draw_page(&mut base, *rect, page, list.transform)?;
            }
        }

        let mut annotations = Pixmap::new(width, height).ok_or(RasterError::InvalidSize(width, height))?;
        for item in list.layer(Layer::Annotations) {
            self.draw_item(&mut annotations, item, transform);
        }
        base.draw_pixmap(
            0,
            0,
            annotations.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );

        for item in list.layer(Layer::Overlay) {
            self.draw_item(&mut base, item, transform);
        }
        Ok(base)
    }
}

fn draw_page(base: &mut Pixmap, rect: kurbo::Rect, page: Option<&PageImage>, transform: Affine) -> RasterResult<()> {
    match page {
        Some(image) => {
            let raster = page_pixmap(image)?;
            let placed = transform
                * Affine::translate(rect.origin().to_vec2())
                * Affine::scale_non_uniform(
                    rect.width() / f64::from(image.width),
                    rect.height() / f64::from(image.height),
                );
            let paint = PixmapPaint {
                quality: FilterQuality::Bilinear,
                ..PixmapPaint::default()
            };
            base.draw_pixmap(0, 0, raster.as_ref(), &paint, to_skia_transform(placed), None);
        }
        None => {
            let Some(bounds) = Rect::from_ltrb(rect.x0 as f32, rect.y0 as f32, rect.x1 as f32, rect.y1 as f32) else {
                return Ok(());
            };
            let white = paint(SerializableColor::white(), BlendMode::SourceOver);
            base.fill_rect(bounds, &white, to_skia_transform(transform), None);
        }
    }
    Ok(())
}

/// Premultiply a straight-alpha page raster.
fn page_pixmap(image: &PageImage) -> RasterResult<Pixmap> {
    let size = IntSize::from_wh(image.width, image.height)
        .ok_or(RasterError::InvalidSize(image.width, image.height))?;
    let data = image
        .pixels
        .chunks_exact(4)
        .flat_map(|px| {
            let c = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    Pixmap::from_vec(data, size).ok_or_else(|| {
        RasterError::InvalidImage(format!(
            "{} bytes for {}x{}",
            image.pixels.len(),
            image.width,
            image.height
        ))
    })
}

fn paint(color: SerializableColor, blend_mode: BlendMode) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint.blend_mode = blend_mode;
    paint
}

fn skia_color(color: SerializableColor) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

pub fn to_skia_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

/// `None` for empty or degenerate paths.
pub fn to_skia_path(path: &BezPath) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p) => pb.quad_to(p1.x as f32, p1.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(p1, p2, p) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

pub fn to_skia_stroke(stroke: &kurbo::Stroke) -> Stroke {
    let line_cap = match stroke.start_cap {
        Cap::Butt => LineCap::Butt,
        Cap::Round => LineCap::Round,
        Cap::Square => LineCap::Square,
    };
    let line_join = match stroke.join {
        Join::Bevel => LineJoin::Bevel,
        Join::Miter => LineJoin::Miter,
        Join::Round => LineJoin::Round,
    };
    let mut intervals: Vec<f32> = stroke.dash_pattern.iter().map(|d| *d as f32).collect();
    // tiny-skia wants an even number of intervals.
    if intervals.len() % 2 == 1 {
        intervals.extend_from_within(..);
    }
    let dash = if intervals.is_empty() {
        None
    } else {
        StrokeDash::new(intervals, stroke.dash_offset as f32)
    };
    Stroke {
        width: stroke.width as f32,
        miter_limit: stroke.miter_limit as f32,
        line_cap,
        line_join,
        dash,
    }
}

/// Straight-alpha RGBA8 bytes.
pub fn to_rgba(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|px| {
            let c = px.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}

/// RGB8 bytes flattened onto white.
pub fn to_rgb(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|px| {
            let under = 255 - px.alpha();
            [
                px.red().saturating_add(under),
                px.green().saturating_add(under),
                px.blue().saturating_add(under),
            ]
        })
        .collect()
}

pub fn encode_png(pixmap: &Pixmap) -> RasterResult<Vec<u8>> {
    let rgba = to_rgba(pixmap);
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RasterError::Encode(format!("PNG header: {}", e)))?;
        writer
            .write_image_data(&rgba)
            .map_err(|e| RasterError::Encode(format!("PNG data: {}", e)))?;
    }
    Ok(png_data)
}
