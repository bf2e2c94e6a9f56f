//! Headless multi-page export.
//!
//! Every page is re-rendered from the PDF collaborator at the export scale,
//! composited with its annotations and embedded as a JPEG in a new PDF whose
//! pages keep the original logical size.

use crate::paint::build_display_list;
use crate::raster::{Rasterizer, to_rgb};
use crate::renderer::{RasterError, RenderContext, Renderer};
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use kurbo::Size;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use pagemark_core::config::EditorConfig;
use pagemark_core::pdf::{PageImage, PdfBackend, PdfHandle, RenderError};
use pagemark_core::session::EditorSession;
use pagemark_core::shapes::Shape;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use thiserror::Error;
use tiny_skia::Pixmap;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("An export is already running")]
    Busy,
    #[error("No PDF is loaded")]
    NotReady,
    #[error("The document has no pages")]
    NoPages,
    #[error("Page {page} failed to render: {source}")]
    Page {
        page: u32,
        #[source]
        source: RenderError,
    },
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error("PDF assembly failed: {0}")]
    Pdf(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// A finished export, ready to be written.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportedDocument {
    /// Write into `dir` under [`file_name`](Self::file_name), with path
    /// separators and reserved characters replaced so the file stays in `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(safe_file_name(&self.file_name));
        std::fs::write(&path, &self.bytes).map_err(|e| ExportError::Io(e.to_string()))?;
        log::info!("Wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

fn safe_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = cleaned.trim_start_matches('.');
    let dots = cleaned.len() - stem.len();
    let cleaned = format!("{}{}", "_".repeat(dots), stem);
    if cleaned.trim().is_empty() {
        "export.pdf".to_string()
    } else {
        cleaned
    }
}

/// Clears the busy flag when an export ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Exporter {
    busy: AtomicBool,
    done: AtomicU32,
    total: AtomicU32,
    scale: f64,
    jpeg_quality: u8,
    rasterizer: Mutex<Rasterizer>,
}

impl Exporter {
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_rasterizer(config, Rasterizer::new())
    }

    pub fn with_rasterizer(config: &EditorConfig, rasterizer: Rasterizer) -> Self {
        Self {
            busy: AtomicBool::new(false),
            done: AtomicU32::new(0),
            total: AtomicU32::new(0),
            scale: config.export_render_scale,
            jpeg_quality: config.export_jpeg_quality.clamp(1, 100),
            rasterizer: Mutex::new(rasterizer),
        }
    }

    fn begin(&self) -> Result<BusyGuard<'_>, ExportError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::Busy)?;
        Ok(BusyGuard(&self.busy))
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// `(pages_done, total)` of the running or last export.
    pub fn progress(&self) -> (u32, u32) {
        (self.done.load(Ordering::Acquire), self.total.load(Ordering::Acquire))
    }

    /// Export every page of `handle` with `shapes` composited on top.
    ///
    /// Any page failure aborts the whole export.
    pub async fn export(
        &self,
        backend: &dyn PdfBackend,
        handle: Option<&PdfHandle>,
        shapes: &[Shape],
        name: &str,
    ) -> Result<ExportedDocument, ExportError> {
        let _guard = self.begin()?;
        let handle = handle.ok_or(ExportError::NotReady)?;
        let total = backend.page_count(handle);
        if total == 0 {
            return Err(ExportError::NoPages);
        }
        self.done.store(0, Ordering::Release);
        self.total.store(total, Ordering::Release);
        log::info!("Exporting {} pages as {}.pdf", total, name);

        let mut assembler = PdfAssembler::new(name);
        for page in 1..=total {
            let image = backend
                .render_page(handle, page, self.scale)
                .await
                .map_err(|source| ExportError::Page { page, source })?;

            let composite = {
                let mut rasterizer = self.rasterizer.lock().unwrap_or_else(|p| p.into_inner());
                compose_page(&mut *rasterizer, shapes, page, &image)?
            };
            let jpeg = encode_jpeg(&composite, self.jpeg_quality)?;
            assembler.add_page(image.logical_size, composite.width(), composite.height(), jpeg)?;

            self.done.store(page, Ordering::Release);
            log::info!("Exported page {}/{}", page, total);
        }

        Ok(ExportedDocument {
            file_name: format!("{}.pdf", name),
            bytes: assembler.finish()?,
        })
    }

    /// Export the session's document under `name`, or its default export name.
    ///
    /// The scene, PDF handle and backend are captured up front, so the
    /// session stays free for editing while the export runs.
    pub fn export_session<'a>(
        &'a self,
        session: &EditorSession,
        name: Option<&str>,
    ) -> impl Future<Output = Result<ExportedDocument, ExportError>> + use<'a> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| session.default_export_name());
        let backend = session.shared_backend();
        let handle = session.pdf_handle().clone();
        let shapes = session.canvas.document.shapes().to_vec();
        async move { self.export(backend.as_ref(), Some(&handle), &shapes, &name).await }
    }
}

/// Page raster with the page's visible annotations, at the raster's size.
pub fn compose_page<R: Renderer<Frame = Pixmap>>(
    renderer: &mut R,
    shapes: &[Shape],
    page: u32,
    image: &PageImage,
) -> Result<Pixmap, RasterError> {
    let ctx = RenderContext::for_export(shapes, page, image.logical_size, image.scale());
    let list = build_display_list(&ctx);
    renderer.render(&list, Some(image), image.width, image.height)
}

pub fn encode_jpeg(pixmap: &Pixmap, quality: u8) -> Result<Vec<u8>, RasterError> {
    let rgb = to_rgb(pixmap);
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode(&rgb, pixmap.width(), pixmap.height(), ExtendedColorType::Rgb8)
        .map_err(|e| RasterError::Encode(format!("JPEG: {}", e)))?;
    Ok(buf)
}

/// Builds a PDF of full-page images.
struct PdfAssembler {
    doc: Document,
    pages_id: ObjectId,
    pages: Vec<Object>,
    title: String,
}

impl PdfAssembler {
    fn new(title: &str) -> Self {
        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            pages: Vec::new(),
            title: title.to_string(),
        }
    }

    /// Append a page of `size` points showing the JPEG stretched edge to edge.
    fn add_page(&mut self, size: Size, width: u32, height: u32, jpeg: Vec<u8>) -> Result<(), ExportError> {
        let w = size.width as f32;
        let h = size.height as f32;

        let image_id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        ));

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![w.into(), 0.into(), 0.into(), h.into(), 0.into(), 0.into()],
                ),
                Operation::new("Do", vec![Object::Name(b"Im1".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content.encode().map_err(|e| ExportError::Pdf(e.to_string()))?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), w.into(), h.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im1" => image_id,
                },
            },
        });
        self.pages.push(page_id.into());
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>, ExportError> {
        let count = self.pages.len() as i64;
        self.doc.set_object(
            self.pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => self.pages,
                "Count" => count,
            },
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        let info_id = self.doc.add_object(dictionary! {
            "Title" => Object::string_literal(self.title),
            "Producer" => Object::string_literal("Pagemark"),
        });
        self.doc.trailer.set("Info", info_id);

        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        Ok(buffer)
    }
}
