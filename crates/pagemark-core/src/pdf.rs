//! Interface to the PDF rasterization service.
//!
//! The engine never parses PDF itself. A host supplies a [`PdfBackend`] that
//! turns document bytes into a handle and pages into RGBA rasters.

pub use crate::storage::BoxFuture;

use kurbo::Size;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RenderError {
    /// A newer request superseded this one. Never shown to the user.
    #[error("Render cancelled")]
    Cancelled,
    #[error("Page {0} out of range")]
    PageOutOfRange(u32),
    #[error("Invalid page image: {0}")]
    InvalidImage(String),
    #[error("Render failed: {0}")]
    Failed(String),
}

impl RenderError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RenderError::Cancelled)
    }
}

/// A loaded PDF document as known to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHandle {
    pub id: Uuid,
    page_count: u32,
}

impl PdfHandle {
    pub fn new(page_count: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            page_count,
        }
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }
}

/// A rasterized page: straight-alpha RGBA8 pixels plus the page's size at 1×.
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub logical_size: Size,
}

impl PageImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>, logical_size: Size) -> Result<Self, RenderError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RenderError::InvalidImage(format!(
                "expected {} bytes for {}x{}, got {}",
                expected,
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
            logical_size,
        })
    }

    /// An opaque white page of `logical_size` rendered at `scale`.
    pub fn blank(logical_size: Size, scale: f64) -> Self {
        let width = (logical_size.width * scale).ceil().max(1.0) as u32;
        let height = (logical_size.height * scale).ceil().max(1.0) as u32;
        Self {
            width,
            height,
            pixels: vec![255; width as usize * height as usize * 4],
            logical_size,
        }
    }

    /// Raster pixels per logical unit.
    pub fn scale(&self) -> f64 {
        if self.logical_size.width > 0.0 {
            self.width as f64 / self.logical_size.width
        } else {
            1.0
        }
    }
}

/// PDF rasterization collaborator.
pub trait PdfBackend {
    fn load_document<'a>(&'a self, bytes: &'a [u8]) -> BoxFuture<'a, Result<PdfHandle, RenderError>>;

    fn page_count(&self, handle: &PdfHandle) -> u32 {
        handle.page_count()
    }

    /// Render 1-based `page` at `scale` times its logical size.
    fn render_page<'a>(
        &'a self,
        handle: &'a PdfHandle,
        page: u32,
        scale: f64,
    ) -> BoxFuture<'a, Result<PageImage, RenderError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_page_dimensions() {
        let image = PageImage::blank(Size::new(100.5, 50.0), 2.0);
        assert_eq!((image.width, image.height), (201, 100));
        assert_eq!(image.pixels.len(), 201 * 100 * 4);
        assert!((image.scale() - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_pixel_length_validated() {
        let err = PageImage::new(2, 2, vec![0; 15], Size::new(2.0, 2.0)).unwrap_err();
        assert!(matches!(err, RenderError::InvalidImage(_)));
        assert!(PageImage::new(2, 2, vec![0; 16], Size::new(2.0, 2.0)).is_ok());
    }

    #[test]
    fn test_cancelled_flag() {
        assert!(RenderError::Cancelled.is_cancelled());
        assert!(!RenderError::Failed("boom".into()).is_cancelled());
    }
}
