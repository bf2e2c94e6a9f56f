//! Page navigation and cancellable page-render requests.

use crate::pdf::{PageImage, PdfBackend, PdfHandle, RenderError};
use kurbo::Size;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Which page is displayed and how large it is at 1× scale.
#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    current: u32,
    count: u32,
    /// Logical size of the displayed page, zero until its first render.
    size: Size,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current: 1,
            count: 1,
            size: Size::ZERO,
        }
    }
}

impl PageState {
    pub fn new(count: u32) -> Self {
        Self {
            count: count.max(1),
            ..Self::default()
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Change the page count, pulling the current page back into range.
    pub fn set_count(&mut self, count: u32) {
        self.count = count.max(1);
        self.current = self.current.min(self.count);
    }

    pub fn contains(&self, page: u32) -> bool {
        (1..=self.count).contains(&page)
    }

    /// Jump to `page`. Out-of-range pages and the current page are ignored.
    pub fn go_to(&mut self, page: u32) -> bool {
        if !self.contains(page) || page == self.current {
            return false;
        }
        self.current = page;
        true
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.current + 1)
    }

    pub fn prev(&mut self) -> bool {
        self.current > 1 && self.go_to(self.current - 1)
    }
}

/// Hands out render tickets. Issuing a ticket invalidates all earlier ones.
#[derive(Debug, Clone, Default)]
pub struct RenderTracker {
    latest: Arc<AtomicU64>,
}

impl RenderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, page: u32, scale: f64) -> RenderTicket {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        RenderTicket {
            page,
            scale,
            generation,
            latest: Arc::clone(&self.latest),
        }
    }

    /// Invalidate every outstanding ticket.
    pub fn cancel_all(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

/// A single page-render request.
#[derive(Debug, Clone)]
pub struct RenderTicket {
    pub page: u32,
    pub scale: f64,
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl RenderTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }
}

/// Render the ticket's page, dropping the result if a newer ticket was issued
/// while the backend was busy.
pub async fn render_ticketed(
    backend: &dyn PdfBackend,
    handle: &PdfHandle,
    ticket: &RenderTicket,
) -> Result<PageImage, RenderError> {
    if !ticket.is_current() {
        return Err(RenderError::Cancelled);
    }
    let image = backend.render_page(handle, ticket.page, ticket.scale).await?;
    if !ticket.is_current() {
        log::debug!(
            "Dropping stale render of page {} (generation {})",
            ticket.page,
            ticket.generation
        );
        return Err(RenderError::Cancelled);
    }
    Ok(image)
}
