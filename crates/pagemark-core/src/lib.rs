//! Pagemark Core Library
//!
//! Scene model, history, viewport and tool logic for annotating PDF pages.
//! Rendering lives in `pagemark-render`; PDF rasterization, persistence and
//! uploads are collaborators reached through the traits in [`pdf`] and
//! [`storage`].

pub mod canvas;
pub mod color;
pub mod config;
pub mod event_handler;
pub mod geometry;
pub mod history;
pub mod input;
pub mod pages;
pub mod pdf;
pub mod selection;
pub mod session;
pub mod shapes;
pub mod shortcuts;
pub mod storage;
pub mod style;
pub mod tools;
pub mod viewport;

pub use canvas::{Canvas, CanvasDocument, TextOverlay};
pub use color::{ColorError, Paint, SerializableColor};
pub use config::{ConfigError, EditorConfig};
pub use event_handler::{EventHandler, KeyFocus};
pub use geometry::MeasureUnit;
pub use history::History;
pub use input::{Key, KeyPress, Modifiers};
pub use pages::{PageState, RenderTicket, RenderTracker};
pub use pdf::{PageImage, PdfBackend, PdfHandle, RenderError};
pub use selection::{Handle, HandleKind, ManipulationState};
pub use session::{EditorSession, LoadError, SaveStatus, SessionState};
pub use shapes::{Shape, ShapeId, ShapeKind, ShapePatch, ShapeStyle};
pub use shortcuts::{Shortcut, ShortcutAction, ShortcutRegistry};
pub use storage::{DocumentStatus, DocumentStore, SaveJob, SaveOutcome, StorageError, StoredDocument};
pub use style::DefaultStyle;
pub use tools::{ToolKind, ToolManager};
pub use viewport::Viewport;
