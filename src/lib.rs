//! HeyoCursors - Remote collaborator carets and selections over a text editor.
//!
//! Every render pass is computed from scratch out of two inputs:
//!
//! - **Presence**: the latest snapshot of remote collaborators, each with an
//!   optional cursor and/or selection expressed as logical document offsets
//! - **Surface**: the editor whose text leaves are walked to turn offsets into
//!   pixel coordinates relative to the editor's top-left corner
//!
//! Nothing is cached between passes. An offset that cannot be resolved simply
//! produces no marker (or, if configured, a caret pinned to the origin).
//!
//! # Example
//!
//! ```rust
//! use heyocursors::{Collaborator, MonospaceLayout, MonospaceSurface, OverlayConfig, OverlayRenderer};
//!
//! // A fixed-pitch stand-in for the editor DOM
//! let surface = MonospaceSurface::from_text("Hello world", MonospaceLayout::new(8.0, 20.0)).unwrap();
//!
//! let collaborators = vec![
//!     Collaborator::new("u1", "Ada", "#e11d48").with_cursor(5),
//!     Collaborator::new("u2", "Bob", "#2563eb").with_selection(0, 5),
//! ];
//!
//! let renderer = OverlayRenderer::new(OverlayConfig::default());
//! let overlay = renderer.render(&collaborators, Some(&surface));
//!
//! let caret = overlay.group("u1").unwrap().caret.as_ref().unwrap();
//! assert_eq!(caret.position.left, 40.0);
//! ```

pub mod error;

// Overlay module
pub mod overlay;

// Re-exports for convenience
pub use error::{OverlayError, OverlayResult};
pub use overlay::{
    render_html, Collaborator, EditorSurface, MonospaceLayout, MonospaceSurface, Overlay,
    OverlayConfig, OverlayRenderer, Point, PositionMapper, Rect, SelectionMode, TextGeometry,
    TextRange, UnresolvedPolicy,
};

#[cfg(feature = "wasm")]
pub use overlay::JsCursorOverlay;
