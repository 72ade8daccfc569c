//! Collaborator overlay module.
//!
//! Maps logical document offsets to editor coordinates and builds the
//! caret/selection markers drawn for remote collaborators.

pub mod config;
pub mod mapper;
pub mod markup;
pub mod model;
pub mod painter;
pub mod renderer;
pub mod surface;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-exports for convenience
pub use config::{OverlayConfig, SelectionMode, UnresolvedPolicy};
pub use mapper::{PositionMapper, TextGeometry};
pub use markup::render_html;
pub use model::{
    CaretLabel, CaretMarker, Collaborator, CollaboratorOverlay, MarkerKind, Overlay, Point, Rect,
    SelectionHighlight, TextRange, Transition, TransitionPhase,
};
pub use painter::{Layer, MarkerState, PaintTarget, Painter};
pub use renderer::OverlayRenderer;
pub use surface::{Boundary, EditorSurface, MonospaceLayout, MonospaceSurface};

#[cfg(feature = "wasm")]
pub use wasm::{DomPainter, DomSurface, DomTarget, JsCursorOverlay};
