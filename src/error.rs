//! Error types for offset resolution and overlay rendering.

use thiserror::Error;

/// Result type alias for overlay operations.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Errors that can occur while measuring an editor surface.
///
/// None of these reach the end user: the mapper turns them into an
/// unresolved position and the renderer skips the marker.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OverlayError {
    /// A text leaf is no longer attached to the editor.
    #[error("Detached node: {0}")]
    Detached(String),

    /// Local offset past the end of a text leaf.
    #[error("Offset {offset} out of range for text of length {length}")]
    OffsetOutOfRange { offset: usize, length: usize },

    /// The surface could not produce a rectangle for a range.
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// Layout parameters are unusable (zero line height, bad opacity, ...).
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A DOM call threw.
    #[error("DOM error: {0}")]
    Dom(String),
}

impl OverlayError {
    /// Creates a Detached error.
    pub fn detached(msg: impl Into<String>) -> Self {
        Self::Detached(msg.into())
    }

    /// Creates an OffsetOutOfRange error.
    pub fn offset_out_of_range(offset: usize, length: usize) -> Self {
        Self::OffsetOutOfRange { offset, length }
    }

    /// Creates a Geometry error.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Creates an InvalidLayout error.
    pub fn invalid_layout(msg: impl Into<String>) -> Self {
        Self::InvalidLayout(msg.into())
    }

    /// Creates a Serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates a Dom error.
    pub fn dom(msg: impl Into<String>) -> Self {
        Self::Dom(msg.into())
    }
}

impl From<serde_json::Error> for OverlayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
