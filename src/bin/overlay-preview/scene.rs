//! Scene files for the preview tool.
//!
//! A scene is the editor's text nodes, a fixed-pitch layout and a presence
//! snapshot, all camelCase like the presence channel's JSON.

use serde::Deserialize;

use heyocursors::{Collaborator, MonospaceLayout, MonospaceSurface, OverlayResult};

/// Root of a scene file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Text nodes in document order.
    pub text_nodes: Vec<String>,

    #[serde(default)]
    pub layout: MonospaceLayout,

    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
}

impl Scene {
    /// Builds the surface the overlay is measured against.
    pub fn surface(&self) -> OverlayResult<MonospaceSurface> {
        MonospaceSurface::new(self.text_nodes.iter().cloned(), self.layout.clone())
    }

    pub fn text_len(&self) -> usize {
        self.text_nodes.iter().map(|n| n.chars().count()).sum()
    }
}
