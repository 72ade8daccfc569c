//! Builds caret and selection markers for remote collaborators.
//!
//! `OverlayRenderer::render` is a pure function of the collaborator
//! snapshot and the editor surface. It keeps no state between calls;
//! hosts that animate markers diff successive results with
//! [`Overlay::transitions`](super::model::Overlay::transitions).

use std::collections::HashMap;

use tracing::debug;

use super::config::{OverlayConfig, SelectionMode, UnresolvedPolicy};
use super::mapper::{PositionMapper, TextGeometry};
use super::model::{
    CaretLabel, CaretMarker, Collaborator, CollaboratorOverlay, Overlay, Point, Rect,
    SelectionHighlight, TextRange,
};

/// Turns collaborator presence into overlay markers.
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer<G = PositionMapper> {
    geometry: G,
    config: OverlayConfig,
}

impl OverlayRenderer<PositionMapper> {
    /// Creates a renderer backed by the default position mapper.
    pub fn new(config: OverlayConfig) -> Self {
        Self::with_geometry(PositionMapper::new(), config)
    }
}

impl<G> OverlayRenderer<G> {
    /// Creates a renderer backed by a custom geometry provider.
    pub fn with_geometry(geometry: G, config: OverlayConfig) -> Self {
        Self { geometry, config }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: OverlayConfig) {
        self.config = config;
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Renders one overlay pass.
    ///
    /// Returns an empty overlay when `editor` is `None`. Groups follow the
    /// order in which ids first appear in `collaborators`; a repeated id
    /// takes the later entry's data.
    pub fn render<S: ?Sized>(&self, collaborators: &[Collaborator], editor: Option<&S>) -> Overlay
    where
        G: TextGeometry<S>,
    {
        let Some(editor) = editor else {
            debug!(collaborators = collaborators.len(), "no editor surface, overlay empty");
            return Overlay::new();
        };

        let mut pass = Pass {
            geometry: &self.geometry,
            editor,
            points: HashMap::new(),
        };

        let groups: Vec<CollaboratorOverlay> = latest_by_id(collaborators)
            .into_iter()
            .filter(|c| c.has_presence())
            .map(|c| self.render_collaborator(c, &mut pass))
            .filter(|g| !g.is_empty())
            .collect();

        debug!(
            collaborators = collaborators.len(),
            groups = groups.len(),
            lookups = pass.points.len(),
            "rendered overlay"
        );
        Overlay { groups }
    }

    fn render_collaborator<S: ?Sized>(
        &self,
        collaborator: &Collaborator,
        pass: &mut Pass<'_, G, S>,
    ) -> CollaboratorOverlay
    where
        G: TextGeometry<S>,
    {
        let highlights = match collaborator.selection {
            Some(range) => self.selection(collaborator, range, pass),
            None => Vec::new(),
        };
        let caret = collaborator
            .cursor
            .and_then(|cursor| self.caret(collaborator, cursor, pass));

        CollaboratorOverlay {
            id: collaborator.id.clone(),
            name: collaborator.name.clone(),
            color: collaborator.avatar_color.clone(),
            caret,
            highlights,
        }
    }

    fn caret<S: ?Sized>(
        &self,
        collaborator: &Collaborator,
        cursor: TextRange,
        pass: &mut Pass<'_, G, S>,
    ) -> Option<CaretMarker>
    where
        G: TextGeometry<S>,
    {
        let (position, pinned) = match pass.point(cursor.from) {
            Some(point) => (point, false),
            None => match self.config.unresolved {
                UnresolvedPolicy::Hide => return None,
                UnresolvedPolicy::PinOrigin => (Point::origin(), true),
            },
        };

        Some(CaretMarker {
            position,
            width: self.config.caret_width,
            height: self.config.line_height,
            color: collaborator.avatar_color.clone(),
            label: CaretLabel {
                text: collaborator.name.clone(),
                position: Point::new(position.left, position.top - self.config.label_offset),
            },
            z_index: self.config.caret_z_index,
            pinned,
        })
    }

    fn selection<S: ?Sized>(
        &self,
        collaborator: &Collaborator,
        range: TextRange,
        pass: &mut Pass<'_, G, S>,
    ) -> Vec<SelectionHighlight>
    where
        G: TextGeometry<S>,
    {
        let range = range.normalized();
        let rects = match self.config.selection_mode {
            SelectionMode::Approximate => {
                let (Some(start), Some(end)) = (pass.point(range.from), pass.point(range.to)) else {
                    return Vec::new();
                };
                vec![approximate_rect(start, end, self.config.line_height)]
            }
            SelectionMode::PerLine => self
                .geometry
                .resolve_range_rects(Some(pass.editor), range.from, range.to)
                .unwrap_or_default(),
        };

        rects
            .into_iter()
            .map(|rect| SelectionHighlight {
                rect,
                color: collaborator.avatar_color.clone(),
                opacity: self.config.selection_opacity,
                z_index: self.config.selection_z_index,
            })
            .collect()
    }
}

/// Single rectangle covering a selection from `start` to `end`.
///
/// Only exact for selections on one line; multi-line selections get the
/// vertical extent plus one line, anchored at the start's x.
///
/// Callers pass endpoints in document order (`start` resolved from the
/// lower offset); `render` normalizes reversed selections before calling.
pub fn approximate_rect(start: Point, end: Point, line_height: f64) -> Rect {
    Rect::new(
        start.left,
        start.top.min(end.top),
        (end.left - start.left).abs(),
        (end.top - start.top).abs() + line_height,
    )
}

/// Offsets resolved during one render, dropped when it returns.
struct Pass<'a, G, S: ?Sized> {
    geometry: &'a G,
    editor: &'a S,
    points: HashMap<usize, Option<Point>>,
}

impl<G, S: ?Sized> Pass<'_, G, S>
where
    G: TextGeometry<S>,
{
    fn point(&mut self, offset: usize) -> Option<Point> {
        let (geometry, editor) = (self.geometry, self.editor);
        *self
            .points
            .entry(offset)
            .or_insert_with(|| geometry.resolve_offset_to_point(Some(editor), offset))
    }
}

/// Keeps one entry per id: first position, last data.
fn latest_by_id(collaborators: &[Collaborator]) -> Vec<&Collaborator> {
    let mut slots: Vec<&Collaborator> = Vec::with_capacity(collaborators.len());
    let mut index: HashMap<&str, usize> = HashMap::new();
    for collaborator in collaborators {
        match index.get(collaborator.id.as_str()) {
            Some(&slot) => slots[slot] = collaborator,
            None => {
                index.insert(collaborator.id.as_str(), slots.len());
                slots.push(collaborator);
            }
        }
    }
    slots
}
