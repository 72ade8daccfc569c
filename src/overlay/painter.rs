//! Keyed painting of overlay markers.
//!
//! `Painter` turns successive overlays into create/restyle/remove calls on
//! a [`PaintTarget`], keeping one set of nodes per collaborator id and
//! marker kind so markers move in place instead of being re-created.
//! The browser target lives in `wasm.rs`.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::markup::{caret_style, label_style, selection_style};
use super::model::{CollaboratorOverlay, MarkerKind, Overlay, Transition, TransitionPhase};
use crate::error::{OverlayError, OverlayResult};

/// One positioned element to keep on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub class: String,
    pub style: String,
    pub text: Option<String>,
}

/// Animation state written on every painted node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    Entering,
    Active,
    Exiting,
}

impl MarkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerState::Entering => "entering",
            MarkerState::Active => "active",
            MarkerState::Exiting => "exiting",
        }
    }
}

/// Where marker nodes are created and styled.
pub trait PaintTarget {
    type Node: Clone;

    /// Creates and attaches an empty node for collaborator `id`.
    fn create(&mut self, id: &str) -> OverlayResult<Self::Node>;

    fn apply(&mut self, node: &Self::Node, layer: &Layer) -> OverlayResult<()>;

    fn set_state(&mut self, node: &Self::Node, state: MarkerState) -> OverlayResult<()>;

    fn remove(&mut self, node: &Self::Node);
}

/// Applies overlay transitions to a target, keyed by collaborator id.
///
/// Entering nodes carry [`MarkerState::Entering`] for one paint. Exiting
/// nodes carry [`MarkerState::Exiting`] until the next paint or an explicit
/// [`flush_exiting`](Painter::flush_exiting).
pub struct Painter<T: PaintTarget> {
    target: T,
    prefix: String,
    markers: HashMap<(String, MarkerKind), Vec<T::Node>>,
    entering: Vec<T::Node>,
    retiring: Vec<T::Node>,
    previous: Overlay,
}

impl<T: PaintTarget> Painter<T> {
    pub fn new(target: T, prefix: impl Into<String>) -> Self {
        Self {
            target,
            prefix: prefix.into(),
            markers: HashMap::new(),
            entering: Vec::new(),
            retiring: Vec::new(),
            previous: Overlay::new(),
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// Nodes still fading out.
    pub fn exiting_len(&self) -> usize {
        self.retiring.len()
    }

    /// Brings the target in line with `overlay` and returns what changed.
    ///
    /// The whole pass is applied even if some target calls fail; the first
    /// failure is returned afterwards. `overlay` becomes the baseline for
    /// the next paint either way.
    pub fn paint(&mut self, overlay: &Overlay) -> OverlayResult<Vec<Transition>> {
        let mut failure = None;

        self.flush_exiting();
        for node in std::mem::take(&mut self.entering) {
            record(&mut failure, self.target.set_state(&node, MarkerState::Active));
        }

        let transitions = overlay.transitions(&self.previous);
        self.previous = overlay.clone();

        for transition in &transitions {
            let key = (transition.id.clone(), transition.kind);
            match transition.phase {
                TransitionPhase::Exit => {
                    for node in self.markers.remove(&key).unwrap_or_default() {
                        record(&mut failure, self.target.set_state(&node, MarkerState::Exiting));
                        self.retiring.push(node);
                    }
                }
                TransitionPhase::Enter | TransitionPhase::Update => {
                    let Some(group) = overlay.group(&transition.id) else {
                        continue;
                    };
                    let wanted = layers(&self.prefix, group, transition.kind);
                    let created = self.sync(key, &transition.id, &wanted, &mut failure);
                    if transition.phase == TransitionPhase::Enter {
                        for node in created {
                            record(&mut failure, self.target.set_state(&node, MarkerState::Entering));
                            self.entering.push(node);
                        }
                    }
                }
            }
        }

        debug!(transitions = transitions.len(), exiting = self.retiring.len(), "painted overlay");
        match failure {
            Some(err) => Err(err),
            None => Ok(transitions),
        }
    }

    /// Removes nodes that are fading out. Hosts call this once their exit
    /// animation ends; the next paint does it otherwise.
    pub fn flush_exiting(&mut self) {
        for node in self.retiring.drain(..) {
            self.target.remove(&node);
        }
    }

    /// Removes every node this painter created.
    pub fn clear(&mut self) {
        let nodes: Vec<T::Node> = self
            .markers
            .drain()
            .flat_map(|(_, nodes)| nodes)
            .chain(self.retiring.drain(..))
            .collect();
        for node in &nodes {
            self.target.remove(node);
        }
        self.entering.clear();
        self.previous = Overlay::new();
    }

    /// Restyles the nodes under `key`, adding or removing as needed.
    /// Returns the nodes created by this call.
    fn sync(
        &mut self,
        key: (String, MarkerKind),
        id: &str,
        layers: &[Layer],
        failure: &mut Option<OverlayError>,
    ) -> Vec<T::Node> {
        let nodes = self.markers.entry(key).or_default();
        let mut created = Vec::new();

        while nodes.len() > layers.len() {
            if let Some(node) = nodes.pop() {
                self.target.remove(&node);
            }
        }
        while nodes.len() < layers.len() {
            match self.target.create(id) {
                Ok(node) => {
                    created.push(node.clone());
                    nodes.push(node);
                }
                Err(err) => {
                    record(failure, Err(err));
                    break;
                }
            }
        }

        for (node, layer) in nodes.iter().zip(layers) {
            record(failure, self.target.apply(node, layer));
        }
        created
    }
}

/// Keeps the first error of a pass.
fn record(failure: &mut Option<OverlayError>, result: OverlayResult<()>) {
    if let Err(err) = result {
        warn!(error = %err, "paint step failed");
        failure.get_or_insert(err);
    }
}

/// Layers drawn for one marker kind of a group.
pub fn layers(prefix: &str, group: &CollaboratorOverlay, kind: MarkerKind) -> Vec<Layer> {
    match kind {
        MarkerKind::Selection => group
            .highlights
            .iter()
            .map(|highlight| Layer {
                class: format!("{prefix}-selection"),
                style: selection_style(highlight),
                text: None,
            })
            .collect(),
        MarkerKind::Caret => group
            .caret
            .iter()
            .flat_map(|caret| {
                [
                    Layer {
                        class: format!("{prefix}-caret"),
                        style: caret_style(caret),
                        text: None,
                    },
                    Layer {
                        class: format!("{prefix}-label"),
                        style: label_style(caret),
                        text: Some(caret.label.text.clone()),
                    },
                ]
            })
            .collect(),
    }
}
