//! Data models for collaborator presence and the rendered overlay.
//!
//! Inputs (`Collaborator`, `TextRange`) use the camelCase JSON shape the
//! presence channel sends. Outputs (`Overlay` and its markers) are plain
//! values; painting them is left to the host.

use serde::{Deserialize, Serialize};

// =============================================================================
// GEOMETRY
// =============================================================================

/// A position in CSS pixels, relative to the editor's top-left corner.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub left: f64,
    pub top: f64,
}

impl Point {
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }

    /// The editor's top-left corner.
    pub fn origin() -> Self {
        Self::default()
    }
}

/// An axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Top-left corner as a point.
    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Returns this rect shifted so that `origin` becomes (0, 0).
    pub fn relative_to(&self, origin: Point) -> Self {
        Self {
            left: self.left - origin.left,
            top: self.top - origin.top,
            ..*self
        }
    }

    /// True if the rect covers no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

// =============================================================================
// PRESENCE INPUT
// =============================================================================

/// A pair of logical document offsets.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextRange {
    pub from: usize,
    pub to: usize,
}

impl TextRange {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// A collapsed range at `offset`.
    pub fn caret(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Returns the range with `from <= to`.
    pub fn normalized(&self) -> Self {
        if self.from <= self.to {
            *self
        } else {
            Self::new(self.to, self.from)
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.from == self.to
    }
}

/// A remote user in the same editing session.
///
/// Cursor and selection are independent: either, both or neither may be
/// present in any snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    /// Stable identifier, unique per connected user.
    pub id: String,

    /// Display label shown above the caret.
    pub name: String,

    /// Color token used for the caret and the highlight tint.
    pub avatar_color: String,

    /// Caret position; only `from` is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<TextRange>,

    /// Highlighted range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<TextRange>,
}

impl Collaborator {
    /// Creates a collaborator with no cursor and no selection.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        avatar_color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar_color: avatar_color.into(),
            cursor: None,
            selection: None,
        }
    }

    /// Builder: Set the caret at `offset`.
    pub fn with_cursor(mut self, offset: usize) -> Self {
        self.cursor = Some(TextRange::caret(offset));
        self
    }

    /// Builder: Set the selection.
    pub fn with_selection(mut self, from: usize, to: usize) -> Self {
        self.selection = Some(TextRange::new(from, to));
        self
    }

    /// True if there is anything to draw for this collaborator.
    pub fn has_presence(&self) -> bool {
        self.cursor.is_some() || self.selection.is_some()
    }
}

// =============================================================================
// OVERLAY OUTPUT
// =============================================================================

/// Name tag drawn just above a caret.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaretLabel {
    pub text: String,
    pub position: Point,
}

/// Thin vertical bar marking a remote insertion point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaretMarker {
    /// Top-left of the bar.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub label: CaretLabel,
    pub z_index: i32,
    /// The offset did not resolve and the marker was pinned to the origin.
    pub pinned: bool,
}

/// Translucent rectangle over a remote selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SelectionHighlight {
    pub rect: Rect,
    pub color: String,
    pub opacity: f64,
    pub z_index: i32,
}

/// All markers drawn for one collaborator, keyed by their id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorOverlay {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caret: Option<CaretMarker>,
    #[serde(default)]
    pub highlights: Vec<SelectionHighlight>,
}

impl CollaboratorOverlay {
    /// True if neither a caret nor a highlight was produced.
    pub fn is_empty(&self) -> bool {
        self.caret.is_none() && self.highlights.is_empty()
    }
}

/// Result of one render pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Overlay {
    pub groups: Vec<CollaboratorOverlay>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Gets a group by collaborator id.
    pub fn group(&self, id: &str) -> Option<&CollaboratorOverlay> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Compares this overlay with the one painted before it.
    ///
    /// Entering and updated markers are listed in this overlay's order,
    /// followed by the markers that disappeared, in `previous` order.
    pub fn transitions(&self, previous: &Overlay) -> Vec<Transition> {
        let mut out = Vec::new();

        for group in &self.groups {
            let before = previous.group(&group.id);
            for kind in [MarkerKind::Selection, MarkerKind::Caret] {
                if !kind.present_in(group) {
                    continue;
                }
                let phase = match before {
                    Some(prev) if kind.present_in(prev) => {
                        if kind.same_in(prev, group) {
                            continue;
                        }
                        TransitionPhase::Update
                    }
                    _ => TransitionPhase::Enter,
                };
                out.push(Transition::new(&group.id, kind, phase));
            }
        }

        for prev in &previous.groups {
            let now = self.group(&prev.id);
            for kind in [MarkerKind::Selection, MarkerKind::Caret] {
                if kind.present_in(prev) && !now.map(|g| kind.present_in(g)).unwrap_or(false) {
                    out.push(Transition::new(&prev.id, kind, TransitionPhase::Exit));
                }
            }
        }

        out
    }
}

// =============================================================================
// TRANSITIONS
// =============================================================================

/// Which part of a collaborator's group a transition refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum MarkerKind {
    Caret,
    Selection,
}

impl MarkerKind {
    fn present_in(&self, group: &CollaboratorOverlay) -> bool {
        match self {
            MarkerKind::Caret => group.caret.is_some(),
            MarkerKind::Selection => !group.highlights.is_empty(),
        }
    }

    fn same_in(&self, a: &CollaboratorOverlay, b: &CollaboratorOverlay) -> bool {
        match self {
            MarkerKind::Caret => a.caret == b.caret,
            MarkerKind::Selection => a.highlights == b.highlights,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TransitionPhase {
    /// First frame the marker is drawn: fade/scale in.
    Enter,
    /// Marker moved or restyled: update in place.
    Update,
    /// Marker no longer drawn: fade out.
    Exit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub id: String,
    pub kind: MarkerKind,
    pub phase: TransitionPhase,
}

impl Transition {
    pub fn new(id: impl Into<String>, kind: MarkerKind, phase: TransitionPhase) -> Self {
        Self {
            id: id.into(),
            kind,
            phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caret_at(left: f64) -> CaretMarker {
        CaretMarker {
            position: Point::new(left, 0.0),
            width: 2.0,
            height: 20.0,
            color: "#f00".to_string(),
            label: CaretLabel {
                text: "Ada".to_string(),
                position: Point::new(left, -18.0),
            },
            z_index: 20,
            pinned: false,
        }
    }

    fn group(id: &str, caret: Option<CaretMarker>) -> CollaboratorOverlay {
        CollaboratorOverlay {
            id: id.to_string(),
            name: "Ada".to_string(),
            color: "#f00".to_string(),
            caret,
            highlights: Vec::new(),
        }
    }

    #[test]
    fn test_collaborator_json_shape() {
        let json = r##"{
            "id": "u1",
            "name": "Ada",
            "avatarColor": "#e11d48",
            "cursor": {"from": 5, "to": 7}
        }"##;
        let collaborator: Collaborator = serde_json::from_str(json).unwrap();
        assert_eq!(collaborator.avatar_color, "#e11d48");
        assert_eq!(collaborator.cursor, Some(TextRange::new(5, 7)));
        assert_eq!(collaborator.selection, None);
        assert!(collaborator.has_presence());
    }

    #[test]
    fn test_collaborator_builder() {
        let c = Collaborator::new("u1", "Ada", "red")
            .with_cursor(3)
            .with_selection(1, 4);
        assert_eq!(c.cursor, Some(TextRange::caret(3)));
        assert_eq!(c.selection, Some(TextRange::new(1, 4)));
        assert!(!Collaborator::new("u2", "Bob", "blue").has_presence());
    }

    #[test]
    fn test_range_normalized() {
        assert_eq!(TextRange::new(9, 2).normalized(), TextRange::new(2, 9));
        assert_eq!(TextRange::new(2, 9).normalized(), TextRange::new(2, 9));
        assert!(TextRange::caret(4).is_collapsed());
    }

    #[test]
    fn test_rect_relative_to() {
        let rect = Rect::new(110.0, 45.0, 0.0, 20.0).relative_to(Point::new(100.0, 40.0));
        assert_eq!(rect, Rect::new(10.0, 5.0, 0.0, 20.0));
        assert!(rect.is_empty());
    }

    #[test]
    fn test_transitions_enter_update_exit() {
        let previous = Overlay {
            groups: vec![group("a", Some(caret_at(0.0))), group("b", Some(caret_at(5.0)))],
        };
        let current = Overlay {
            groups: vec![group("a", Some(caret_at(8.0))), group("c", Some(caret_at(1.0)))],
        };

        let transitions = current.transitions(&previous);
        assert_eq!(
            transitions,
            vec![
                Transition::new("a", MarkerKind::Caret, TransitionPhase::Update),
                Transition::new("c", MarkerKind::Caret, TransitionPhase::Enter),
                Transition::new("b", MarkerKind::Caret, TransitionPhase::Exit),
            ]
        );
    }

    fn highlight_at(left: f64) -> SelectionHighlight {
        SelectionHighlight {
            rect: Rect::new(left, 0.0, 40.0, 20.0),
            color: "#f00".to_string(),
            opacity: 0.3,
            z_index: 10,
        }
    }

    fn group_with(id: &str, caret: Option<CaretMarker>, highlight: Option<SelectionHighlight>) -> CollaboratorOverlay {
        CollaboratorOverlay {
            highlights: highlight.into_iter().collect(),
            ..group(id, caret)
        }
    }

    #[test]
    fn test_transitions_partial_exit() {
        let both = Overlay {
            groups: vec![group_with("a", Some(caret_at(8.0)), Some(highlight_at(0.0)))],
        };
        let selection_only = Overlay {
            groups: vec![group_with("a", None, Some(highlight_at(0.0)))],
        };
        let cursor_only = Overlay {
            groups: vec![group_with("a", Some(caret_at(8.0)), None)],
        };

        assert_eq!(
            selection_only.transitions(&both),
            vec![Transition::new("a", MarkerKind::Caret, TransitionPhase::Exit)]
        );
        assert_eq!(
            cursor_only.transitions(&selection_only),
            vec![
                Transition::new("a", MarkerKind::Caret, TransitionPhase::Enter),
                Transition::new("a", MarkerKind::Selection, TransitionPhase::Exit),
            ]
        );
    }

    #[test]
    fn test_transitions_selection_moved() {
        let before = Overlay {
            groups: vec![group_with("a", Some(caret_at(8.0)), Some(highlight_at(0.0)))],
        };
        let after = Overlay {
            groups: vec![group_with("a", Some(caret_at(8.0)), Some(highlight_at(16.0)))],
        };
        assert_eq!(
            after.transitions(&before),
            vec![Transition::new("a", MarkerKind::Selection, TransitionPhase::Update)]
        );

        let fresh = Overlay {
            groups: vec![group_with("b", None, Some(highlight_at(0.0)))],
        };
        assert_eq!(
            fresh.transitions(&Overlay::new()),
            vec![Transition::new("b", MarkerKind::Selection, TransitionPhase::Enter)]
        );
    }

    #[test]
    fn test_transitions_unchanged_is_silent() {
        let overlay = Overlay {
            groups: vec![group("a", Some(caret_at(3.0)))],
        };
        assert!(overlay.transitions(&overlay.clone()).is_empty());
    }
}
