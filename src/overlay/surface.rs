//! Editor surfaces: the text-geometry seam the position mapper walks.
//!
//! A surface exposes its text-bearing leaves in document order and can
//! measure a collapsed range inside one of them. The mapper owns the
//! offset arithmetic; a surface only knows how to measure.
//!
//! `MonospaceSurface` is a fixed-pitch layout with no DOM behind it. The
//! browser implementation lives in `wasm.rs`.

use serde::{Deserialize, Serialize};

use super::model::{Point, Rect};
use crate::error::{OverlayError, OverlayResult};

/// A position inside one text leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary<L> {
    pub leaf: L,
    /// Index of the leaf in document order.
    pub leaf_index: usize,
    /// Offset within the leaf, never greater than its length.
    pub offset: usize,
}

/// Something laid out on screen whose text can be measured.
///
/// Implementations must not hand out leaves that outlive one lookup: the
/// mapper calls `text_leaves` again for every offset it resolves.
pub trait EditorSurface {
    /// Handle to a text-bearing leaf node.
    type Leaf;

    /// Text leaves in depth-first document order.
    fn text_leaves(&self) -> OverlayResult<Vec<Self::Leaf>>;

    /// Length of a leaf in logical offset units.
    fn leaf_len(&self, leaf: &Self::Leaf) -> OverlayResult<usize>;

    /// Viewport rectangle of a collapsed range at `offset` inside `leaf`.
    fn caret_rect(&self, leaf: &Self::Leaf, offset: usize) -> OverlayResult<Rect>;

    /// Viewport rectangles of every line box touched by `start..end`.
    fn range_rects(
        &self,
        start: &Boundary<Self::Leaf>,
        end: &Boundary<Self::Leaf>,
    ) -> OverlayResult<Vec<Rect>>;

    /// Viewport rectangle of the editor itself.
    fn bounding_rect(&self) -> OverlayResult<Rect>;
}

// =============================================================================
// MONOSPACE SURFACE
// =============================================================================

/// Fixed-pitch layout parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonospaceLayout {
    /// Advance of every character, in pixels.
    pub char_width: f64,

    /// Height of every line, in pixels.
    pub line_height: f64,

    /// Soft-wrap after this many columns; `None` never wraps.
    #[serde(default)]
    pub wrap_columns: Option<usize>,

    /// Editor top-left in viewport coordinates.
    #[serde(default)]
    pub origin: Point,

    /// Inset of the text from the editor's top-left.
    #[serde(default)]
    pub padding: Point,
}

impl Default for MonospaceLayout {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 20.0,
            wrap_columns: None,
            origin: Point::origin(),
            padding: Point::origin(),
        }
    }
}

impl MonospaceLayout {
    pub fn new(char_width: f64, line_height: f64) -> Self {
        Self {
            char_width,
            line_height,
            ..Self::default()
        }
    }

    /// Builder: Set the wrap column.
    pub fn with_wrap_columns(mut self, columns: usize) -> Self {
        self.wrap_columns = Some(columns);
        self
    }

    /// Builder: Set the viewport origin.
    pub fn with_origin(mut self, left: f64, top: f64) -> Self {
        self.origin = Point::new(left, top);
        self
    }

    /// Builder: Set the text inset.
    pub fn with_padding(mut self, left: f64, top: f64) -> Self {
        self.padding = Point::new(left, top);
        self
    }

    fn validate(&self) -> OverlayResult<()> {
        if self.char_width.is_nan() || self.char_width <= 0.0 {
            return Err(OverlayError::invalid_layout(format!(
                "char width must be positive, got {}",
                self.char_width
            )));
        }
        if self.line_height.is_nan() || self.line_height <= 0.0 {
            return Err(OverlayError::invalid_layout(format!(
                "line height must be positive, got {}",
                self.line_height
            )));
        }
        if self.wrap_columns == Some(0) {
            return Err(OverlayError::invalid_layout("wrap columns must be at least 1"));
        }
        Ok(())
    }
}

/// Text nodes laid out on a fixed-pitch grid.
///
/// Offsets count Unicode scalar values. `'\n'` starts a new line and
/// occupies no cell.
#[derive(Debug, Clone, PartialEq)]
pub struct MonospaceSurface {
    nodes: Vec<String>,
    layout: MonospaceLayout,
}

impl MonospaceSurface {
    /// Creates a surface from text nodes in document order.
    pub fn new<I, S>(nodes: I, layout: MonospaceLayout) -> OverlayResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        layout.validate()?;
        Ok(Self {
            nodes: nodes.into_iter().map(Into::into).collect(),
            layout,
        })
    }

    /// Creates a surface holding a single text node.
    pub fn from_text(text: impl Into<String>, layout: MonospaceLayout) -> OverlayResult<Self> {
        Self::new([text.into()], layout)
    }

    pub fn layout(&self) -> &MonospaceLayout {
        &self.layout
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Total length of all text nodes.
    pub fn text_len(&self) -> usize {
        self.nodes.iter().map(|n| n.chars().count()).sum()
    }

    fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.nodes.iter().flat_map(|n| n.chars())
    }

    fn global_offset(&self, leaf: usize, offset: usize) -> OverlayResult<usize> {
        let node = self
            .nodes
            .get(leaf)
            .ok_or_else(|| OverlayError::detached(format!("text node {leaf}")))?;
        let length = node.chars().count();
        if offset > length {
            return Err(OverlayError::offset_out_of_range(offset, length));
        }
        let before: usize = self.nodes[..leaf].iter().map(|n| n.chars().count()).sum();
        Ok(before + offset)
    }

    fn wraps_at(&self, column: usize) -> bool {
        matches!(self.layout.wrap_columns, Some(wrap) if column >= wrap)
    }

    /// Line and column of the caret sitting before character `index`.
    fn line_position(&self, index: usize) -> (usize, usize) {
        let (mut row, mut col) = (0, 0);
        for ch in self.chars().take(index) {
            if ch == '\n' {
                row += 1;
                col = 0;
                continue;
            }
            if self.wraps_at(col) {
                row += 1;
                col = 0;
            }
            col += 1;
        }
        (row, col)
    }

    /// Cells occupied by characters in `start..end`, as (row, col).
    fn cells(&self, start: usize, end: usize) -> Vec<(usize, usize)> {
        let (mut row, mut col) = (0, 0);
        let mut cells = Vec::new();
        for (index, ch) in self.chars().enumerate().take(end) {
            if ch == '\n' {
                row += 1;
                col = 0;
                continue;
            }
            if self.wraps_at(col) {
                row += 1;
                col = 0;
            }
            if index >= start {
                cells.push((row, col));
            }
            col += 1;
        }
        cells
    }

    fn cell_rect(&self, row: usize, col: usize, columns: usize) -> Rect {
        let layout = &self.layout;
        Rect::new(
            layout.origin.left + layout.padding.left + col as f64 * layout.char_width,
            layout.origin.top + layout.padding.top + row as f64 * layout.line_height,
            columns as f64 * layout.char_width,
            layout.line_height,
        )
    }
}

impl EditorSurface for MonospaceSurface {
    type Leaf = usize;

    fn text_leaves(&self) -> OverlayResult<Vec<usize>> {
        Ok((0..self.nodes.len()).collect())
    }

    fn leaf_len(&self, leaf: &usize) -> OverlayResult<usize> {
        self.nodes
            .get(*leaf)
            .map(|n| n.chars().count())
            .ok_or_else(|| OverlayError::detached(format!("text node {leaf}")))
    }

    fn caret_rect(&self, leaf: &usize, offset: usize) -> OverlayResult<Rect> {
        let index = self.global_offset(*leaf, offset)?;
        let (row, col) = self.line_position(index);
        Ok(self.cell_rect(row, col, 0))
    }

    fn range_rects(&self, start: &Boundary<usize>, end: &Boundary<usize>) -> OverlayResult<Vec<Rect>> {
        let a = self.global_offset(start.leaf, start.offset)?;
        let b = self.global_offset(end.leaf, end.offset)?;
        let (a, b) = if a <= b { (a, b) } else { (b, a) };

        // (row, first col, last col) per line, in order
        let mut lines: Vec<(usize, usize, usize)> = Vec::new();
        for (row, col) in self.cells(a, b) {
            match lines.last_mut() {
                Some(line) if line.0 == row => line.2 = col,
                _ => lines.push((row, col, col)),
            }
        }

        Ok(lines
            .into_iter()
            .map(|(row, first, last)| self.cell_rect(row, first, last - first + 1))
            .collect())
    }

    fn bounding_rect(&self) -> OverlayResult<Rect> {
        let layout = &self.layout;
        let (rows, widest) = self.cells(0, self.text_len()).iter().fold(
            (1, 0),
            |(rows, widest), &(row, col)| (rows.max(row + 1), widest.max(col + 1)),
        );
        let columns = layout.wrap_columns.unwrap_or(widest);
        Ok(Rect::new(
            layout.origin.left,
            layout.origin.top,
            columns as f64 * layout.char_width + 2.0 * layout.padding.left,
            rows as f64 * layout.line_height + 2.0 * layout.padding.top,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundary(leaf: usize, offset: usize) -> Boundary<usize> {
        Boundary {
            leaf,
            leaf_index: leaf,
            offset,
        }
    }

    #[test]
    fn test_layout_validation() {
        assert!(MonospaceSurface::from_text("x", MonospaceLayout::new(0.0, 20.0)).is_err());
        assert!(MonospaceSurface::from_text("x", MonospaceLayout::new(8.0, -1.0)).is_err());
        assert!(MonospaceSurface::from_text("x", MonospaceLayout::new(f64::NAN, 20.0)).is_err());
        assert!(MonospaceSurface::from_text("x", MonospaceLayout::new(8.0, f64::NAN)).is_err());
        assert!(
            MonospaceSurface::from_text("x", MonospaceLayout::new(8.0, 20.0).with_wrap_columns(0))
                .is_err()
        );
    }

    #[test]
    fn test_caret_rect_in_viewport_coordinates() {
        let layout = MonospaceLayout::new(10.0, 20.0).with_origin(100.0, 50.0);
        let surface = MonospaceSurface::new(["Hello", " world"], layout).unwrap();

        assert_eq!(surface.caret_rect(&0, 0).unwrap(), Rect::new(100.0, 50.0, 0.0, 20.0));
        assert_eq!(surface.caret_rect(&1, 1).unwrap(), Rect::new(160.0, 50.0, 0.0, 20.0));
        assert_eq!(
            surface.caret_rect(&0, 6),
            Err(OverlayError::offset_out_of_range(6, 5))
        );
        assert!(matches!(surface.caret_rect(&7, 0), Err(OverlayError::Detached(_))));
    }

    #[test]
    fn test_newlines_and_wrapping() {
        let layout = MonospaceLayout::new(10.0, 20.0).with_wrap_columns(4);
        let surface = MonospaceSurface::from_text("abcdefg\nhi", layout).unwrap();

        // End of a full visual line stays on it.
        assert_eq!(surface.caret_rect(&0, 4).unwrap().origin(), Point::new(40.0, 0.0));
        // "e" wraps to the second line.
        assert_eq!(surface.caret_rect(&0, 5).unwrap().origin(), Point::new(10.0, 20.0));
        // After the newline.
        assert_eq!(surface.caret_rect(&0, 8).unwrap().origin(), Point::new(0.0, 40.0));
        assert_eq!(surface.caret_rect(&0, 10).unwrap().origin(), Point::new(20.0, 40.0));
    }

    #[test]
    fn test_range_rects_per_line() {
        let layout = MonospaceLayout::new(10.0, 20.0).with_wrap_columns(4);
        let surface = MonospaceSurface::from_text("abcdefghij", layout).unwrap();

        let rects = surface.range_rects(&boundary(0, 2), &boundary(0, 9)).unwrap();
        assert_eq!(
            rects,
            vec![
                Rect::new(20.0, 0.0, 20.0, 20.0),
                Rect::new(0.0, 20.0, 40.0, 20.0),
                Rect::new(0.0, 40.0, 10.0, 20.0),
            ]
        );
        assert!(surface.range_rects(&boundary(0, 3), &boundary(0, 3)).unwrap().is_empty());
    }

    #[test]
    fn test_bounding_rect() {
        let layout = MonospaceLayout::new(10.0, 20.0)
            .with_origin(5.0, 5.0)
            .with_padding(2.0, 3.0);
        let surface = MonospaceSurface::from_text("ab\nabcd", layout).unwrap();
        assert_eq!(
            surface.bounding_rect().unwrap(),
            Rect::new(5.0, 5.0, 44.0, 46.0)
        );
    }
}
