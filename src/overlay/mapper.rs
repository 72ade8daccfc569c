//! Logical offset to editor-relative pixel coordinates.
//!
//! The mapper walks the surface's text leaves depth-first, finds the leaf
//! containing the offset and measures a collapsed range there. Nothing is
//! cached: every call re-walks the surface, because the leaf structure can
//! change between renders.

use tracing::{trace, warn};

use super::model::{Point, Rect};
use super::surface::{Boundary, EditorSurface};
use crate::error::OverlayResult;

/// Resolves logical offsets against an editor surface.
///
/// This is the seam the renderer depends on. `PositionMapper` implements
/// it for every [`EditorSurface`]; tests can substitute their own.
pub trait TextGeometry<S: ?Sized> {
    /// Editor-relative point of `offset`, or `None` if it cannot be resolved.
    fn resolve_offset_to_point(&self, container: Option<&S>, offset: usize) -> Option<Point>;

    /// Editor-relative line boxes covered by `from..to`.
    ///
    /// The default reports that per-line geometry is unavailable.
    fn resolve_range_rects(&self, _container: Option<&S>, _from: usize, _to: usize) -> Option<Vec<Rect>> {
        None
    }
}

/// Stateless offset resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionMapper;

impl PositionMapper {
    pub fn new() -> Self {
        Self
    }

    /// Finds the leaf holding `offset` and the local offset inside it.
    ///
    /// Returns `Ok(None)` when the offset lies beyond the text, including
    /// the case of a surface with no text leaves at all. Empty leaves are
    /// skipped while a later leaf exists, since they have no layout box.
    pub fn locate<S: EditorSurface>(
        &self,
        surface: &S,
        offset: usize,
    ) -> OverlayResult<Option<Boundary<S::Leaf>>> {
        let mut count = 0;
        let mut leaves = surface.text_leaves()?.into_iter().enumerate().peekable();
        while let Some((leaf_index, leaf)) = leaves.next() {
            let len = surface.leaf_len(&leaf)?;
            if len == 0 && leaves.peek().is_some() {
                continue;
            }
            if count + len >= offset {
                return Ok(Some(Boundary {
                    leaf,
                    leaf_index,
                    offset: (offset - count).min(len),
                }));
            }
            count += len;
        }
        Ok(None)
    }

    /// Measures `offset` relative to the surface's top-left corner.
    pub fn try_resolve<S: EditorSurface>(
        &self,
        surface: &S,
        offset: usize,
    ) -> OverlayResult<Option<Point>> {
        let Some(boundary) = self.locate(surface, offset)? else {
            return Ok(None);
        };
        let caret = surface.caret_rect(&boundary.leaf, boundary.offset)?;
        let editor = surface.bounding_rect()?;
        let point = caret.relative_to(editor.origin()).origin();
        trace!(
            offset,
            leaf = boundary.leaf_index,
            local = boundary.offset,
            left = point.left,
            top = point.top,
            "resolved offset"
        );
        Ok(Some(point))
    }

    /// Measures the line boxes of `from..to` relative to the surface.
    ///
    /// Empty boxes are dropped. `Ok(None)` if either end is unresolvable.
    pub fn try_range_rects<S: EditorSurface>(
        &self,
        surface: &S,
        from: usize,
        to: usize,
    ) -> OverlayResult<Option<Vec<Rect>>> {
        let (Some(start), Some(end)) = (self.locate(surface, from)?, self.locate(surface, to)?) else {
            return Ok(None);
        };
        let origin = surface.bounding_rect()?.origin();
        let rects = surface
            .range_rects(&start, &end)?
            .into_iter()
            .filter(|r| !r.is_empty())
            .map(|r| r.relative_to(origin))
            .collect();
        Ok(Some(rects))
    }
}

impl<S: EditorSurface> TextGeometry<S> for PositionMapper {
    fn resolve_offset_to_point(&self, container: Option<&S>, offset: usize) -> Option<Point> {
        let surface = container?;
        match self.try_resolve(surface, offset) {
            Ok(point) => point,
            Err(err) => {
                warn!(offset, error = %err, "failed to resolve offset");
                None
            }
        }
    }

    fn resolve_range_rects(&self, container: Option<&S>, from: usize, to: usize) -> Option<Vec<Rect>> {
        let surface = container?;
        match self.try_range_rects(surface, from, to) {
            Ok(rects) => rects,
            Err(err) => {
                warn!(from, to, error = %err, "failed to measure range");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OverlayError;
    use crate::overlay::surface::{MonospaceLayout, MonospaceSurface};

    fn hello_world() -> MonospaceSurface {
        let layout = MonospaceLayout::new(8.0, 20.0).with_origin(40.0, 100.0);
        MonospaceSurface::new(["Hello", " world"], layout).unwrap()
    }

    /// Surface whose measurements always throw, like a detached DOM node.
    struct DetachedSurface;

    impl EditorSurface for DetachedSurface {
        type Leaf = ();

        fn text_leaves(&self) -> OverlayResult<Vec<()>> {
            Ok(vec![()])
        }

        fn leaf_len(&self, _leaf: &()) -> OverlayResult<usize> {
            Ok(10)
        }

        fn caret_rect(&self, _leaf: &(), _offset: usize) -> OverlayResult<Rect> {
            Err(OverlayError::detached("node removed mid-edit"))
        }

        fn range_rects(&self, _start: &Boundary<()>, _end: &Boundary<()>) -> OverlayResult<Vec<Rect>> {
            Err(OverlayError::detached("node removed mid-edit"))
        }

        fn bounding_rect(&self) -> OverlayResult<Rect> {
            Ok(Rect::default())
        }
    }

    #[test]
    fn test_locate_between_nodes() {
        let mapper = PositionMapper::new();
        let surface = hello_world();

        // Offset 5 lands at the end of "Hello", the first node that reaches it.
        let boundary = mapper.locate(&surface, 5).unwrap().unwrap();
        assert_eq!((boundary.leaf_index, boundary.offset), (0, 5));

        let boundary = mapper.locate(&surface, 6).unwrap().unwrap();
        assert_eq!((boundary.leaf_index, boundary.offset), (1, 1));

        assert!(mapper.locate(&surface, 12).unwrap().is_none());
    }

    #[test]
    fn test_locate_skips_empty_leaves() {
        let mapper = PositionMapper::new();
        let layout = MonospaceLayout::new(8.0, 20.0);
        let surface = MonospaceSurface::new(["", "abc", "", "de"], layout.clone()).unwrap();

        let boundary = mapper.locate(&surface, 0).unwrap().unwrap();
        assert_eq!((boundary.leaf_index, boundary.offset), (1, 0));

        // End of "abc" still wins over the empty node after it.
        let boundary = mapper.locate(&surface, 3).unwrap().unwrap();
        assert_eq!((boundary.leaf_index, boundary.offset), (1, 3));

        let boundary = mapper.locate(&surface, 4).unwrap().unwrap();
        assert_eq!((boundary.leaf_index, boundary.offset), (3, 1));

        // A lone empty leaf is still the place to put the caret.
        let empty = MonospaceSurface::new([""], layout).unwrap();
        let boundary = mapper.locate(&empty, 0).unwrap().unwrap();
        assert_eq!((boundary.leaf_index, boundary.offset), (0, 0));
    }

    #[test]
    fn test_resolve_is_editor_relative() {
        let mapper = PositionMapper::new();
        let surface = hello_world();
        let point = mapper.resolve_offset_to_point(Some(&surface), 3).unwrap();
        assert_eq!(point, Point::new(24.0, 0.0));
    }

    #[test]
    fn test_boundaries() {
        let mapper = PositionMapper::new();
        let surface = hello_world();

        assert_eq!(
            mapper.resolve_offset_to_point(Some(&surface), 0),
            Some(Point::new(0.0, 0.0))
        );
        assert_eq!(
            mapper.resolve_offset_to_point(Some(&surface), 11),
            Some(Point::new(88.0, 0.0))
        );
        assert_eq!(mapper.resolve_offset_to_point(Some(&surface), 12), None);
    }

    #[test]
    fn test_missing_or_empty_editor() {
        let mapper = PositionMapper::new();
        assert_eq!(mapper.resolve_offset_to_point(None::<&MonospaceSurface>, 0), None);

        let empty = MonospaceSurface::new(Vec::<String>::new(), MonospaceLayout::default()).unwrap();
        assert_eq!(mapper.resolve_offset_to_point(Some(&empty), 0), None);
        assert_eq!(mapper.resolve_offset_to_point(Some(&empty), 3), None);
    }

    #[test]
    fn test_surface_failure_is_contained() {
        let mapper = PositionMapper::new();
        assert!(mapper.try_resolve(&DetachedSurface, 4).is_err());
        assert_eq!(mapper.resolve_offset_to_point(Some(&DetachedSurface), 4), None);
        assert_eq!(mapper.resolve_range_rects(Some(&DetachedSurface), 0, 4), None);
    }

    #[test]
    fn test_monotonic_within_line() {
        let mapper = PositionMapper::new();
        let surface = hello_world();
        let lefts: Vec<f64> = (0..=11)
            .map(|offset| mapper.resolve_offset_to_point(Some(&surface), offset).unwrap().left)
            .collect();
        assert!(lefts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_monotonic_in_flow_order_when_wrapped() {
        let mapper = PositionMapper::new();
        let layout = MonospaceLayout::new(8.0, 20.0).with_wrap_columns(5);
        let surface = MonospaceSurface::from_text("the quick brown fox", layout).unwrap();

        let points: Vec<Point> = (0..=19)
            .map(|offset| mapper.resolve_offset_to_point(Some(&surface), offset).unwrap())
            .collect();
        for w in points.windows(2) {
            assert!(w[0].top < w[1].top || (w[0].top == w[1].top && w[0].left <= w[1].left));
        }
    }

    #[test]
    fn test_idempotent() {
        let mapper = PositionMapper::new();
        let surface = hello_world();
        let first = mapper.resolve_offset_to_point(Some(&surface), 7);
        let second = mapper.resolve_offset_to_point(Some(&surface), 7);
        assert_eq!(first, second);
    }

    #[test]
    fn test_range_rects_relative() {
        let mapper = PositionMapper::new();
        let surface = hello_world();
        let rects = mapper.resolve_range_rects(Some(&surface), 0, 5).unwrap();
        assert_eq!(rects, vec![Rect::new(0.0, 0.0, 40.0, 20.0)]);
        assert_eq!(mapper.resolve_range_rects(Some(&surface), 0, 40), None);
    }
}
