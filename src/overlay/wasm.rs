//! WASM bindings for the collaborator overlay.
//!
//! `DomSurface` measures a live editor element, `DomTarget` lets the
//! keyed painter write marker `div`s, and
//! `JsCursorOverlay` wires both to JavaScript.

use js_sys::Array;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CharacterData, Document, DomRect, Element, Node};

use super::config::OverlayConfig;
use super::mapper::{PositionMapper, TextGeometry};
use super::model::{Collaborator, Rect, Transition};
use super::painter::{Layer, MarkerState, PaintTarget, Painter};
use super::renderer::OverlayRenderer;
use super::surface::{Boundary, EditorSurface};
use crate::error::{OverlayError, OverlayResult};

/// `NodeFilter.SHOW_TEXT`
const SHOW_TEXT: u32 = 0x4;

/// Serialize a value to JsValue with maps as plain JS objects (not Map).
fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&Serializer::new().serialize_maps_as_objects(true))
}

fn js_error(err: JsValue) -> OverlayError {
    OverlayError::dom(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

fn to_rect(rect: &DomRect) -> Rect {
    Rect::new(rect.x(), rect.y(), rect.width(), rect.height())
}

// =============================================================================
// ERROR CONVERSION
// =============================================================================

impl From<OverlayError> for JsValue {
    fn from(err: OverlayError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}

/// Helper macro for Result conversion
macro_rules! js_result {
    ($expr:expr) => {
        $expr.map_err(|e: OverlayError| JsValue::from(e))
    };
}

// =============================================================================
// DOM SURFACE
// =============================================================================

/// A live editor element. Offsets count UTF-16 code units, like the DOM.
pub struct DomSurface {
    root: Element,
}

impl DomSurface {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    fn document(&self) -> OverlayResult<Document> {
        self.root
            .owner_document()
            .ok_or_else(|| OverlayError::detached("editor has no owner document"))
    }

    fn range(&self) -> OverlayResult<web_sys::Range> {
        self.document()?.create_range().map_err(js_error)
    }
}

impl EditorSurface for DomSurface {
    type Leaf = Node;

    fn text_leaves(&self) -> OverlayResult<Vec<Node>> {
        let walker = self
            .document()?
            .create_tree_walker_with_what_to_show(&self.root, SHOW_TEXT)
            .map_err(js_error)?;
        let mut leaves = Vec::new();
        while let Some(node) = walker.next_node().map_err(js_error)? {
            leaves.push(node);
        }
        Ok(leaves)
    }

    fn leaf_len(&self, leaf: &Node) -> OverlayResult<usize> {
        leaf.dyn_ref::<CharacterData>()
            .map(|text| text.length() as usize)
            .ok_or_else(|| OverlayError::geometry("leaf is not a text node"))
    }

    fn caret_rect(&self, leaf: &Node, offset: usize) -> OverlayResult<Rect> {
        if !leaf.is_connected() {
            return Err(OverlayError::detached("text node left the document"));
        }
        let range = self.range()?;
        range.set_start(leaf, offset as u32).map_err(js_error)?;
        range.set_end(leaf, offset as u32).map_err(js_error)?;
        let rect = range.get_bounding_client_rect();
        if rect.x() == 0.0 && rect.y() == 0.0 && rect.width() == 0.0 && rect.height() == 0.0 {
            return Err(OverlayError::geometry("collapsed range has no layout box"));
        }
        Ok(to_rect(&rect))
    }

    fn range_rects(&self, start: &Boundary<Node>, end: &Boundary<Node>) -> OverlayResult<Vec<Rect>> {
        let range = self.range()?;
        range.set_start(&start.leaf, start.offset as u32).map_err(js_error)?;
        range.set_end(&end.leaf, end.offset as u32).map_err(js_error)?;
        let Some(list) = range.get_client_rects() else {
            return Ok(Vec::new());
        };
        Ok((0..list.length())
            .filter_map(|i| list.get(i))
            .map(|rect| to_rect(&rect))
            .collect())
    }

    fn bounding_rect(&self) -> OverlayResult<Rect> {
        Ok(to_rect(&self.root.get_bounding_client_rect()))
    }
}

// =============================================================================
// DOM PAINT TARGET
// =============================================================================

/// Paints marker layers as `div`s inside an overlay container.
pub struct DomTarget {
    root: Element,
    document: Document,
}

impl DomTarget {
    pub fn new(root: Element) -> OverlayResult<Self> {
        let document = root
            .owner_document()
            .ok_or_else(|| OverlayError::detached("overlay root has no owner document"))?;
        Ok(Self { root, document })
    }
}

impl PaintTarget for DomTarget {
    type Node = Element;

    fn create(&mut self, id: &str) -> OverlayResult<Element> {
        let element = self.document.create_element("div").map_err(js_error)?;
        element
            .set_attribute("data-collaborator-id", id)
            .map_err(js_error)?;
        self.root.append_child(&element).map_err(js_error)?;
        Ok(element)
    }

    fn apply(&mut self, node: &Element, layer: &Layer) -> OverlayResult<()> {
        node.set_attribute("class", &layer.class).map_err(js_error)?;
        node.set_attribute("style", &layer.style).map_err(js_error)?;
        if let Some(text) = &layer.text {
            node.set_text_content(Some(text));
        }
        Ok(())
    }

    fn set_state(&mut self, node: &Element, state: MarkerState) -> OverlayResult<()> {
        node.set_attribute("data-state", state.as_str()).map_err(js_error)
    }

    fn remove(&mut self, node: &Element) {
        node.remove();
    }
}

/// Overlay painter writing to the live DOM.
pub type DomPainter = Painter<DomTarget>;

// =============================================================================
// JS WRAPPER
// =============================================================================

/// Installs `tracing-wasm` as the global subscriber (browser console).
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
    if tracing_wasm::try_set_as_global_default().is_err() {
        debug!("tracing subscriber already installed");
    }
}

/// JavaScript-friendly collaborator overlay.
///
/// # Example (JavaScript)
/// ```js
/// const overlay = new JsCursorOverlay(overlayDiv, { lineHeight: 22 });
/// // On every render tick:
/// overlay.render(editorDiv, collaborators);
/// ```
#[wasm_bindgen]
pub struct JsCursorOverlay {
    renderer: OverlayRenderer<PositionMapper>,
    painter: DomPainter,
    last_transitions: Vec<Transition>,
}

#[wasm_bindgen]
impl JsCursorOverlay {
    /// Creates an overlay painting into `overlay_root`.
    ///
    /// `config` may be `undefined`/`null` for defaults, or a partial
    /// `OverlayConfig` object (camelCase keys).
    #[wasm_bindgen(constructor)]
    pub fn new(overlay_root: Element, config: JsValue) -> Result<JsCursorOverlay, JsValue> {
        let config: OverlayConfig = if config.is_undefined() || config.is_null() {
            OverlayConfig::default()
        } else {
            js_result!(from_value::<OverlayConfig>(config).map_err(|e| OverlayError::serialization(e.to_string())))?
        };
        js_result!(config.validate())?;

        let target = js_result!(DomTarget::new(overlay_root))?;
        let painter = DomPainter::new(target, config.class_prefix.clone());
        Ok(JsCursorOverlay {
            renderer: OverlayRenderer::new(config),
            painter,
            last_transitions: Vec::new(),
        })
    }

    /// Renders and paints one pass. Returns the overlay as a JS object.
    ///
    /// `collaborators` is an array of
    /// `{id, name, avatarColor, cursor?: {from, to}, selection?: {from, to}}`.
    /// A `null` editor clears the overlay.
    pub fn render(&mut self, editor_root: Option<Element>, collaborators: JsValue) -> Result<JsValue, JsValue> {
        let collaborators: Vec<Collaborator> = js_result!(
            from_value::<Vec<Collaborator>>(collaborators).map_err(|e| OverlayError::serialization(e.to_string()))
        )?;
        let surface = editor_root.map(DomSurface::new);
        let overlay = self.renderer.render(&collaborators, surface.as_ref());
        self.last_transitions = js_result!(self.painter.paint(&overlay))?;
        Ok(to_js_value(&overlay)?)
    }

    /// Resolves one offset to `{left, top}` relative to the editor, or `null`.
    #[wasm_bindgen(js_name = resolveOffsetToPoint)]
    pub fn resolve_offset_to_point(&self, editor_root: Option<Element>, offset: u32) -> Result<JsValue, JsValue> {
        let surface = editor_root.map(DomSurface::new);
        match self
            .renderer
            .geometry()
            .resolve_offset_to_point(surface.as_ref(), offset as usize)
        {
            Some(point) => Ok(to_js_value(&point)?),
            None => Ok(JsValue::NULL),
        }
    }

    /// Transitions applied by the most recent `render`.
    #[wasm_bindgen(js_name = lastTransitions)]
    pub fn last_transitions(&self) -> Result<Array, JsValue> {
        let array = Array::new();
        for transition in &self.last_transitions {
            array.push(&to_js_value(transition)?);
        }
        Ok(array)
    }

    /// Removes markers that are fading out. Call when the exit animation
    /// ends; otherwise they go on the next `render`.
    #[wasm_bindgen(js_name = flushExiting)]
    pub fn flush_exiting(&mut self) {
        self.painter.flush_exiting();
    }

    /// Removes all markers from the page.
    pub fn clear(&mut self) {
        self.painter.clear();
        self.last_transitions.clear();
    }
}
