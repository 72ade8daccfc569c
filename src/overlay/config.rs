//! Rendering configuration for the collaborator overlay.

use serde::{Deserialize, Serialize};

use crate::error::{OverlayError, OverlayResult};

/// What to draw when a caret offset does not resolve to coordinates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum UnresolvedPolicy {
    /// Skip the caret marker.
    #[default]
    Hide,
    /// Draw the caret at the editor origin (legacy behavior).
    PinOrigin,
}

/// How a selection is turned into highlight rectangles.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    /// One rectangle spanning both endpoints, padded by one line height.
    #[default]
    Approximate,
    /// One rectangle per line box the range touches.
    PerLine,
}

/// Overlay configuration. Every field has a default, so `{}` is valid JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayConfig {
    /// Height of one text line, in pixels.
    pub line_height: f64,

    /// Width of the caret bar, in pixels.
    pub caret_width: f64,

    /// Distance from the caret top to the label top, in pixels.
    pub label_offset: f64,

    /// Opacity of selection highlights, 0.0 to 1.0.
    pub selection_opacity: f64,

    pub caret_z_index: i32,
    pub selection_z_index: i32,

    pub unresolved: UnresolvedPolicy,
    pub selection_mode: SelectionMode,

    /// Prefix for CSS class names in generated markup.
    pub class_prefix: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            line_height: 20.0,
            caret_width: 2.0,
            label_offset: 18.0,
            selection_opacity: 0.3,
            caret_z_index: 20,
            selection_z_index: 10,
            unresolved: UnresolvedPolicy::Hide,
            selection_mode: SelectionMode::Approximate,
            class_prefix: "collab-cursor".to_string(),
        }
    }
}

impl OverlayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> OverlayResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the values can produce a sensible overlay.
    pub fn validate(&self) -> OverlayResult<()> {
        if self.line_height.is_nan() || self.line_height <= 0.0 {
            return Err(OverlayError::invalid_layout(format!(
                "line height must be positive, got {}",
                self.line_height
            )));
        }
        if self.caret_width.is_nan() || self.caret_width < 0.0 {
            return Err(OverlayError::invalid_layout(format!(
                "caret width must not be negative, got {}",
                self.caret_width
            )));
        }
        if !(0.0..=1.0).contains(&self.selection_opacity) {
            return Err(OverlayError::invalid_layout(format!(
                "selection opacity must be within [0, 1], got {}",
                self.selection_opacity
            )));
        }
        Ok(())
    }

    /// Builder: Set line height.
    pub fn with_line_height(mut self, line_height: f64) -> Self {
        self.line_height = line_height;
        self
    }

    /// Builder: Set caret width.
    pub fn with_caret_width(mut self, caret_width: f64) -> Self {
        self.caret_width = caret_width;
        self
    }

    /// Builder: Set label offset.
    pub fn with_label_offset(mut self, label_offset: f64) -> Self {
        self.label_offset = label_offset;
        self
    }

    /// Builder: Set selection opacity.
    pub fn with_selection_opacity(mut self, opacity: f64) -> Self {
        self.selection_opacity = opacity;
        self
    }

    /// Builder: Set the unresolved-caret policy.
    pub fn with_unresolved(mut self, policy: UnresolvedPolicy) -> Self {
        self.unresolved = policy;
        self
    }

    /// Builder: Set the selection mode.
    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    /// Builder: Set the CSS class prefix.
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = prefix.into();
        self
    }
}
