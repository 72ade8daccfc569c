//! HTML markup for a rendered overlay.
//!
//! Produces absolutely-positioned layers meant to sit inside a
//! `position: relative` wrapper over the editor. Only positional styling
//! and tint are emitted; everything else is left to the host stylesheet.

use std::fmt::Write;

use super::config::OverlayConfig;
use super::model::{CaretMarker, CollaboratorOverlay, Overlay, SelectionHighlight};

/// Renders the whole overlay as a string of HTML.
pub fn render_html(overlay: &Overlay, config: &OverlayConfig) -> String {
    let prefix = &config.class_prefix;
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="{prefix}-overlay" style="position:absolute;inset:0;pointer-events:none;">"#
    );
    for group in &overlay.groups {
        html.push_str(&render_group(group, prefix));
    }
    html.push_str("</div>");
    html
}

/// Renders one collaborator's markers.
pub fn render_group(group: &CollaboratorOverlay, prefix: &str) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="{prefix}-group" data-collaborator-id="{}">"#,
        escape(&group.id)
    );
    for highlight in &group.highlights {
        html.push_str(&selection_html(highlight, prefix));
    }
    if let Some(caret) = &group.caret {
        html.push_str(&caret_html(caret, prefix));
    }
    html.push_str("</div>");
    html
}

/// Inline style for a selection highlight.
pub fn selection_style(highlight: &SelectionHighlight) -> String {
    let rect = &highlight.rect;
    format!(
        "position:absolute;left:{}px;top:{}px;width:{}px;height:{}px;background-color:{};opacity:{};z-index:{};",
        rect.left,
        rect.top,
        rect.width,
        rect.height,
        escape(&highlight.color),
        highlight.opacity,
        highlight.z_index
    )
}

/// Inline style for a caret bar.
pub fn caret_style(caret: &CaretMarker) -> String {
    format!(
        "position:absolute;left:{}px;top:{}px;width:{}px;height:{}px;background-color:{};z-index:{};",
        caret.position.left,
        caret.position.top,
        caret.width,
        caret.height,
        escape(&caret.color),
        caret.z_index
    )
}

/// Inline style for the name label above a caret.
pub fn label_style(caret: &CaretMarker) -> String {
    format!(
        "position:absolute;left:{}px;top:{}px;background-color:{};z-index:{};white-space:nowrap;",
        caret.label.position.left,
        caret.label.position.top,
        escape(&caret.color),
        caret.z_index
    )
}

fn selection_html(highlight: &SelectionHighlight, prefix: &str) -> String {
    format!(
        r#"<div class="{prefix}-selection" style="{}"></div>"#,
        selection_style(highlight)
    )
}

fn caret_html(caret: &CaretMarker, prefix: &str) -> String {
    let pinned = if caret.pinned { r#" data-pinned="true""# } else { "" };
    format!(
        r#"<div class="{prefix}-caret" style="{}"{pinned}></div><div class="{prefix}-label" style="{}">{}</div>"#,
        caret_style(caret),
        label_style(caret),
        escape(&caret.label.text)
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
