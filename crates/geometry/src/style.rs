//! CSS output applied to the floating element's root node.

use crate::placement::PlacementResult;
use floating_core::Document;

/// Style properties for the floating element, ready to set as inline styles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatingStyles {
    /// `position`.
    pub position: &'static str,
    /// `left`.
    pub left: String,
    /// `top`.
    pub top: String,
    /// `transform-origin`.
    pub transform_origin: String,
    /// `visibility`; `hidden` when the anchor is scrolled out of view.
    pub visibility: &'static str,
    /// `opacity`; `0` while the element is still entering.
    pub opacity: &'static str,
}

impl FloatingStyles {
    /// Styles for a result. `visible` is `false` while the element is still entering:
    /// it is laid out at opacity 0, so the first painted frame already has final
    /// coordinates and its content stays focusable.
    #[must_use]
    pub fn from_result(result: &PlacementResult, visible: bool) -> Self {
        Self {
            position: result.strategy.as_css(),
            left: format!("{}px", result.coordinates.x),
            top: format!("{}px", result.coordinates.y),
            transform_origin: format!(
                "{}px {}px",
                result.transform_origin.x, result.transform_origin.y
            ),
            visibility: if result.hidden { "hidden" } else { "visible" },
            opacity: if visible { "1" } else { "0" },
        }
    }

    /// Write the styles onto `node`.
    pub fn apply<D: Document>(&self, doc: &mut D, node: D::Node) {
        doc.set_style_property(node, "position", Some(self.position));
        doc.set_style_property(node, "left", Some(&self.left));
        doc.set_style_property(node, "top", Some(&self.top));
        doc.set_style_property(node, "transform-origin", Some(&self.transform_origin));
        doc.set_style_property(node, "visibility", Some(self.visibility));
        doc.set_style_property(node, "opacity", Some(self.opacity));
    }
}
