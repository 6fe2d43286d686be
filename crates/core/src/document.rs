//! Host document abstraction.
//!
//! The engine reads rectangles, walks the tree, toggles attributes and moves
//! focus only through this trait. A browser binding, a native toolkit or the
//! in-memory arena in `floating_dom` can all stand behind it.

use crate::geometry::{Rect, Viewport};
use core::fmt::Debug;
use core::hash::Hash;

/// Read/write access to the page the floating elements live in.
pub trait Document {
    /// Handle to a node. Handles are cheap to copy and compare by identity.
    type Node: Copy + Eq + Hash + Debug;

    /// The document element (`<html>`).
    fn root(&self) -> Self::Node;

    /// The `<body>` element.
    fn body(&self) -> Self::Node;

    /// Parent of a node, `None` for the root or a detached subtree head.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Children in document order.
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Whether the node is attached to this document.
    fn is_connected(&self, node: Self::Node) -> bool;

    /// Lower-case tag name, `None` for non-element nodes.
    fn tag_name(&self, node: Self::Node) -> Option<String>;

    /// Attribute value.
    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;

    /// Set an attribute, replacing any previous value.
    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);

    /// Remove an attribute if present.
    fn remove_attribute(&mut self, node: Self::Node, name: &str);

    /// Inline style property value.
    fn style_property(&self, node: Self::Node, property: &str) -> Option<String>;

    /// Set an inline style property; `None` removes it.
    fn set_style_property(&mut self, node: Self::Node, property: &str, value: Option<&str>);

    /// Bounding client rect, `None` if the node is detached.
    fn bounding_rect(&self, node: Self::Node) -> Option<Rect>;

    /// Current viewport size and scroll position.
    fn viewport(&self) -> Viewport;

    /// Width of the vertical scrollbar the window would lose when scrolling is locked.
    fn scrollbar_width(&self) -> f64;

    /// Whether the node's content overflows it (for `<body>`: the window shows a scrollbar).
    fn is_overflowing(&self, node: Self::Node) -> bool;

    /// Node that currently holds keyboard focus.
    fn active_element(&self) -> Option<Self::Node>;

    /// Move focus to a node. Returns `false` if the node cannot take focus.
    fn focus(&mut self, node: Self::Node) -> bool;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: Self::Node, node: Self::Node) -> bool {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.parent(candidate);
        }
        false
    }

    /// Descendants of `node` (excluding itself) in document order.
    fn descendants(&self, node: Self::Node) -> Vec<Self::Node> {
        let mut out = Vec::new();
        let mut stack: Vec<Self::Node> = self.children(node).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }
}
