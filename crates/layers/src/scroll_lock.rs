//! Body scroll locking with scrollbar compensation.

use floating_core::Document;

/// One inline style value to put back.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SavedStyle<N> {
    node: N,
    property: &'static str,
    value: Option<String>,
}

/// Inline styles changed by a lock, restored exactly on release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRestore<N> {
    saved: Vec<SavedStyle<N>>,
}

impl<N: Copy> ScrollRestore<N> {
    /// Put every saved value back; values that were unset are removed again.
    pub fn restore<D: Document<Node = N>>(self, doc: &mut D) {
        for entry in self.saved.into_iter().rev() {
            doc.set_style_property(entry.node, entry.property, entry.value.as_deref());
        }
    }
}

fn padding_right<D: Document>(doc: &D, node: D::Node) -> f64 {
    doc.style_property(node, "padding-right")
        .and_then(|value| value.trim().trim_end_matches("px").parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn has_class<D: Document>(doc: &D, node: D::Node, class: &str) -> bool {
    doc.attribute(node, "class")
        .is_some_and(|classes| classes.split_whitespace().any(|name| name == class))
}

/// Lock scrolling of `container`.
///
/// When the container shows a scrollbar, its right padding (and that of every
/// element carrying `fixed_marker_class`) grows by the scrollbar width so
/// content does not shift when the scrollbar disappears. Overflow is hidden on
/// the scroll container: the root element when the container is `<body>` and
/// the root forces `overflow-y: scroll`, otherwise the container itself.
pub fn lock<D: Document>(doc: &mut D, container: D::Node, fixed_marker_class: &str) -> ScrollRestore<D::Node> {
    let mut saved = Vec::new();

    if doc.is_overflowing(container) {
        let width = doc.scrollbar_width();
        pad_right(doc, &mut saved, container, width);
        let fixed: Vec<D::Node> = doc
            .descendants(doc.root())
            .into_iter()
            .filter(|node| has_class(doc, *node, fixed_marker_class))
            .collect();
        for node in fixed {
            pad_right(doc, &mut saved, node, width);
        }
    }

    let scroll_container = match doc.parent(container) {
        Some(parent)
            if parent == doc.root()
                && doc.style_property(parent, "overflow-y").as_deref() == Some("scroll") =>
        {
            parent
        }
        Some(_) | None => container,
    };
    for property in ["overflow", "overflow-x", "overflow-y"] {
        saved.push(SavedStyle {
            node: scroll_container,
            property,
            value: doc.style_property(scroll_container, property),
        });
    }
    doc.set_style_property(scroll_container, "overflow", Some("hidden"));
    ScrollRestore { saved }
}

fn pad_right<D: Document>(doc: &mut D, saved: &mut Vec<SavedStyle<D::Node>>, node: D::Node, width: f64) {
    saved.push(SavedStyle {
        node,
        property: "padding-right",
        value: doc.style_property(node, "padding-right"),
    });
    let padded = format!("{}px", padding_right(doc, node) + width);
    doc.set_style_property(node, "padding-right", Some(&padded));
}
