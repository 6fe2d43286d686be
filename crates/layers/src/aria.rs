//! Hiding the rest of the page from assistive technology while a modal layer is open.

use floating_core::Document;

/// Elements on which `aria-hidden` is not allowed or has no effect.
const FORBIDDEN_TAGS: [&str; 14] = [
    "template", "script", "style", "link", "map", "meta", "noscript", "picture", "col", "colgroup",
    "param", "slot", "source", "track",
];

/// Whether `aria-hidden` must not be put on `node`.
pub fn is_aria_hidden_forbidden<D: Document>(doc: &D, node: D::Node) -> bool {
    let Some(tag) = doc.tag_name(node) else {
        return true;
    };
    FORBIDDEN_TAGS.contains(&tag.as_str())
        || (tag == "input" && doc.attribute(node, "type").as_deref() == Some("hidden"))
}

/// Set or clear `aria-hidden="true"` on `node`.
pub fn set_aria_hidden<D: Document>(doc: &mut D, node: D::Node, hidden: bool) {
    if hidden {
        doc.set_attribute(node, "aria-hidden", "true");
    } else {
        doc.remove_attribute(node, "aria-hidden");
    }
}

/// Children of `container` that were already hidden before any layer touched them.
pub fn hidden_siblings<D: Document>(doc: &D, container: D::Node) -> Vec<D::Node> {
    doc.children(container)
        .into_iter()
        .filter(|child| doc.attribute(*child, "aria-hidden").as_deref() == Some("true"))
        .collect()
}

/// Toggle `aria-hidden` on every child of `container` except `keep` and `exclude`.
pub fn set_siblings_hidden<D: Document>(
    doc: &mut D,
    container: D::Node,
    keep: D::Node,
    exclude: &[D::Node],
    hidden: bool,
) {
    for child in doc.children(container) {
        if child == keep || exclude.contains(&child) || is_aria_hidden_forbidden(doc, child) {
            continue;
        }
        set_aria_hidden(doc, child, hidden);
    }
}
