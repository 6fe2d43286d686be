//! Sequential focus navigation order.

use floating_core::Document;

/// Effective tab index of a candidate, `None` when the node is not a candidate.
fn candidate_tab_index<D: Document>(doc: &D, node: D::Node) -> Option<i32> {
    let tag = doc.tag_name(node)?;
    let explicit = doc
        .attribute(node, "tabindex")
        .and_then(|value| value.trim().parse::<i32>().ok());
    if let Some(index) = explicit {
        return Some(index);
    }
    let editable = doc
        .attribute(node, "contenteditable")
        .is_some_and(|value| value != "false");
    let natural = match tag.as_str() {
        "input" | "select" | "textarea" | "button" => true,
        "a" => doc.attribute(node, "href").is_some(),
        "audio" | "video" => doc.attribute(node, "controls").is_some(),
        _ => editable,
    };
    natural.then_some(0)
}

fn is_hidden<D: Document>(doc: &D, node: D::Node) -> bool {
    let mut current = Some(node);
    while let Some(candidate) = current {
        if doc.attribute(candidate, "hidden").is_some()
            || doc.style_property(candidate, "display").as_deref() == Some("none")
            || doc.style_property(candidate, "visibility").as_deref() == Some("hidden")
        {
            return true;
        }
        current = doc.parent(candidate);
    }
    false
}

/// Radios in a named group take part in the tab order through one member:
/// the checked one, or the first of the group when none is checked.
fn is_non_tabbable_radio<D: Document>(doc: &D, node: D::Node) -> bool {
    if doc.tag_name(node).as_deref() != Some("input")
        || doc.attribute(node, "type").as_deref() != Some("radio")
    {
        return false;
    }
    let Some(name) = doc.attribute(node, "name") else {
        return false;
    };
    let group: Vec<D::Node> = doc
        .descendants(doc.root())
        .into_iter()
        .filter(|other| {
            doc.tag_name(*other).as_deref() == Some("input")
                && doc.attribute(*other, "type").as_deref() == Some("radio")
                && doc.attribute(*other, "name").as_deref() == Some(name.as_str())
        })
        .collect();
    let roving = group
        .iter()
        .find(|radio| doc.attribute(**radio, "checked").is_some())
        .or_else(|| group.first());
    roving.is_some_and(|radio| *radio != node)
}

fn is_focusable_candidate<D: Document>(doc: &D, node: D::Node) -> bool {
    if doc.attribute(node, "disabled").is_some() {
        return false;
    }
    if doc.tag_name(node).as_deref() == Some("input")
        && doc.attribute(node, "type").as_deref() == Some("hidden")
    {
        return false;
    }
    !is_hidden(doc, node) && !is_non_tabbable_radio(doc, node)
}

/// Tabbable descendants of `root` in sequential navigation order.
///
/// Elements with a positive `tabindex` come first, ascending, then every
/// element with index zero in document order. Disabled, hidden, negative
/// `tabindex` and non-roving radio buttons are skipped.
pub fn tabbable<D: Document>(doc: &D, root: D::Node) -> Vec<D::Node> {
    let mut ordered: Vec<(i32, usize, D::Node)> = Vec::new();
    let mut regular: Vec<D::Node> = Vec::new();
    for (position, node) in doc.descendants(root).into_iter().enumerate() {
        let Some(index) = candidate_tab_index(doc, node) else {
            continue;
        };
        if index < 0 || !is_focusable_candidate(doc, node) {
            continue;
        }
        if index == 0 {
            regular.push(node);
        } else {
            ordered.push((index, position, node));
        }
    }
    ordered.sort_by_key(|(index, position, _)| (*index, *position));
    ordered
        .into_iter()
        .map(|(_, _, node)| node)
        .chain(regular)
        .collect()
}
