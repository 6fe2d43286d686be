//! In-memory document for the floating-element engine.
//!
//! `Dom` is a small arena-backed element tree that implements
//! [`floating_core::Document`]. Hosts without a browser (native toolkits,
//! terminals) can keep their overlay structure in it, and every test suite in
//! the workspace drives the engine through it. Layout is not computed: the
//! host assigns bounding rectangles explicitly with [`Dom::set_rect`].

use floating_core::{Document, Rect, Viewport};
use indextree::{Arena, Node as ArenaNode, NodeId};
use smallvec::SmallVec;

/// Handle to a node of a [`Dom`].
pub type NodeKey = NodeId;

/// Kind of node stored in the arena.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeKind {
    /// The document node that owns `<html>`.
    #[default]
    Document,
    /// An element with a lower-case tag name.
    Element {
        /// Tag name.
        tag: String,
    },
    /// A text node.
    Text {
        /// Text content.
        text: String,
    },
}

/// Data stored per node.
#[derive(Debug, Clone, Default)]
pub struct DomNode {
    /// What this node is.
    pub kind: NodeKind,
    /// Attributes in insertion order.
    pub attrs: SmallVec<(String, String), 4>,
    /// Inline style declarations in insertion order.
    pub style: SmallVec<(String, String), 2>,
    /// Bounding client rect assigned by the host.
    pub rect: Option<Rect>,
    /// Whether the content overflows the node.
    pub overflowing: bool,
}

/// Arena-backed document.
#[derive(Debug)]
pub struct Dom {
    arena: Arena<DomNode>,
    document: NodeId,
    html: NodeId,
    body: NodeId,
    active: Option<NodeId>,
    viewport: Viewport,
    scrollbar_width: f64,
}

impl Dom {
    /// Create a document containing `<html><body></body></html>`.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        let mut arena = Arena::new();
        let document = arena.new_node(DomNode::default());
        let html = arena.new_node(element_node("html"));
        let body = arena.new_node(element_node("body"));
        document.append(html, &mut arena);
        html.append(body, &mut arena);
        if let Some(node) = arena.get_mut(body) {
            node.get_mut().rect = Some(viewport.rect());
        }
        Self {
            arena,
            document,
            html,
            body,
            active: None,
            viewport,
            scrollbar_width: 15.0,
        }
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeKey {
        self.arena.new_node(element_node(tag))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeKey {
        self.arena.new_node(DomNode {
            kind: NodeKind::Text {
                text: text.to_owned(),
            },
            ..DomNode::default()
        })
    }

    /// Append `child` as the last child of `parent`, moving it if already attached.
    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) {
        child.detach(&mut self.arena);
        parent.append(child, &mut self.arena);
    }

    /// Insert `node` right before `reference`.
    pub fn insert_before(&mut self, reference: NodeKey, node: NodeKey) {
        node.detach(&mut self.arena);
        reference.insert_before(node, &mut self.arena);
    }

    /// Create an element, append it to `parent` and return it.
    pub fn append_element(&mut self, parent: NodeKey, tag: &str) -> NodeKey {
        let node = self.create_element(tag);
        self.append_child(parent, node);
        node
    }

    /// Detach a subtree from its parent. Focus inside it falls back to `<body>`.
    pub fn detach(&mut self, node: NodeKey) {
        if let Some(active) = self.active
            && self.contains(node, active)
        {
            self.active = Some(self.body);
        }
        node.detach(&mut self.arena);
    }

    /// Assign a bounding client rect.
    pub fn set_rect(&mut self, node: NodeKey, rect: Rect) {
        if let Some(entry) = self.arena.get_mut(node) {
            entry.get_mut().rect = Some(rect);
        }
    }

    /// Mark whether a node's content overflows it.
    pub fn set_overflowing(&mut self, node: NodeKey, overflowing: bool) {
        if let Some(entry) = self.arena.get_mut(node) {
            entry.get_mut().overflowing = overflowing;
        }
    }

    /// Replace the viewport (e.g. after a window resize or scroll).
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Set the scrollbar width reported to scroll locking.
    pub fn set_scrollbar_width(&mut self, width: f64) {
        self.scrollbar_width = width;
    }

    /// Drop focus back to `<body>`.
    pub fn blur(&mut self) {
        self.active = Some(self.body);
    }

    /// Concatenated text of all descendant text nodes.
    #[must_use]
    pub fn text_content(&self, node: NodeKey) -> String {
        let mut out = String::new();
        for descendant in node.descendants(&self.arena) {
            if let Some(entry) = self.arena.get(descendant)
                && let NodeKind::Text { text } = &entry.get().kind
            {
                out.push_str(text);
            }
        }
        out
    }

    /// The document node above `<html>`.
    #[must_use]
    pub const fn document_node(&self) -> NodeKey {
        self.document
    }

    fn data(&self, node: NodeKey) -> Option<&DomNode> {
        self.arena.get(node).map(ArenaNode::get)
    }

    fn data_mut(&mut self, node: NodeKey) -> Option<&mut DomNode> {
        self.arena.get_mut(node).map(ArenaNode::get_mut)
    }

    fn is_focusable(&self, node: NodeKey) -> bool {
        if node == self.body {
            return true;
        }
        let Some(data) = self.data(node) else {
            return false;
        };
        let NodeKind::Element { tag } = &data.kind else {
            return false;
        };
        let attr = |name: &str| data.attrs.iter().find(|(key, _)| key == name).map(|(_, val)| val.as_str());
        if attr("disabled").is_some() || attr("hidden").is_some() {
            return false;
        }
        if attr("tabindex").and_then(|val| val.trim().parse::<i32>().ok()).is_some() {
            return true;
        }
        match tag.as_str() {
            "a" | "area" => attr("href").is_some(),
            "input" => attr("type") != Some("hidden"),
            "button" | "select" | "textarea" | "iframe" | "summary" => true,
            _ => attr("contenteditable").is_some_and(|val| val != "false"),
        }
    }
}

fn element_node(tag: &str) -> DomNode {
    DomNode {
        kind: NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
        },
        ..DomNode::default()
    }
}

impl Document for Dom {
    type Node = NodeKey;

    fn root(&self) -> NodeKey {
        self.html
    }

    fn body(&self) -> NodeKey {
        self.body
    }

    fn parent(&self, node: NodeKey) -> Option<NodeKey> {
        self.arena.get(node).and_then(ArenaNode::parent)
    }

    fn children(&self, node: NodeKey) -> Vec<NodeKey> {
        node.children(&self.arena).collect()
    }

    fn is_connected(&self, node: NodeKey) -> bool {
        if node.is_removed(&self.arena) {
            return false;
        }
        node.ancestors(&self.arena).any(|ancestor| ancestor == self.document)
    }

    fn tag_name(&self, node: NodeKey) -> Option<String> {
        match &self.data(node)?.kind {
            NodeKind::Element { tag } => Some(tag.clone()),
            NodeKind::Document | NodeKind::Text { .. } => None,
        }
    }

    fn attribute(&self, node: NodeKey, name: &str) -> Option<String> {
        self.data(node)?
            .attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, val)| val.clone())
    }

    fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str) {
        let Some(data) = self.data_mut(node) else {
            return;
        };
        if let Some(entry) = data.attrs.iter_mut().find(|(key, _)| key == name) {
            value.clone_into(&mut entry.1);
        } else {
            data.attrs.push((name.to_owned(), value.to_owned()));
        }
    }

    fn remove_attribute(&mut self, node: NodeKey, name: &str) {
        if let Some(data) = self.data_mut(node) {
            data.attrs.retain(|entry| entry.0 != name);
        }
    }

    fn style_property(&self, node: NodeKey, property: &str) -> Option<String> {
        self.data(node)?
            .style
            .iter()
            .find(|(key, _)| key == property)
            .map(|(_, val)| val.clone())
    }

    fn set_style_property(&mut self, node: NodeKey, property: &str, value: Option<&str>) {
        let Some(data) = self.data_mut(node) else {
            return;
        };
        match value {
            Some(value) => {
                if let Some(entry) = data.style.iter_mut().find(|(key, _)| key == property) {
                    value.clone_into(&mut entry.1);
                } else {
                    data.style.push((property.to_owned(), value.to_owned()));
                }
            }
            None => data.style.retain(|entry| entry.0 != property),
        }
    }

    fn bounding_rect(&self, node: NodeKey) -> Option<Rect> {
        if !self.is_connected(node) {
            return None;
        }
        Some(self.data(node)?.rect.unwrap_or_default())
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn scrollbar_width(&self) -> f64 {
        self.scrollbar_width
    }

    fn is_overflowing(&self, node: NodeKey) -> bool {
        self.data(node).is_some_and(|data| data.overflowing)
    }

    fn active_element(&self) -> Option<NodeKey> {
        self.active
            .filter(|node| self.is_connected(*node))
            .or(Some(self.body))
    }

    fn focus(&mut self, node: NodeKey) -> bool {
        if !self.is_connected(node) || !self.is_focusable(node) {
            log::trace!(target: "floating_dom", "focus refused for {node:?}");
            return false;
        }
        self.active = Some(node);
        true
    }
}
