//! Stack of open overlay layers.

use crate::aria;
use crate::scroll_lock::{self, ScrollRestore};
use anyhow::{Result, bail};
use core::fmt;
use floating_core::{Document, FloatingConfig};

const LOG_TARGET: &str = "floating_layers";

/// Identity of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

/// One open floating surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayLayer<N> {
    /// Identity; compare layers by this, never by stack position.
    pub id: LayerId,
    /// Root node of the layer's content.
    pub root: N,
    /// Node the layer is mounted into (usually `<body>`).
    pub container: N,
    /// Trigger the layer belongs to.
    pub anchor: Option<N>,
    /// Modal layers hide their siblings and lock scrolling.
    pub modal: bool,
    /// Leave scrolling alone even for a modal layer.
    pub disable_scroll_lock: bool,
}

/// Per-container bookkeeping shared by the modal layers mounted into it.
#[derive(Debug)]
struct ContainerInfo<N> {
    container: N,
    layers: Vec<LayerId>,
    hidden_siblings: Vec<N>,
    restore: Option<ScrollRestore<N>>,
}

/// Ordered registry of open layers.
///
/// Layers are pushed on [`Self::add`] and removed by identity, so a layer
/// below the top may close first without disturbing the others.
pub struct OverlayManager<N> {
    layers: Vec<OverlayLayer<N>>,
    containers: Vec<ContainerInfo<N>>,
    next_id: u64,
    fixed_marker_class: String,
}

impl<N: fmt::Debug> fmt::Debug for OverlayManager<N> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("OverlayManager")
            .field("layers", &self.layers)
            .field("containers", &self.containers.len())
            .finish_non_exhaustive()
    }
}

impl<N: Copy + Eq + fmt::Debug> OverlayManager<N> {
    /// An empty stack.
    #[must_use]
    pub fn new(config: &FloatingConfig) -> Self {
        Self {
            layers: Vec::new(),
            containers: Vec::new(),
            next_id: 0,
            fixed_marker_class: config.fixed_marker_class.clone(),
        }
    }

    /// Allocate an identity for a layer about to open.
    pub fn next_layer_id(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Push a layer and return its stack index. Adding a layer twice returns
    /// its existing index.
    ///
    /// For modal layers the layer root is un-hidden and every other child of
    /// the container that is not already hidden gets `aria-hidden="true"`.
    pub fn add<D: Document<Node = N>>(&mut self, doc: &mut D, layer: OverlayLayer<N>) -> usize {
        if let Some(index) = self.index_of(layer.id) {
            return index;
        }
        let index = self.layers.len();
        self.layers.push(layer);
        tracing::debug!(layer = layer.id.0, modal = layer.modal, "overlay layer added");
        if !layer.modal {
            return index;
        }

        aria::set_aria_hidden(doc, layer.root, false);
        let hidden_siblings = aria::hidden_siblings(doc, layer.container);
        aria::set_siblings_hidden(doc, layer.container, layer.root, &hidden_siblings, true);

        if let Some(info) = self.container_mut(layer.container) {
            info.layers.push(layer.id);
        } else {
            self.containers.push(ContainerInfo {
                container: layer.container,
                layers: vec![layer.id],
                hidden_siblings,
                restore: None,
            });
        }
        index
    }

    /// The layer finished mounting: lock scrolling of its container once.
    ///
    /// # Errors
    /// Returns an error if the layer was never added.
    pub fn mount<D: Document<Node = N>>(&mut self, doc: &mut D, id: LayerId) -> Result<()> {
        let Some(layer) = self.get(id).copied() else {
            bail!("layer {id:?} mounted before it was added");
        };
        if !layer.modal || layer.disable_scroll_lock {
            return Ok(());
        }
        let marker = self.fixed_marker_class.clone();
        let Some(info) = self.container_mut(layer.container) else {
            bail!("layer {id:?} has no container record");
        };
        if info.restore.is_none() {
            info.restore = Some(scroll_lock::lock(doc, layer.container, &marker));
            log::debug!(target: LOG_TARGET, "scroll locked on {:?}", layer.container);
        }
        Ok(())
    }

    /// Remove a layer by identity. Unknown ids are ignored and return `false`.
    ///
    /// When the container's last modal layer goes, its scroll lock is released
    /// and sibling visibility restored; otherwise the new top layer of that
    /// container is un-hidden.
    pub fn remove<D: Document<Node = N>>(&mut self, doc: &mut D, id: LayerId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let layer = self.layers.remove(index);
        tracing::debug!(layer = id.0, "overlay layer removed");
        if !layer.modal {
            return true;
        }

        let Some(container_index) = self
            .containers
            .iter()
            .position(|info| info.container == layer.container)
        else {
            return true;
        };
        let now_empty = self.containers.get_mut(container_index).is_some_and(|info| {
            info.layers.retain(|other| *other != id);
            info.layers.is_empty()
        });

        if now_empty {
            let info = self.containers.remove(container_index);
            if let Some(restore) = info.restore {
                restore.restore(doc);
            }
            aria::set_aria_hidden(doc, layer.root, true);
            aria::set_siblings_hidden(doc, info.container, layer.root, &info.hidden_siblings, false);
        } else {
            let next_top = self
                .containers
                .get(container_index)
                .and_then(|info| info.layers.last().copied())
                .and_then(|top| self.get(top).copied());
            if let Some(next) = next_top {
                aria::set_aria_hidden(doc, next.root, false);
            }
        }
        true
    }

    /// Whether `id` is the topmost modal layer: the one that answers Escape
    /// and outside clicks.
    ///
    /// Non-modal layers (tooltips) are skipped, so a tooltip opened above a
    /// popover leaves the popover in charge of dismissal. A non-modal layer is
    /// never the top modal, even when it is [`Self::top`].
    #[must_use]
    pub fn is_top_modal(&self, id: LayerId) -> bool {
        self.layers
            .iter()
            .rev()
            .find(|layer| layer.modal)
            .is_some_and(|layer| layer.id == id)
    }

    /// Topmost layer of any kind.
    #[must_use]
    pub fn top(&self) -> Option<&OverlayLayer<N>> {
        self.layers.last()
    }

    /// Whether `id` is on the stack.
    #[must_use]
    pub fn contains(&self, id: LayerId) -> bool {
        self.index_of(id).is_some()
    }

    /// Look up a layer.
    #[must_use]
    pub fn get(&self, id: LayerId) -> Option<&OverlayLayer<N>> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// Number of open layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether no layer is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &OverlayLayer<N>> {
        self.layers.iter()
    }

    fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id == id)
    }

    fn container_mut(&mut self, container: N) -> Option<&mut ContainerInfo<N>> {
        self.containers.iter_mut().find(|info| info.container == container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floating_core::Viewport;
    use floating_dom::{Dom, NodeKey};

    fn modal(manager: &mut OverlayManager<NodeKey>, dom: &mut Dom) -> OverlayLayer<NodeKey> {
        let root = dom.append_element(dom.body(), "div");
        OverlayLayer {
            id: manager.next_layer_id(),
            root,
            container: dom.body(),
            anchor: None,
            modal: true,
            disable_scroll_lock: false,
        }
    }

    /// Adding twice keeps one entry; unknown removals change nothing.
    ///
    /// # Panics
    /// Panics if identity handling is wrong.
    #[test]
    fn add_is_idempotent_and_unknown_remove_is_no_op() {
        let mut dom = Dom::new(Viewport::default());
        let mut manager = OverlayManager::new(&FloatingConfig::default());
        let first = modal(&mut manager, &mut dom);
        let second = modal(&mut manager, &mut dom);
        assert_eq!(manager.add(&mut dom, first), 0);
        assert_eq!(manager.add(&mut dom, second), 1);
        assert_eq!(manager.add(&mut dom, first), 0);
        assert_eq!(manager.len(), 2);

        let stranger = manager.next_layer_id();
        assert!(!manager.remove(&mut dom, stranger));
        let order: Vec<LayerId> = manager.iter().map(|layer| layer.id).collect();
        assert_eq!(order, vec![first.id, second.id]);
    }

    /// Siblings are hidden while a modal is open and restored afterwards,
    /// except the ones that were hidden to begin with.
    ///
    /// # Panics
    /// Panics if aria-hidden bookkeeping is wrong.
    #[test]
    fn siblings_hidden_and_restored() {
        let mut dom = Dom::new(Viewport::default());
        let body = dom.body();
        let app = dom.append_element(body, "main");
        let already_hidden = dom.append_element(body, "aside");
        dom.set_attribute(already_hidden, "aria-hidden", "true");
        let script = dom.append_element(body, "script");

        let mut manager = OverlayManager::new(&FloatingConfig::default());
        let layer = modal(&mut manager, &mut dom);
        manager.add(&mut dom, layer);
        assert_eq!(dom.attribute(app, "aria-hidden").as_deref(), Some("true"));
        assert_eq!(dom.attribute(script, "aria-hidden"), None);
        assert_eq!(dom.attribute(layer.root, "aria-hidden"), None);

        assert!(manager.remove(&mut dom, layer.id));
        assert_eq!(dom.attribute(app, "aria-hidden"), None);
        assert_eq!(dom.attribute(already_hidden, "aria-hidden").as_deref(), Some("true"));
    }

    /// A tooltip layer above a modal does not take dismissal away from it.
    ///
    /// # Panics
    /// Panics if the non-modal layer counts as the top modal.
    #[test]
    fn non_modal_layers_are_skipped() {
        let mut dom = Dom::new(Viewport::default());
        let mut manager = OverlayManager::new(&FloatingConfig::default());
        let dialog = modal(&mut manager, &mut dom);
        manager.add(&mut dom, dialog);
        let tooltip = OverlayLayer {
            modal: false,
            disable_scroll_lock: true,
            ..modal(&mut manager, &mut dom)
        };
        manager.add(&mut dom, tooltip);

        assert_eq!(manager.top().map(|layer| layer.id), Some(tooltip.id));
        assert!(manager.is_top_modal(dialog.id));
        assert!(!manager.is_top_modal(tooltip.id));
    }

    /// Mounting an unknown layer is a programmer error.
    ///
    /// # Panics
    /// Panics if the error is swallowed.
    #[test]
    fn mount_unknown_layer_fails() {
        let mut dom = Dom::new(Viewport::default());
        let mut manager: OverlayManager<NodeKey> = OverlayManager::new(&FloatingConfig::default());
        let id = manager.next_layer_id();
        assert!(manager.mount(&mut dom, id).is_err());
    }
}
