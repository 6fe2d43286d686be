//! Popover: a modal, positioned panel with a focus trap.
//!
//! Opening pushes a modal layer (siblings hidden from assistive technology,
//! page scroll locked), subscribes the panel to the position updater and
//! traps focus inside it. The trap, Escape and outside clicks only act while
//! the popover is the topmost modal layer, so nested popovers close one at a
//! time from the top.

use crate::context::FloatingContext;
use anyhow::Result;
use core::cell::{Cell, RefCell};
use core::fmt;
use floating_core::{AnchorReference, Document, FloatingConfig, Key, KeyEvent};
use floating_focus::{FocusTrap, FocusTrapOptions, TrapNodes};
use floating_geometry::{Alignment, Placement, PlacementRequest, Side};
use floating_layers::{LayerId, OverlayLayer};
use floating_updater::{PositionUpdater, SubscriptionId, UpdaterOptions};
use std::rc::Rc;
use std::time::Instant;

const LOG_TARGET: &str = "floating";

/// Why a popover closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Escape pressed while topmost.
    EscapeKeyDown,
    /// Pointer down outside the panel while topmost.
    BackdropClick,
    /// Tab pressed inside a menu.
    TabKeyDown,
    /// A menu item was chosen.
    Selection,
    /// The owner closed it.
    Programmatic,
}

/// Nodes of a popover, rendered into a portal container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopoverNodes<N> {
    /// Layer root holding the sentinels and the panel.
    pub root: N,
    /// Positioned panel; focus is trapped inside it.
    pub paper: N,
    /// Focusable sentinel before the panel.
    pub sentinel_start: N,
    /// Focusable sentinel after the panel.
    pub sentinel_end: N,
}

impl<N: Copy> PopoverNodes<N> {
    const fn trap(&self) -> TrapNodes<N> {
        TrapNodes {
            container: self.paper,
            sentinel_start: self.sentinel_start,
            sentinel_end: self.sentinel_end,
        }
    }
}

/// Popover configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopoverOptions {
    /// Where the panel goes.
    pub request: PlacementRequest,
    /// Position resync behaviour.
    pub updater: UpdaterOptions,
    /// Focus trap behaviour.
    pub trap: FocusTrapOptions,
    /// Keep page scrolling while open.
    pub disable_scroll_lock: bool,
    /// Ignore Escape.
    pub disable_escape_key_down: bool,
}

impl PopoverOptions {
    /// Defaults from the shared configuration.
    #[must_use]
    pub fn from_config(config: &FloatingConfig) -> Self {
        Self {
            request: PlacementRequest::at(Placement::new(Side::Bottom, Alignment::Start)),
            updater: UpdaterOptions::from_config(config),
            trap: FocusTrapOptions::from_config(config),
            disable_scroll_lock: false,
            disable_escape_key_down: false,
        }
    }
}

impl Default for PopoverOptions {
    fn default() -> Self {
        Self::from_config(&FloatingConfig::default())
    }
}

/// Imperative actions on a popover, usable from outside its owner.
pub struct PopoverHandle<N> {
    positions: Rc<RefCell<PositionUpdater<N>>>,
    subscription: Rc<Cell<Option<SubscriptionId>>>,
}

impl<N> fmt::Debug for PopoverHandle<N> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PopoverHandle")
            .field("subscription", &self.subscription.get())
            .finish_non_exhaustive()
    }
}

impl<N: Copy + Eq + fmt::Debug> PopoverHandle<N> {
    /// Recompute the panel position now, e.g. after its content changed size.
    /// Returns `false` while the popover is closed.
    pub fn update_position<D: Document<Node = N>>(&self, doc: &mut D) -> bool {
        self.subscription.get().is_some_and(|subscription| {
            self.positions
                .try_borrow_mut()
                .is_ok_and(|mut positions| positions.recompute_now(subscription, doc))
        })
    }
}

#[derive(Debug)]
struct OpenPopover<N> {
    layer: LayerId,
    subscription: SubscriptionId,
    trap: FocusTrap<N>,
}

/// A popover anchored to an element, virtual element or position.
pub struct Popover<N> {
    context: FloatingContext<N>,
    anchor: AnchorReference<N>,
    nodes: PopoverNodes<N>,
    options: PopoverOptions,
    open: Option<OpenPopover<N>>,
    subscription: Rc<Cell<Option<SubscriptionId>>>,
}

impl<N: fmt::Debug> fmt::Debug for Popover<N> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Popover")
            .field("anchor", &self.anchor)
            .field("nodes", &self.nodes)
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

impl<N: Copy + Eq + fmt::Debug + 'static> Popover<N> {
    /// A closed popover.
    pub fn new(
        context: &FloatingContext<N>,
        anchor: AnchorReference<N>,
        nodes: PopoverNodes<N>,
        options: PopoverOptions,
    ) -> Self {
        Self {
            context: context.clone(),
            anchor,
            nodes,
            options,
            open: None,
            subscription: Rc::new(Cell::new(None)),
        }
    }

    /// Nodes this popover renders into.
    #[must_use]
    pub const fn nodes(&self) -> PopoverNodes<N> {
        self.nodes
    }

    /// Whether the panel is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Layer of the open panel.
    #[must_use]
    pub fn layer(&self) -> Option<LayerId> {
        self.open.as_ref().map(|open| open.layer)
    }

    /// Whether this popover answers Escape and outside clicks right now.
    #[must_use]
    pub fn is_topmost(&self) -> bool {
        self.layer().is_some_and(|layer| self.context.is_top_modal(layer))
    }

    /// Imperative handle for position updates.
    #[must_use]
    pub fn handle(&self) -> PopoverHandle<N> {
        PopoverHandle {
            positions: self.context.positions_rc(),
            subscription: Rc::clone(&self.subscription),
        }
    }

    /// Open the panel. Returns `false` if it was already open.
    ///
    /// The panel is positioned hidden; call [`Self::on_entering`] once the
    /// enter transition has laid it out.
    ///
    /// # Errors
    /// Returns an error if the overlay stack rejects the layer.
    pub fn open<D: Document<Node = N>>(&mut self, doc: &mut D, now: Instant) -> Result<bool> {
        if self.open.is_some() {
            return Ok(false);
        }
        let container = doc.parent(self.nodes.root).unwrap_or_else(|| doc.body());
        let layer = {
            let mut overlays = self.context.overlays().borrow_mut();
            let id = overlays.next_layer_id();
            overlays.add(
                doc,
                OverlayLayer {
                    id,
                    root: self.nodes.root,
                    container,
                    anchor: self.anchor.element(),
                    modal: true,
                    disable_scroll_lock: self.options.disable_scroll_lock,
                },
            );
            overlays.mount(doc, id)?;
            id
        };

        let subscription = self.context.positions().borrow_mut().subscribe(
            doc,
            self.anchor.clone(),
            self.nodes.paper,
            self.options.request,
            self.options.updater,
            Box::new(|update| {
                log::trace!(target: LOG_TARGET, "popover placed at {:?}", update.result.coordinates);
            }),
        );
        self.subscription.set(Some(subscription));

        let mut trap = FocusTrap::new();
        trap.open(
            doc,
            self.nodes.trap(),
            self.options.trap,
            self.context.top_modal_check(layer),
            now,
        );
        self.open = Some(OpenPopover {
            layer,
            subscription,
            trap,
        });
        tracing::debug!(?layer, "popover opened");
        Ok(true)
    }

    /// The enter transition laid the panel out: position it for real and show it.
    pub fn on_entering<D: Document<Node = N>>(&self, doc: &mut D) -> bool {
        self.open.as_ref().is_some_and(|open| {
            self.context
                .positions()
                .borrow_mut()
                .on_entering(open.subscription, doc)
        })
    }

    /// Close the panel and return focus to where it was before opening.
    /// Returns `false` if it was not open.
    ///
    /// # Errors
    /// Returns an error if the focus trap was never activated.
    pub fn close<D: Document<Node = N>>(&mut self, doc: &mut D, reason: CloseReason) -> Result<bool> {
        let Some(mut open) = self.open.take() else {
            return Ok(false);
        };
        self.context.overlays().borrow_mut().remove(doc, open.layer);
        self.context.positions().borrow_mut().unsubscribe(open.subscription);
        self.subscription.set(None);
        let restored = open.trap.close(doc)?;
        tracing::debug!(layer = ?open.layer, ?reason, ?restored, "popover closed");
        Ok(true)
    }

    /// Key pressed inside the panel. Escape closes the topmost popover; every
    /// other key is recorded for the trap's Shift+Tab tracking.
    ///
    /// # Errors
    /// Returns an error if closing fails.
    pub fn handle_keydown<D: Document<Node = N>>(
        &mut self,
        doc: &mut D,
        event: &KeyEvent,
    ) -> Result<Option<CloseReason>> {
        if !self.is_topmost() {
            return Ok(None);
        }
        if event.key == Key::Escape && !self.options.disable_escape_key_down {
            self.close(doc, CloseReason::EscapeKeyDown)?;
            return Ok(Some(CloseReason::EscapeKeyDown));
        }
        if let Some(open) = self.open.as_mut() {
            open.trap.handle_keydown(doc, event);
        }
        Ok(None)
    }

    /// Pointer down anywhere in the document. Outside the panel, the topmost
    /// popover closes.
    ///
    /// # Errors
    /// Returns an error if closing fails.
    pub fn handle_pointer_down<D: Document<Node = N>>(
        &mut self,
        doc: &mut D,
        target: N,
    ) -> Result<Option<CloseReason>> {
        if !self.is_topmost() || doc.contains(self.nodes.paper, target) {
            return Ok(None);
        }
        self.close(doc, CloseReason::BackdropClick)?;
        Ok(Some(CloseReason::BackdropClick))
    }

    /// Focus landed on `target`; returns the node focus was pulled back to.
    pub fn handle_focus_in<D: Document<Node = N>>(&mut self, doc: &mut D, target: N) -> Option<N> {
        self.open.as_mut()?.trap.handle_focus_in(doc, target)
    }

    /// Containment poll of the focus trap.
    pub fn poll<D: Document<Node = N>>(&mut self, now: Instant, doc: &mut D) -> Option<N> {
        self.open.as_mut()?.trap.poll(now, doc)
    }

    /// Next containment poll.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.open.as_ref()?.trap.next_deadline()
    }

    /// Replace the anchor; an open panel is repositioned immediately.
    pub fn set_anchor<D: Document<Node = N>>(&mut self, anchor: AnchorReference<N>, doc: &mut D) {
        if let Some(open) = &self.open {
            self.context
                .positions()
                .borrow_mut()
                .set_anchor(open.subscription, anchor.clone(), doc);
        }
        self.anchor = anchor;
    }

    /// Close if open and release every resource. Errors are logged.
    pub fn dispose<D: Document<Node = N>>(&mut self, doc: &mut D) {
        if let Err(error) = self.close(doc, CloseReason::Programmatic) {
            log::error!(target: LOG_TARGET, "popover dispose: {error:#}");
        }
    }
}
