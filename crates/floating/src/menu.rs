//! Menu: a popover whose panel holds a keyboard-navigable list.
//!
//! Focus stays on the list element and the highlighted item is announced
//! through `aria-activedescendant`.

use crate::context::FloatingContext;
use crate::popover::{CloseReason, Popover, PopoverNodes, PopoverOptions};
use crate::props::{TriggerEvent, TriggerProps};
use anyhow::Result;
use core::fmt::{self, Debug};
use core::hash::Hash;
use core::mem;
use floating_core::{AnchorReference, Document, FloatingConfig, Key, KeyEvent};
use floating_listnav::{ListAction, ListConfig, ListItem, ListNavigationState, SelectionMode, reduce};
use std::time::Instant;

/// Menu configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuOptions {
    /// Panel behaviour.
    pub popover: PopoverOptions,
    /// Navigation behaviour.
    pub list: ListConfig,
}

impl MenuOptions {
    /// Defaults from the shared configuration.
    #[must_use]
    pub fn from_config(config: &FloatingConfig) -> Self {
        Self {
            popover: PopoverOptions::from_config(config),
            list: ListConfig::from_config(config),
        }
    }
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self::from_config(&FloatingConfig::default())
    }
}

/// What a forwarded event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome<V> {
    /// Not for this menu; let it propagate.
    Ignored,
    /// Consumed (`preventDefault`).
    Handled,
    /// An item was activated. `closed` is set when the menu closed as a result.
    Selected {
        /// Activated item.
        value: V,
        /// The menu closed.
        closed: bool,
    },
    /// The menu closed without a selection.
    Closed(CloseReason),
}

/// A menu bound to a trigger button.
pub struct Menu<N, V> {
    popover: Popover<N>,
    trigger: N,
    list_node: N,
    list: ListNavigationState<V>,
    config: ListConfig,
    clock_origin: Option<Instant>,
}

impl<N: Debug, V: Debug> Debug for Menu<N, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Menu")
            .field("popover", &self.popover)
            .field("trigger", &self.trigger)
            .field("list", &self.list)
            .finish_non_exhaustive()
    }
}

impl<N, V> Menu<N, V>
where
    N: Copy + Eq + Debug + 'static,
    V: Clone + Eq + Hash + Debug,
{
    /// A closed menu anchored to `trigger`. `list_node` is the element inside
    /// the panel with `role="menu"`.
    pub fn new<D: Document<Node = N>>(
        context: &FloatingContext<N>,
        doc: &mut D,
        trigger: N,
        nodes: PopoverNodes<N>,
        list_node: N,
        items: Vec<ListItem<V>>,
        options: MenuOptions,
    ) -> Self {
        doc.set_attribute(list_node, "role", "menu");
        if doc.attribute(list_node, "tabindex").is_none() {
            doc.set_attribute(list_node, "tabindex", "-1");
        }
        let menu = Self {
            popover: Popover::new(context, AnchorReference::Element(trigger), nodes, options.popover),
            trigger,
            list_node,
            list: ListNavigationState::new(items),
            config: options.list,
            clock_origin: None,
        };
        menu.trigger_props(doc).apply(doc, trigger);
        menu
    }

    /// Navigation state.
    #[must_use]
    pub const fn state(&self) -> &ListNavigationState<V> {
        &self.list
    }

    /// The underlying popover.
    #[must_use]
    pub const fn popover(&self) -> &Popover<N> {
        &self.popover
    }

    /// Whether the menu is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.popover.is_open()
    }

    /// Attributes and listeners for the trigger button.
    pub fn trigger_props<D: Document<Node = N>>(&self, doc: &D) -> TriggerProps {
        let open = self.is_open();
        TriggerProps {
            attributes: vec![
                ("aria-haspopup", Some("true".to_owned())),
                ("aria-expanded", open.then(|| "true".to_owned())),
                (
                    "aria-controls",
                    doc.attribute(self.list_node, "id").filter(|_| open),
                ),
            ],
            events: vec![TriggerEvent::Click, TriggerEvent::KeyDown],
        }
    }

    /// Open the menu, highlight the first selected item (or the first
    /// eligible one) and focus the list.
    ///
    /// # Errors
    /// Returns an error if the overlay stack rejects the layer.
    pub fn open<D: Document<Node = N>>(&mut self, doc: &mut D, now: Instant) -> Result<bool> {
        if !self.popover.open(doc, now)? {
            return Ok(false);
        }
        self.clock_origin = Some(now);
        let preselected = self
            .list
            .selected
            .first()
            .cloned()
            .filter(|_| self.config.selection_mode != SelectionMode::None);
        let action = preselected.map_or(ListAction::First, ListAction::SetHighlight);
        self.dispatch(action, doc);
        if self.list.highlighted.is_none() {
            self.dispatch(ListAction::First, doc);
        }
        doc.focus(self.list_node);
        self.trigger_props(doc).apply(doc, self.trigger);
        Ok(true)
    }

    /// Close the menu.
    ///
    /// # Errors
    /// Returns an error if the popover's focus trap is inconsistent.
    pub fn close<D: Document<Node = N>>(&mut self, doc: &mut D, reason: CloseReason) -> Result<bool> {
        let closed = self.popover.close(doc, reason)?;
        if closed {
            self.close_cleanup(doc);
        }
        Ok(closed)
    }

    /// Key pressed while the list has focus.
    ///
    /// # Errors
    /// Returns an error if closing fails.
    pub fn handle_keydown<D: Document<Node = N>>(
        &mut self,
        doc: &mut D,
        event: &KeyEvent,
        now: Instant,
    ) -> Result<MenuOutcome<V>> {
        if !self.popover.is_topmost() {
            return Ok(MenuOutcome::Ignored);
        }
        if event.key == Key::Tab {
            self.close(doc, CloseReason::TabKeyDown)?;
            return Ok(MenuOutcome::Closed(CloseReason::TabKeyDown));
        }
        if let Some(reason) = self.popover.handle_keydown(doc, event)? {
            self.close_cleanup(doc);
            return Ok(MenuOutcome::Closed(reason));
        }
        let time_ms = self.time_ms(now);
        let Some(action) = ListAction::from_key(event, time_ms, &self.list.typeahead, &self.config) else {
            return Ok(MenuOutcome::Ignored);
        };
        self.run(action, doc)
    }

    /// Pointer activated an item.
    ///
    /// # Errors
    /// Returns an error if closing fails.
    pub fn handle_item_click<D: Document<Node = N>>(&mut self, doc: &mut D, value: V) -> Result<MenuOutcome<V>> {
        self.run(ListAction::ItemClick(value), doc)
    }

    /// Pointer hovered an item.
    pub fn handle_item_hover<D: Document<Node = N>>(&mut self, doc: &mut D, value: V) -> bool {
        self.dispatch(ListAction::SetHighlight(value), doc).handled
    }

    /// Pointer down anywhere in the document.
    ///
    /// # Errors
    /// Returns an error if closing fails.
    pub fn handle_pointer_down<D: Document<Node = N>>(&mut self, doc: &mut D, target: N) -> Result<MenuOutcome<V>> {
        match self.popover.handle_pointer_down(doc, target)? {
            Some(reason) => {
                self.close_cleanup(doc);
                Ok(MenuOutcome::Closed(reason))
            }
            None => Ok(MenuOutcome::Ignored),
        }
    }

    /// Focus landed on `target`.
    pub fn handle_focus_in<D: Document<Node = N>>(&mut self, doc: &mut D, target: N) -> Option<N> {
        self.popover.handle_focus_in(doc, target)
    }

    /// Containment poll.
    pub fn poll<D: Document<Node = N>>(&mut self, now: Instant, doc: &mut D) -> Option<N> {
        self.popover.poll(now, doc)
    }

    /// Next poll deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.popover.next_deadline()
    }

    /// Replace the items; highlight and selection survive where their values do.
    pub fn set_items<D: Document<Node = N>>(&mut self, doc: &mut D, items: Vec<ListItem<V>>) -> bool {
        self.dispatch(ListAction::ItemsChanged(items), doc).selection_changed
    }

    /// Close if open and release every resource.
    pub fn dispose<D: Document<Node = N>>(&mut self, doc: &mut D) {
        self.popover.dispose(doc);
        self.close_cleanup(doc);
    }

    fn run<D: Document<Node = N>>(&mut self, action: ListAction<V>, doc: &mut D) -> Result<MenuOutcome<V>> {
        let activated = match &action {
            ListAction::ItemClick(value) => Some(value.clone()),
            ListAction::Select => self.list.highlighted.clone(),
            ListAction::Next
            | ListAction::Previous
            | ListAction::First
            | ListAction::Last
            | ListAction::PageDown
            | ListAction::PageUp
            | ListAction::CharacterKey { .. }
            | ListAction::Blur
            | ListAction::ItemsChanged(_)
            | ListAction::SetHighlight(_)
            | ListAction::ClearSelection => None,
        };
        let reduction = self.dispatch(action, doc);
        match activated.filter(|_| reduction.handled) {
            Some(value) => {
                if reduction.close_requested {
                    self.close(doc, CloseReason::Selection)?;
                }
                Ok(MenuOutcome::Selected {
                    value,
                    closed: reduction.close_requested,
                })
            }
            None if reduction.handled => Ok(MenuOutcome::Handled),
            None => Ok(MenuOutcome::Ignored),
        }
    }

    /// Apply an action and mirror the highlight onto the list element.
    fn dispatch<D: Document<Node = N>>(&mut self, action: ListAction<V>, doc: &mut D) -> Dispatched {
        let state = mem::replace(&mut self.list, ListNavigationState::new(Vec::new()));
        let reduction = reduce(state, action, &self.config);
        self.list = reduction.state;
        match self.list.active_descendant() {
            Some(id) => doc.set_attribute(self.list_node, "aria-activedescendant", id),
            None => doc.remove_attribute(self.list_node, "aria-activedescendant"),
        }
        Dispatched {
            handled: reduction.handled,
            close_requested: reduction.close_requested,
            selection_changed: reduction.selection_changed,
        }
    }

    /// Reset navigation after the popover closed.
    fn close_cleanup<D: Document<Node = N>>(&mut self, doc: &mut D) {
        self.dispatch(ListAction::Blur, doc);
        self.clock_origin = None;
        self.trigger_props(doc).apply(doc, self.trigger);
    }

    fn time_ms(&self, now: Instant) -> u64 {
        self.clock_origin.map_or(0, |origin| {
            u64::try_from(now.saturating_duration_since(origin).as_millis()).unwrap_or(u64::MAX)
        })
    }
}

/// Flags of one reduction, without the state.
#[derive(Debug, Clone, Copy)]
struct Dispatched {
    handled: bool,
    close_requested: bool,
    selection_changed: bool,
}
