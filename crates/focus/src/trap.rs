//! Focus trap.
//!
//! While a trap is active, focus that leaves the container is pulled back in:
//! to the first tabbable descendant when moving forward, to the last when the
//! preceding keydown was Shift+Tab, or to the container itself when it holds
//! nothing tabbable. Two sentinel nodes bracket the content so a Tab off either
//! end lands somewhere the trap can observe.

use crate::tabbable;
use anyhow::{Result, bail};
use core::fmt;
use core::time::Duration;
use floating_core::{Document, FloatingConfig, KeyEvent, Warning, emit};
use std::time::Instant;

const LOG_TARGET: &str = "floating_focus";

/// What receives focus when the trap activates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoFocus {
    /// The container itself.
    #[default]
    Container,
    /// The first tabbable descendant, falling back to the container.
    FirstTabbable,
}

/// Trap behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTrapOptions {
    /// Do not move focus into the container on activation.
    pub disable_auto_focus: bool,
    /// Do not pull escaped focus back.
    pub disable_enforce_focus: bool,
    /// Do not return focus to the previously focused element on deactivation.
    pub disable_restore_focus: bool,
    /// Target of the initial focus.
    pub auto_focus: AutoFocus,
    /// Interval of the containment poll.
    pub poll_interval: Duration,
}

impl FocusTrapOptions {
    /// Defaults with the configured poll interval.
    #[must_use]
    pub const fn from_config(config: &FloatingConfig) -> Self {
        Self {
            disable_auto_focus: false,
            disable_enforce_focus: false,
            disable_restore_focus: false,
            auto_focus: AutoFocus::Container,
            poll_interval: config.focus_poll_interval(),
        }
    }
}

impl Default for FocusTrapOptions {
    fn default() -> Self {
        Self::from_config(&FloatingConfig::default())
    }
}

/// Nodes that make up a trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrapNodes<N> {
    /// Element whose subtree keeps focus.
    pub container: N,
    /// Focusable sentinel rendered right before the container.
    pub sentinel_start: N,
    /// Focusable sentinel rendered right after the container.
    pub sentinel_end: N,
}

/// Reports whether this trap currently owns focus (typically "am I the topmost overlay").
pub type EnabledFn = Box<dyn Fn() -> bool>;

/// An active focus trap.
pub struct FocusTrapSession<N> {
    nodes: TrapNodes<N>,
    previously_focused: Option<N>,
    activated: bool,
    shift_pressed: bool,
    next_poll: Instant,
    options: FocusTrapOptions,
    is_enabled: EnabledFn,
}

impl<N: fmt::Debug> fmt::Debug for FocusTrapSession<N> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FocusTrapSession")
            .field("nodes", &self.nodes)
            .field("previously_focused", &self.previously_focused)
            .field("activated", &self.activated)
            .field("shift_pressed", &self.shift_pressed)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<N: Copy + Eq + fmt::Debug> FocusTrapSession<N> {
    /// Activate a trap: remember the focused element and move focus inside.
    pub fn activate<D: Document<Node = N>>(
        doc: &mut D,
        nodes: TrapNodes<N>,
        options: FocusTrapOptions,
        is_enabled: EnabledFn,
        now: Instant,
    ) -> Self {
        let previously_focused = doc.active_element();
        let mut session = Self {
            nodes,
            previously_focused,
            activated: false,
            shift_pressed: false,
            next_poll: now + options.poll_interval,
            options,
            is_enabled,
        };

        let focus_inside = previously_focused.is_some_and(|node| doc.contains(nodes.container, node));
        if !options.disable_auto_focus && !focus_inside {
            let target = match options.auto_focus {
                AutoFocus::Container => nodes.container,
                AutoFocus::FirstTabbable => {
                    tabbable::tabbable(doc, nodes.container)
                        .first()
                        .copied()
                        .unwrap_or(nodes.container)
                }
            };
            if target == nodes.container && doc.attribute(nodes.container, "tabindex").is_none() {
                emit(LOG_TARGET, &Warning::ContainerNotFocusable);
                doc.set_attribute(nodes.container, "tabindex", "-1");
            }
            session.activated = doc.focus(target);
        } else {
            session.activated = focus_inside;
        }
        log::debug!(target: LOG_TARGET, "focus trap activated on {:?}", nodes.container);
        session
    }

    /// Nodes this trap was activated with.
    #[must_use]
    pub const fn nodes(&self) -> TrapNodes<N> {
        self.nodes
    }

    /// Element that held focus at activation.
    #[must_use]
    pub const fn previously_focused(&self) -> Option<N> {
        self.previously_focused
    }

    /// Whether focus has entered the trap at least once.
    #[must_use]
    pub const fn is_activated(&self) -> bool {
        self.activated
    }

    /// Keydown anywhere in the document.
    ///
    /// Records the Shift state for the next containment decision, and turns
    /// Shift+Tab on the container itself into a wrap to the last tabbable.
    /// Returns `true` when the event was consumed.
    pub fn handle_keydown<D: Document<Node = N>>(&mut self, doc: &mut D, event: &KeyEvent) -> bool {
        self.shift_pressed = event.mods.shift;
        if !event.is_shift_tab() || !self.enforcing() {
            return false;
        }
        if doc.active_element() != Some(self.nodes.container) {
            return false;
        }
        let target = tabbable::tabbable(doc, self.nodes.container)
            .last()
            .copied()
            .unwrap_or(self.nodes.container);
        doc.focus(target)
    }

    /// Focus moved to `target`. Returns the node focus was redirected to, if any.
    pub fn handle_focus_in<D: Document<Node = N>>(&mut self, doc: &mut D, target: N) -> Option<N> {
        if target == self.nodes.sentinel_start || target == self.nodes.sentinel_end {
            self.activated = true;
        } else if doc.contains(self.nodes.container, target) {
            self.activated = true;
            return None;
        }
        self.contain(doc)
    }

    /// Periodic containment check for focus that fell back to `<body>` without a focus event.
    pub fn poll<D: Document<Node = N>>(&mut self, now: Instant, doc: &mut D) -> Option<N> {
        if now < self.next_poll {
            return None;
        }
        self.next_poll = now + self.options.poll_interval;
        let on_body = doc.active_element().is_none_or(|node| node == doc.body());
        if on_body { self.contain(doc) } else { None }
    }

    /// When [`Self::poll`] next wants to run.
    #[must_use]
    pub const fn next_deadline(&self) -> Instant {
        self.next_poll
    }

    /// Deactivate, returning focus to the previously focused element when it is
    /// still in the document. Returns the node that received focus.
    pub fn deactivate<D: Document<Node = N>>(self, doc: &mut D) -> Option<N> {
        log::debug!(target: LOG_TARGET, "focus trap deactivated on {:?}", self.nodes.container);
        if self.options.disable_restore_focus {
            return None;
        }
        let previous = self.previously_focused?;
        if !doc.is_connected(previous) {
            return None;
        }
        doc.focus(previous).then_some(previous)
    }

    fn enforcing(&self) -> bool {
        !self.options.disable_enforce_focus && (self.is_enabled)()
    }

    fn contain<D: Document<Node = N>>(&mut self, doc: &mut D) -> Option<N> {
        if !self.activated || !self.enforcing() {
            return None;
        }
        let active = doc.active_element();
        if active.is_some_and(|node| doc.contains(self.nodes.container, node)) {
            return None;
        }
        let order = tabbable::tabbable(doc, self.nodes.container);
        let target = if self.shift_pressed {
            order.last()
        } else {
            order.first()
        }
        .copied()
        .unwrap_or(self.nodes.container);
        doc.focus(target).then_some(target)
    }
}

/// Open/close wrapper owning at most one session.
#[derive(Debug)]
pub struct FocusTrap<N> {
    session: Option<FocusTrapSession<N>>,
}

impl<N: Copy + Eq + fmt::Debug> FocusTrap<N> {
    /// A closed trap.
    #[must_use]
    pub const fn new() -> Self {
        Self { session: None }
    }

    /// Activate the trap. An already open trap is closed first.
    pub fn open<D: Document<Node = N>>(
        &mut self,
        doc: &mut D,
        nodes: TrapNodes<N>,
        options: FocusTrapOptions,
        is_enabled: EnabledFn,
        now: Instant,
    ) {
        if let Some(previous) = self.session.take() {
            previous.deactivate(doc);
        }
        self.session = Some(FocusTrapSession::activate(doc, nodes, options, is_enabled, now));
    }

    /// Deactivate the trap.
    ///
    /// # Errors
    /// Returns an error if the trap is not open.
    pub fn close<D: Document<Node = N>>(&mut self, doc: &mut D) -> Result<Option<N>> {
        let Some(session) = self.session.take() else {
            bail!("focus trap closed without being opened");
        };
        Ok(session.deactivate(doc))
    }

    /// Whether a session is active.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// The active session.
    #[must_use]
    pub const fn session(&self) -> Option<&FocusTrapSession<N>> {
        self.session.as_ref()
    }

    /// The active session, mutably.
    pub fn session_mut(&mut self) -> Option<&mut FocusTrapSession<N>> {
        self.session.as_mut()
    }

    /// Forward a keydown to the active session.
    pub fn handle_keydown<D: Document<Node = N>>(&mut self, doc: &mut D, event: &KeyEvent) -> bool {
        self.session
            .as_mut()
            .is_some_and(|session| session.handle_keydown(doc, event))
    }

    /// Forward a focus change to the active session.
    pub fn handle_focus_in<D: Document<Node = N>>(&mut self, doc: &mut D, target: N) -> Option<N> {
        self.session.as_mut()?.handle_focus_in(doc, target)
    }

    /// Forward a poll tick to the active session.
    pub fn poll<D: Document<Node = N>>(&mut self, now: Instant, doc: &mut D) -> Option<N> {
        self.session.as_mut()?.poll(now, doc)
    }

    /// Next poll deadline of the active session.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.session.as_ref().map(FocusTrapSession::next_deadline)
    }
}

impl<N: Copy + Eq + fmt::Debug> Default for FocusTrap<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floating_core::{Key, KeyMods, Viewport};
    use floating_dom::{Dom, NodeKey};

    struct Fixture {
        dom: Dom,
        outside: NodeKey,
        nodes: TrapNodes<NodeKey>,
        first: NodeKey,
        last: NodeKey,
    }

    fn fixture() -> Fixture {
        let mut dom = Dom::new(Viewport::default());
        let body = dom.body();
        let outside = dom.append_element(body, "button");
        let sentinel_start = dom.append_element(body, "div");
        dom.set_attribute(sentinel_start, "tabindex", "0");
        let container = dom.append_element(body, "div");
        let first = dom.append_element(container, "button");
        let last = dom.append_element(container, "input");
        let sentinel_end = dom.append_element(body, "div");
        dom.set_attribute(sentinel_end, "tabindex", "0");
        Fixture {
            dom,
            outside,
            nodes: TrapNodes {
                container,
                sentinel_start,
                sentinel_end,
            },
            first,
            last,
        }
    }

    fn always() -> EnabledFn {
        Box::new(|| true)
    }

    /// Activation focuses the container, adding a tabindex when it has none.
    ///
    /// # Panics
    /// Panics if the container is not focused.
    #[test]
    fn activation_focuses_container() {
        let mut fx = fixture();
        assert!(fx.dom.focus(fx.outside));
        let session = FocusTrapSession::activate(&mut fx.dom, fx.nodes, FocusTrapOptions::default(), always(), Instant::now());
        assert_eq!(fx.dom.attribute(fx.nodes.container, "tabindex").as_deref(), Some("-1"));
        assert_eq!(fx.dom.active_element(), Some(fx.nodes.container));
        assert_eq!(session.previously_focused(), Some(fx.outside));
        assert!(session.is_activated());
    }

    /// Focusing the first tabbable leaves the container's attributes alone.
    ///
    /// # Panics
    /// Panics if the container is touched or the wrong node gets focus.
    #[test]
    fn first_tabbable_leaves_container_untouched() {
        let mut fx = fixture();
        let options = FocusTrapOptions {
            auto_focus: AutoFocus::FirstTabbable,
            ..FocusTrapOptions::default()
        };
        let session = FocusTrapSession::activate(&mut fx.dom, fx.nodes, options, always(), Instant::now());
        assert_eq!(fx.dom.active_element(), Some(fx.first));
        assert_eq!(fx.dom.attribute(fx.nodes.container, "tabindex"), None);
        assert!(session.is_activated());
    }

    /// Escaped focus is pulled to the first or last tabbable by shift state.
    ///
    /// # Panics
    /// Panics if containment picks the wrong target.
    #[test]
    fn sentinels_redirect_by_direction() {
        let mut fx = fixture();
        let mut session = FocusTrapSession::activate(&mut fx.dom, fx.nodes, FocusTrapOptions::default(), always(), Instant::now());

        assert!(fx.dom.focus(fx.nodes.sentinel_end));
        assert_eq!(session.handle_focus_in(&mut fx.dom, fx.nodes.sentinel_end), Some(fx.first));

        session.handle_keydown(&mut fx.dom, &KeyEvent::with_mods(Key::Tab, KeyMods::SHIFT));
        assert!(fx.dom.focus(fx.nodes.sentinel_start));
        assert_eq!(session.handle_focus_in(&mut fx.dom, fx.nodes.sentinel_start), Some(fx.last));
        assert_eq!(fx.dom.active_element(), Some(fx.last));
    }

    /// Shift+Tab on the container wraps to the last tabbable.
    ///
    /// # Panics
    /// Panics if the wrap does not happen.
    #[test]
    fn shift_tab_on_container_wraps() {
        let mut fx = fixture();
        let mut session = FocusTrapSession::activate(&mut fx.dom, fx.nodes, FocusTrapOptions::default(), always(), Instant::now());
        assert!(session.handle_keydown(&mut fx.dom, &KeyEvent::with_mods(Key::Tab, KeyMods::SHIFT)));
        assert_eq!(fx.dom.active_element(), Some(fx.last));
    }

    /// A disabled trap leaves focus where it went.
    ///
    /// # Panics
    /// Panics if a trap that is not enabled redirects focus.
    #[test]
    fn disabled_trap_does_not_fight() {
        let mut fx = fixture();
        let mut session = FocusTrapSession::activate(&mut fx.dom, fx.nodes, FocusTrapOptions::default(), Box::new(|| false), Instant::now());
        assert!(fx.dom.focus(fx.outside));
        assert_eq!(session.handle_focus_in(&mut fx.dom, fx.outside), None);
        assert_eq!(fx.dom.active_element(), Some(fx.outside));
    }

    /// The poll pulls focus back from `<body>` once the interval elapses.
    ///
    /// # Panics
    /// Panics if the poll fires early or not at all.
    #[test]
    fn poll_recovers_body_focus() {
        let mut fx = fixture();
        let start = Instant::now();
        let mut session = FocusTrapSession::activate(&mut fx.dom, fx.nodes, FocusTrapOptions::default(), always(), start);
        fx.dom.blur();
        assert_eq!(session.poll(start + Duration::from_millis(10), &mut fx.dom), None);
        assert_eq!(session.next_deadline(), start + Duration::from_millis(50));
        assert_eq!(session.poll(start + Duration::from_millis(50), &mut fx.dom), Some(fx.first));
    }

    /// Closing a trap that was never opened is an error.
    ///
    /// # Panics
    /// Panics if the misuse is accepted.
    #[test]
    fn close_without_open_fails() {
        let mut fx = fixture();
        let mut trap: FocusTrap<NodeKey> = FocusTrap::new();
        assert!(trap.close(&mut fx.dom).is_err());
        trap.open(&mut fx.dom, fx.nodes, FocusTrapOptions::default(), always(), Instant::now());
        assert!(trap.is_open());
        let restored = trap.close(&mut fx.dom).expect("trap was open");
        assert_eq!(restored, Some(fx.dom.body()));
    }
}
