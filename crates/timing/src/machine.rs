//! Per-trigger interaction timing.
//!
//! ```text
//! Closed ──enter──▶ EnterPending ──delay──▶ Open ──leave──▶ LeavePending ──delay──▶ Closed
//!   │                                        ▲
//!   └──touchstart──▶ LongPressPending ──hold─┘
//! ```
//!
//! Enter and leave delays are mutually exclusive: scheduling one cancels the
//! other. The machine never runs timers itself; the host calls
//! [`InteractionTimer::poll`] at [`InteractionTimer::next_deadline`].

use crate::hysteresis::Hysteresis;
use core::time::Duration;
use floating_core::{Document, FloatingConfig, Key, KeyEvent, WarnOnce, Warning};
use std::rc::Rc;
use std::time::Instant;

const LOG_TARGET: &str = "floating_timing";

/// Delays and listener switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingOptions {
    /// Hover/focus enter delay.
    pub enter_delay: Duration,
    /// Enter delay while the shared hysteresis window is open.
    pub enter_next_delay: Duration,
    /// Leave delay.
    pub leave_delay: Duration,
    /// Long-press duration.
    pub enter_touch_delay: Duration,
    /// Close delay after the finger lifts.
    pub leave_touch_delay: Duration,
    /// Extra fast-reopen window after a close.
    pub hysteresis_window: Duration,
    /// How long emulated mouse events are ignored after a touch-driven close.
    pub touch_ignore: Duration,
    /// Ignore pointer enter/leave.
    pub disable_hover_listener: bool,
    /// Ignore focus/blur.
    pub disable_focus_listener: bool,
    /// Ignore touch.
    pub disable_touch_listener: bool,
}

impl TimingOptions {
    /// Options from the shared configuration with every listener enabled.
    #[must_use]
    pub const fn from_config(config: &FloatingConfig) -> Self {
        Self {
            enter_delay: config.enter_delay(),
            enter_next_delay: config.enter_next_delay(),
            leave_delay: config.leave_delay(),
            enter_touch_delay: config.enter_touch_delay(),
            leave_touch_delay: config.leave_touch_delay(),
            hysteresis_window: config.hysteresis_window(),
            touch_ignore: config.touch_ignore(),
            disable_hover_listener: false,
            disable_focus_listener: false,
            disable_touch_listener: false,
        }
    }
}

impl Default for TimingOptions {
    fn default() -> Self {
        Self::from_config(&FloatingConfig::default())
    }
}

/// Where the trigger is in its open/close cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingState {
    /// Closed, nothing pending.
    Closed,
    /// Will open at the deadline.
    EnterPending(Instant),
    /// Open, nothing pending.
    Open,
    /// Will close at the deadline.
    LeavePending(Instant),
    /// A finger is down; opens at the deadline unless released first.
    LongPressPending(Instant),
}

/// Open/close decision handed back to the owner of the open flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Set open.
    Open,
    /// Set closed.
    Close,
}

/// Suppression of the mouse events browsers emulate after a touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MouseGuard {
    Inactive,
    UntilClose,
    Until(Instant),
}

/// Inline style value to put back once the touch interaction ends.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SavedStyle(Option<String>);

/// Interaction timing for one trigger.
#[derive(Debug)]
pub struct InteractionTimer {
    state: TimingState,
    options: TimingOptions,
    hysteresis: Rc<Hysteresis>,
    mouse_guard: MouseGuard,
    saved_user_select: Option<SavedStyle>,
    misuse: WarnOnce<&'static str>,
}

impl InteractionTimer {
    /// A closed timer sharing `hysteresis` with its siblings.
    #[must_use]
    pub fn new(options: TimingOptions, hysteresis: Rc<Hysteresis>) -> Self {
        Self {
            state: TimingState::Closed,
            options,
            hysteresis,
            mouse_guard: MouseGuard::Inactive,
            saved_user_select: None,
            misuse: WarnOnce::new(),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> TimingState {
        self.state
    }

    /// Whether the floating element should be shown.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, TimingState::Open | TimingState::LeavePending(_))
    }

    /// Options in effect.
    #[must_use]
    pub const fn options(&self) -> &TimingOptions {
        &self.options
    }

    /// Replace the options; pending deadlines keep their original time.
    pub fn set_options(&mut self, options: TimingOptions) {
        self.options = options;
    }

    /// Report the element listeners are being attached to. A disabled element
    /// never fires the events this machine needs; that misuse is logged once.
    pub fn attach_target(&mut self, disabled: bool) -> bool {
        if disabled {
            self.misuse.warn("disabled-trigger", LOG_TARGET, &Warning::DisabledTrigger);
        }
        !disabled
    }

    /// Pointer entered the trigger.
    pub fn pointer_enter(&mut self, now: Instant) -> Option<Transition> {
        if self.options.disable_hover_listener || self.mouse_ignored(now) {
            return None;
        }
        self.enter(now)
    }

    /// Pointer left the trigger (or the floating element, when it is interactive).
    pub fn pointer_leave(&mut self, now: Instant) -> Option<Transition> {
        if self.options.disable_hover_listener || self.mouse_ignored(now) {
            return None;
        }
        self.leave(now, self.options.leave_delay)
    }

    /// Trigger received focus. Only keyboard-visible focus opens.
    pub fn focus(&mut self, now: Instant, focus_visible: bool) -> Option<Transition> {
        if self.options.disable_focus_listener || !focus_visible {
            return None;
        }
        self.enter(now)
    }

    /// Trigger lost focus.
    pub fn blur(&mut self, now: Instant) -> Option<Transition> {
        if self.options.disable_focus_listener {
            return None;
        }
        self.leave(now, self.options.leave_delay)
    }

    /// Finger down on the trigger: start the long press and suppress text selection.
    pub fn touch_start<D: Document>(&mut self, now: Instant, doc: &mut D) {
        if self.options.disable_touch_listener {
            return;
        }
        self.mouse_guard = MouseGuard::UntilClose;
        if self.saved_user_select.is_none() {
            let body = doc.body();
            self.saved_user_select = Some(SavedStyle(doc.style_property(body, "user-select")));
            doc.set_style_property(body, "user-select", Some("none"));
        }
        self.state = match self.state {
            TimingState::Closed | TimingState::EnterPending(_) | TimingState::LongPressPending(_) => {
                TimingState::LongPressPending(now + self.options.enter_touch_delay)
            }
            TimingState::Open | TimingState::LeavePending(_) => TimingState::Open,
        };
    }

    /// Finger lifted: restore text selection and schedule the touch close.
    pub fn touch_end<D: Document>(&mut self, now: Instant, doc: &mut D) {
        if self.options.disable_touch_listener {
            return;
        }
        self.restore_user_select(doc);
        self.state = match self.state {
            TimingState::LongPressPending(_) | TimingState::EnterPending(_) | TimingState::Closed => {
                self.mouse_guard = MouseGuard::Until(now + self.options.touch_ignore);
                TimingState::Closed
            }
            TimingState::Open | TimingState::LeavePending(_) => {
                TimingState::LeavePending(now + self.options.leave_touch_delay)
            }
        };
    }

    /// Key pressed while the trigger or its floating element has focus.
    /// Escape closes immediately, bypassing the leave delay.
    pub fn key_down(&mut self, now: Instant, event: &KeyEvent) -> Option<Transition> {
        if event.key != Key::Escape {
            return None;
        }
        match self.state {
            TimingState::Open | TimingState::LeavePending(_) => Some(self.close_now(now)),
            TimingState::EnterPending(_) | TimingState::LongPressPending(_) => {
                self.state = TimingState::Closed;
                None
            }
            TimingState::Closed => None,
        }
    }

    /// Open without delay (controlled usage).
    pub fn open(&mut self) -> Option<Transition> {
        if self.state == TimingState::Open {
            return None;
        }
        let was_open = self.is_open();
        self.open_now();
        (!was_open).then_some(Transition::Open)
    }

    /// Close without delay (controlled usage).
    pub fn close(&mut self, now: Instant) -> Option<Transition> {
        match self.state {
            TimingState::Open | TimingState::LeavePending(_) => Some(self.close_now(now)),
            TimingState::EnterPending(_) | TimingState::LongPressPending(_) => {
                self.state = TimingState::Closed;
                None
            }
            TimingState::Closed => None,
        }
    }

    /// Fire a due deadline.
    pub fn poll(&mut self, now: Instant) -> Option<Transition> {
        match self.state {
            TimingState::EnterPending(deadline) | TimingState::LongPressPending(deadline) if deadline <= now => {
                Some(self.open_now())
            }
            TimingState::LeavePending(deadline) if deadline <= now => Some(self.close_now(now)),
            TimingState::Closed
            | TimingState::Open
            | TimingState::EnterPending(_)
            | TimingState::LongPressPending(_)
            | TimingState::LeavePending(_) => None,
        }
    }

    /// Pending deadline, if any.
    #[must_use]
    pub const fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            TimingState::EnterPending(deadline)
            | TimingState::LeavePending(deadline)
            | TimingState::LongPressPending(deadline) => Some(deadline),
            TimingState::Closed | TimingState::Open => None,
        }
    }

    /// Clear every deadline and undo the touch text-selection override.
    pub fn dispose<D: Document>(&mut self, doc: &mut D) {
        self.restore_user_select(doc);
        self.state = TimingState::Closed;
        self.mouse_guard = MouseGuard::Inactive;
    }

    fn enter(&mut self, now: Instant) -> Option<Transition> {
        match self.state {
            TimingState::Closed => {
                let delay = if self.hysteresis.is_open(now) {
                    self.options.enter_next_delay
                } else {
                    self.options.enter_delay
                };
                if delay.is_zero() {
                    Some(self.open_now())
                } else {
                    self.state = TimingState::EnterPending(now + delay);
                    None
                }
            }
            TimingState::LeavePending(_) => {
                self.state = TimingState::Open;
                None
            }
            TimingState::EnterPending(_) | TimingState::Open | TimingState::LongPressPending(_) => None,
        }
    }

    fn leave(&mut self, now: Instant, delay: Duration) -> Option<Transition> {
        match self.state {
            TimingState::EnterPending(_) | TimingState::LongPressPending(_) => {
                self.state = TimingState::Closed;
                None
            }
            TimingState::Open => {
                if delay.is_zero() {
                    Some(self.close_now(now))
                } else {
                    self.state = TimingState::LeavePending(now + delay);
                    None
                }
            }
            TimingState::LeavePending(_) | TimingState::Closed => None,
        }
    }

    fn open_now(&mut self) -> Transition {
        self.state = TimingState::Open;
        self.hysteresis.mark_open();
        log::trace!(target: LOG_TARGET, "open");
        Transition::Open
    }

    fn close_now(&mut self, now: Instant) -> Transition {
        self.state = TimingState::Closed;
        self.hysteresis
            .mark_closed(now, self.options.leave_delay, self.options.hysteresis_window);
        if self.mouse_guard == MouseGuard::UntilClose {
            self.mouse_guard = MouseGuard::Until(now + self.options.touch_ignore);
        }
        log::trace!(target: LOG_TARGET, "close");
        Transition::Close
    }

    fn mouse_ignored(&mut self, now: Instant) -> bool {
        match self.mouse_guard {
            MouseGuard::Inactive => false,
            MouseGuard::UntilClose => true,
            MouseGuard::Until(deadline) => {
                if now < deadline {
                    true
                } else {
                    self.mouse_guard = MouseGuard::Inactive;
                    false
                }
            }
        }
    }

    fn restore_user_select<D: Document>(&mut self, doc: &mut D) {
        if let Some(SavedStyle(previous)) = self.saved_user_select.take() {
            let body = doc.body();
            doc.set_style_property(body, "user-select", previous.as_deref());
        }
    }
}
