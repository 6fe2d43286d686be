//! Shared fast-reopen window.

use core::cell::Cell;
use core::time::Duration;
use std::time::Instant;

/// Process-wide "a floating element was open very recently" flag.
///
/// Shared through `Rc` by every interaction timer created from the same
/// context, so hovering along a row of triggers opens each one without
/// waiting for the full enter delay.
#[derive(Debug, Default)]
pub struct Hysteresis {
    open: Cell<bool>,
    reset_at: Cell<Option<Instant>>,
}

impl Hysteresis {
    /// A closed window.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            open: Cell::new(false),
            reset_at: Cell::new(None),
        }
    }

    /// Whether re-opening at `now` should use the short delay.
    pub fn is_open(&self, now: Instant) -> bool {
        if !self.open.get() {
            return false;
        }
        match self.reset_at.get() {
            Some(reset) if now >= reset => {
                self.open.set(false);
                self.reset_at.set(None);
                false
            }
            Some(_) | None => true,
        }
    }

    /// Something opened: keep the window open until it closes again.
    pub fn mark_open(&self) {
        self.open.set(true);
        self.reset_at.set(None);
    }

    /// Something closed at `now`: the window stays open for `leave_delay + window`.
    pub fn mark_closed(&self, now: Instant, leave_delay: Duration, window: Duration) {
        if self.open.get() {
            self.reset_at.set(Some(now + leave_delay + window));
        }
    }

    /// When the window will close, if a close is scheduled.
    pub fn reset_deadline(&self) -> Option<Instant> {
        self.reset_at.get()
    }
}
