//! Configuration settings for the floating-element engine.
//!
//! This module defines the timing constants, placement margins and list
//! navigation knobs shared by every subsystem. Configuration can be loaded from
//! environment variables, deserialized, or constructed programmatically.

use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::env;

/// Runtime configuration for the floating-element engine.
///
/// Controls interaction delays, hysteresis, typeahead and focus polling
/// intervals, resize debouncing and viewport margins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatingConfig {
    /// Delay before a hover or focus opens a tooltip
    pub enter_delay_ms: u64,
    /// Delay used instead of `enter_delay_ms` while the hysteresis window is open
    pub enter_next_delay_ms: u64,
    /// Delay before leaving the anchor closes the tooltip
    pub leave_delay_ms: u64,
    /// Long-press duration before a touch opens the tooltip
    pub enter_touch_delay_ms: u64,
    /// Delay before releasing a touch closes the tooltip
    pub leave_touch_delay_ms: u64,
    /// Extra time after a close during which re-opening skips the enter delay
    pub hysteresis_window_ms: u64,
    /// Time after a touch-driven close during which emulated mouse events are ignored
    pub touch_ignore_ms: u64,
    /// Maximum gap between typeahead keystrokes that still extends the search
    pub typeahead_timeout_ms: u64,
    /// Interval of the fallback focus-containment poll
    pub focus_poll_interval_ms: u64,
    /// Debounce applied to window resize before repositioning
    pub resize_debounce_ms: u64,
    /// Minimum distance kept between a floating element and the viewport edge
    pub margin_threshold: f64,
    /// Items skipped by PageUp / PageDown
    pub list_page_size: usize,
    /// Class marking fixed-position elements that need scrollbar compensation
    pub fixed_marker_class: String,
}

impl Default for FloatingConfig {
    fn default() -> Self {
        Self {
            enter_delay_ms: 100,
            enter_next_delay_ms: 0,
            leave_delay_ms: 0,
            enter_touch_delay_ms: 700,
            leave_touch_delay_ms: 1500,
            hysteresis_window_ms: 800,
            touch_ignore_ms: 150,
            typeahead_timeout_ms: 500,
            focus_poll_interval_ms: 50,
            resize_debounce_ms: 166,
            margin_threshold: 16.0,
            list_page_size: 5,
            fixed_marker_class: String::from("floating-fixed"),
        }
    }
}

impl FloatingConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables, falling back to the defaults:
    /// - `FLOATING_ENTER_DELAY_MS` (default: 100)
    /// - `FLOATING_ENTER_NEXT_DELAY_MS` (default: 0)
    /// - `FLOATING_LEAVE_DELAY_MS` (default: 0)
    /// - `FLOATING_ENTER_TOUCH_DELAY_MS` (default: 700)
    /// - `FLOATING_LEAVE_TOUCH_DELAY_MS` (default: 1500)
    /// - `FLOATING_HYSTERESIS_MS` (default: 800)
    /// - `FLOATING_TOUCH_IGNORE_MS` (default: 150)
    /// - `FLOATING_TYPEAHEAD_TIMEOUT_MS` (default: 500)
    /// - `FLOATING_FOCUS_POLL_MS` (default: 50, minimum 1)
    /// - `FLOATING_RESIZE_DEBOUNCE_MS` (default: 166)
    /// - `FLOATING_MARGIN` (default: 16)
    /// - `FLOATING_PAGE_SIZE` (default: 5, minimum 1)
    ///
    /// # Returns
    ///
    /// A new `FloatingConfig` instance populated from environment variables
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Self::from_env`], reading variables through `lookup`.
    /// Unparsable values fall back to the default.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let millis = |name: &str| lookup(name).and_then(|val| val.parse::<u64>().ok());
        let defaults = Self::default();
        Self {
            enter_delay_ms: millis("FLOATING_ENTER_DELAY_MS").unwrap_or(defaults.enter_delay_ms),
            enter_next_delay_ms: millis("FLOATING_ENTER_NEXT_DELAY_MS").unwrap_or(defaults.enter_next_delay_ms),
            leave_delay_ms: millis("FLOATING_LEAVE_DELAY_MS").unwrap_or(defaults.leave_delay_ms),
            enter_touch_delay_ms: millis("FLOATING_ENTER_TOUCH_DELAY_MS").unwrap_or(defaults.enter_touch_delay_ms),
            leave_touch_delay_ms: millis("FLOATING_LEAVE_TOUCH_DELAY_MS").unwrap_or(defaults.leave_touch_delay_ms),
            hysteresis_window_ms: millis("FLOATING_HYSTERESIS_MS").unwrap_or(defaults.hysteresis_window_ms),
            touch_ignore_ms: millis("FLOATING_TOUCH_IGNORE_MS").unwrap_or(defaults.touch_ignore_ms),
            typeahead_timeout_ms: millis("FLOATING_TYPEAHEAD_TIMEOUT_MS").unwrap_or(defaults.typeahead_timeout_ms),
            focus_poll_interval_ms: millis("FLOATING_FOCUS_POLL_MS")
                .unwrap_or(defaults.focus_poll_interval_ms)
                .max(1),
            resize_debounce_ms: millis("FLOATING_RESIZE_DEBOUNCE_MS").unwrap_or(defaults.resize_debounce_ms),
            margin_threshold: lookup("FLOATING_MARGIN")
                .and_then(|val| val.parse::<f64>().ok())
                .filter(|margin| margin.is_finite() && *margin >= 0.0)
                .unwrap_or(defaults.margin_threshold),
            list_page_size: lookup("FLOATING_PAGE_SIZE")
                .and_then(|val| val.parse::<usize>().ok())
                .unwrap_or(defaults.list_page_size)
                .max(1),
            fixed_marker_class: defaults.fixed_marker_class,
        }
    }

    /// Hover/focus enter delay.
    #[inline]
    #[must_use]
    pub const fn enter_delay(&self) -> Duration {
        Duration::from_millis(self.enter_delay_ms)
    }

    /// Enter delay while the hysteresis window is open.
    #[inline]
    #[must_use]
    pub const fn enter_next_delay(&self) -> Duration {
        Duration::from_millis(self.enter_next_delay_ms)
    }

    /// Leave delay.
    #[inline]
    #[must_use]
    pub const fn leave_delay(&self) -> Duration {
        Duration::from_millis(self.leave_delay_ms)
    }

    /// Long-press duration.
    #[inline]
    #[must_use]
    pub const fn enter_touch_delay(&self) -> Duration {
        Duration::from_millis(self.enter_touch_delay_ms)
    }

    /// Close delay after a touch ends.
    #[inline]
    #[must_use]
    pub const fn leave_touch_delay(&self) -> Duration {
        Duration::from_millis(self.leave_touch_delay_ms)
    }

    /// Hysteresis window added on top of the leave delay.
    #[inline]
    #[must_use]
    pub const fn hysteresis_window(&self) -> Duration {
        Duration::from_millis(self.hysteresis_window_ms)
    }

    /// Guard after a touch-driven close.
    #[inline]
    #[must_use]
    pub const fn touch_ignore(&self) -> Duration {
        Duration::from_millis(self.touch_ignore_ms)
    }

    /// Typeahead keystroke window.
    #[inline]
    #[must_use]
    pub const fn typeahead_timeout(&self) -> Duration {
        Duration::from_millis(self.typeahead_timeout_ms)
    }

    /// Focus-containment poll interval.
    #[inline]
    #[must_use]
    pub const fn focus_poll_interval(&self) -> Duration {
        Duration::from_millis(self.focus_poll_interval_ms)
    }

    /// Resize debounce.
    #[inline]
    #[must_use]
    pub const fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}
