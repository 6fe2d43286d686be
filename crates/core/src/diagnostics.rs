//! Developer-facing warnings.
//!
//! Nothing in the engine throws for a configuration or misuse problem. It logs
//! a [`Warning`] and carries on with best-effort behaviour.

use core::fmt;
use core::hash::Hash;
use std::collections::HashSet;

/// Non-fatal conditions reported to the developer.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// The anchor reported an all-zero bounding box.
    DegenerateAnchor,
    /// Position-based anchoring was requested without a position.
    MissingAnchorPosition,
    /// The floating element is taller than the margin-bounded viewport.
    FloatingTallerThanViewport {
        /// Measured height of the floating element.
        height: f64,
        /// Height available between the margins.
        available: f64,
    },
    /// The floating element is wider than the margin-bounded viewport.
    FloatingWiderThanViewport {
        /// Measured width of the floating element.
        width: f64,
        /// Width available between the margins.
        available: f64,
    },
    /// Listeners were attached directly to a disabled element, which never fires events.
    DisabledTrigger,
    /// The same identity was registered twice.
    DuplicateRegistration {
        /// Printable form of the duplicated identity.
        key: String,
    },
    /// A focus trap container had no `tabindex` and was given `tabindex="-1"`.
    ContainerNotFocusable,
}

impl fmt::Display for Warning {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateAnchor => formatter.write_str(
                "the anchor element reported an empty bounding box; \
                 make sure it is part of the document layout",
            ),
            Self::MissingAnchorPosition => formatter.write_str(
                "position-based anchoring was requested but no anchor position was provided",
            ),
            Self::FloatingTallerThanViewport { height, available } => write!(
                formatter,
                "the floating element is {height}px tall but only {available}px fit between the margins; \
                 consider limiting its height"
            ),
            Self::FloatingWiderThanViewport { width, available } => write!(
                formatter,
                "the floating element is {width}px wide but only {available}px fit between the margins"
            ),
            Self::DisabledTrigger => formatter.write_str(
                "interaction listeners were attached to a disabled element; \
                 wrap it in a non-disabled element to receive events",
            ),
            Self::DuplicateRegistration { key } => {
                write!(formatter, "`{key}` was registered more than once")
            }
            Self::ContainerNotFocusable => formatter.write_str(
                "the focus trap container does not accept focus; tabindex=\"-1\" was added",
            ),
        }
    }
}

/// Log a warning under the given target.
pub fn emit(target: &str, warning: &Warning) {
    log::warn!(target: target, "{warning}");
}

/// Remembers which keys already produced a warning so misuse is reported once.
#[derive(Debug)]
pub struct WarnOnce<K> {
    seen: HashSet<K>,
}

impl<K: Eq + Hash> WarnOnce<K> {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    /// Emit `warning` unless `key` has already warned. Returns whether it was emitted.
    pub fn warn(&mut self, key: K, target: &str, warning: &Warning) -> bool {
        if self.seen.insert(key) {
            emit(target, warning);
            true
        } else {
            false
        }
    }

    /// Forget every key, e.g. at the start of a new render pass.
    pub fn reset(&mut self) {
        self.seen.clear();
    }
}

impl<K: Eq + Hash> Default for WarnOnce<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A key warns once until the tracker is reset.
    ///
    /// # Panics
    /// Panics if de-duplication fails.
    #[test]
    fn warn_once_per_key() {
        let mut once = WarnOnce::new();
        assert!(once.warn("trigger", "test", &Warning::DisabledTrigger));
        assert!(!once.warn("trigger", "test", &Warning::DisabledTrigger));
        assert!(once.warn("other", "test", &Warning::DisabledTrigger));
        once.reset();
        assert!(once.warn("trigger", "test", &Warning::DisabledTrigger));
    }
}
