//! Focus containment for modal overlays.
//!
//! [`tabbable`] computes the sequential navigation order inside a subtree and
//! [`trap`] keeps focus inside an overlay while it is the interactive one.

pub mod tabbable;
pub mod trap;

pub use trap::{AutoFocus, EnabledFn, FocusTrap, FocusTrapOptions, FocusTrapSession, TrapNodes};
