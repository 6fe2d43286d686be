//! Shared vocabulary for the floating-element engine.
//!
//! This crate holds the pieces every subsystem agrees on: pixel geometry, the
//! [`Document`] host trait through which the engine reads and mutates the page,
//! anchor references, keyboard input, developer diagnostics and runtime
//! configuration. It performs no positioning, focus or timing work itself.

pub mod anchor;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod geometry;
pub mod keys;

pub use anchor::{AnchorRect, AnchorReference, PointerAnchor, VirtualElement};
pub use config::FloatingConfig;
pub use diagnostics::{WarnOnce, Warning, emit};
pub use document::Document;
pub use geometry::{Axis, Point, Rect, Size, Viewport};
pub use keys::{Key, KeyEvent, KeyMods};
