//! Overlay lifecycle management.
//!
//! Tracks which floating surfaces are open and in what order, hides the rest
//! of the page from assistive technology while a modal surface is open, and
//! locks page scrolling for the lifetime of a modal container.

pub mod aria;
pub mod manager;
pub mod scroll_lock;

pub use manager::{LayerId, OverlayLayer, OverlayManager};
pub use scroll_lock::ScrollRestore;
